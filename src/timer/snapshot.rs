use crate::timer::lap::LapRecord;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Reset,
    Running,
    Paused,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Reset => write!(f, "reset"),
            Phase::Running => write!(f, "running"),
            Phase::Paused => write!(f, "paused"),
        }
    }
}

/// An owned copy of the engine state, handed to render surfaces.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopwatchState {
    pub elapsed_seconds: f64,
    pub running: bool,
    pub phase: Phase,
    pub laps: Vec<LapRecord>,
}

impl StopwatchState {
    pub fn display_time(&self) -> String {
        format!("{:.2}", self.elapsed_seconds)
    }

    pub fn lap_lines(&self) -> Vec<String> {
        self.laps
            .iter()
            .enumerate()
            .map(|(index, lap)| lap.line(index).to_string())
            .collect()
    }

    /// Lap rows with the newest first, so a short list always shows the latest lap.
    pub fn recent_lap_lines(&self) -> Vec<String> {
        let mut lines = self.lap_lines();
        lines.reverse();
        lines
    }

    pub fn can_lap(&self) -> bool {
        self.running
    }

    pub fn start_pause_label(&self) -> &'static str {
        if self.running {
            "Pause"
        } else {
            "Start"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_reset() {
        let state = StopwatchState::default();

        assert_eq!(state.phase, Phase::Reset);
        assert_eq!(state.display_time(), "0.00");
        assert!(state.laps.is_empty());
        assert_eq!(state.start_pause_label(), "Start");
        assert!(!state.can_lap());
    }

    #[test]
    fn lap_lines_are_numbered_in_order() {
        let first = LapRecord::after(None, 1.0);
        let second = LapRecord::after(Some(&first), 2.5);
        let state = StopwatchState {
            elapsed_seconds: 2.5,
            running: true,
            phase: Phase::Running,
            laps: vec![first, second],
        };

        assert_eq!(
            state.lap_lines(),
            vec![
                "# 1          1.00          1.00".to_string(),
                "# 2          1.50          2.50".to_string(),
            ]
        );
        assert_eq!(state.start_pause_label(), "Pause");
    }

    #[test]
    fn recent_lap_lines_put_the_newest_lap_first() {
        let mut laps = vec![LapRecord::after(None, 1.0)];
        for elapsed in [2.0, 3.0, 4.0, 5.0, 6.0] {
            laps.push(LapRecord::after(laps.last(), elapsed));
        }
        let state = StopwatchState {
            elapsed_seconds: 6.0,
            running: true,
            phase: Phase::Running,
            laps,
        };

        let lines = state.recent_lap_lines();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "# 6          1.00          6.00");
        assert_eq!(lines[5], "# 1          1.00          1.00");
    }

    #[test]
    fn serializes_phase_in_lowercase() {
        let state = StopwatchState {
            phase: Phase::Paused,
            ..StopwatchState::default()
        };

        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["phase"], "paused");
        assert_eq!(json["running"], false);
    }
}
