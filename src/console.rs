use std::io::{BufRead, Write};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use stopwatch::command::{Command, UnknownCommand};
use stopwatch::timer::{LapRecord, Observer, StopwatchState};
use tokio::sync::mpsc::Sender;

/// A line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Quit,
}

impl FromStr for Input {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => Ok(Input::Quit),
            other => other.parse().map(Input::Command),
        }
    }
}

/// Forwards parsed lines to `sender` until quit or end of input.
pub fn read_loop(input: impl BufRead, sender: Sender<Input>) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line?;

        match line.parse::<Input>() {
            Ok(Input::Quit) => break,
            Ok(input) => {
                tracing::trace!(?input, "Read a command");
                sender.blocking_send(input)?;
            }
            Err(e) => tracing::warn!(%e, "Ignoring input"),
        }
    }

    sender.blocking_send(Input::Quit)?;

    Ok(())
}

/// Terminal render surface: a status line that redraws in place, with laps printed above it.
pub struct Screen<W> {
    out: Mutex<W>,
    printed: Mutex<Vec<LapRecord>>,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            printed: Mutex::new(Vec::new()),
        }
    }

    fn draw(&self, state: &StopwatchState) -> std::io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let mut printed = self.printed.lock().unwrap_or_else(PoisonError::into_inner);

        // Laps are never mutated, so a log that no longer extends what was printed belongs to a
        // new session, even when a reset and new laps arrived between two redraws.
        let from = if state.laps.starts_with(&printed[..]) {
            printed.len()
        } else {
            0
        };
        for (index, lap) in state.laps.iter().enumerate().skip(from) {
            write!(out, "\r\x1b[2K{}\n", lap.line(index))?;
        }
        *printed = state.laps.clone();

        let hint = if state.can_lap() { "  lap" } else { "" };
        write!(
            out,
            "\r\x1b[2K{:>10}  [{}] [reset]{}",
            state.display_time(),
            state.start_pause_label(),
            hint
        )?;
        out.flush()
    }
}

impl<W: Write> Observer for Screen<W> {
    fn on_snapshot(&self, state: &StopwatchState) {
        if let Err(e) = self.draw(state) {
            tracing::error!(%e, "Failed to draw the stopwatch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use stopwatch::timer::Phase;

    fn written(screen: Screen<Vec<u8>>) -> String {
        let out = screen.out.into_inner().unwrap();
        String::from_utf8(out).unwrap()
    }

    fn running(elapsed: f64, laps: Vec<LapRecord>) -> StopwatchState {
        StopwatchState {
            elapsed_seconds: elapsed,
            running: true,
            phase: Phase::Running,
            laps,
        }
    }

    #[test]
    fn parses_quit_and_commands() {
        assert_eq!("q".parse(), Ok(Input::Quit));
        assert_eq!("EXIT".parse(), Ok(Input::Quit));
        assert_eq!("lap".parse(), Ok(Input::Command(Command::Lap)));
        assert!("bogus".parse::<Input>().is_err());
    }

    #[test]
    fn read_loop_forwards_commands_and_quits() {
        let (sender, mut receiver) = tokio::sync::mpsc::channel(8);
        let input = Cursor::new("start\nnonsense\nl\nq\nreset\n");

        read_loop(input, sender).unwrap();

        assert_eq!(receiver.try_recv(), Ok(Input::Command(Command::Start)));
        assert_eq!(receiver.try_recv(), Ok(Input::Command(Command::Lap)));
        assert_eq!(receiver.try_recv(), Ok(Input::Quit));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn end_of_input_quits() {
        let (sender, mut receiver) = tokio::sync::mpsc::channel(8);

        read_loop(Cursor::new(""), sender).unwrap();

        assert_eq!(receiver.try_recv(), Ok(Input::Quit));
    }

    #[test]
    fn prints_each_lap_once() {
        let screen = Screen::new(Vec::new());
        let first = LapRecord::after(None, 1.0);
        let second = LapRecord::after(Some(&first), 2.5);

        screen.on_snapshot(&running(1.0, vec![first]));
        screen.on_snapshot(&running(2.0, vec![first]));
        screen.on_snapshot(&running(2.5, vec![first, second]));

        let output = written(screen);

        assert_eq!(output.matches("# 1 ").count(), 1);
        assert_eq!(output.matches("# 2 ").count(), 1);
        assert!(output.ends_with("      2.50  [Pause] [reset]  lap"));
    }

    #[test]
    fn reset_starts_the_lap_log_over() {
        let screen = Screen::new(Vec::new());
        let lap = LapRecord::after(None, 1.0);

        screen.on_snapshot(&running(1.0, vec![lap]));
        screen.on_snapshot(&StopwatchState::default());
        screen.on_snapshot(&running(1.0, vec![lap]));

        let output = written(screen);

        assert_eq!(output.matches("# 1 ").count(), 2);
        assert!(output.ends_with("      1.00  [Pause] [reset]  lap"));
    }

    #[test]
    fn new_session_between_redraws_reprints_the_log() {
        let screen = Screen::new(Vec::new());
        let old = LapRecord::after(None, 9.0);
        let new = LapRecord::after(None, 0.3);

        screen.on_snapshot(&running(9.0, vec![old]));
        screen.on_snapshot(&running(0.3, vec![new]));

        let output = written(screen);

        assert!(output.contains("# 1          9.00          9.00"));
        assert!(output.contains("# 1          0.30          0.30"));
        assert!(output.ends_with("      0.30  [Pause] [reset]  lap"));
    }
}
