use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A recorded checkpoint. Never mutated once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    /// Time since the previous lap, or since start for the first one.
    pub split_seconds: f64,
    /// Elapsed time when the lap was recorded.
    pub cumulative_seconds: f64,
}

impl LapRecord {
    pub fn after(previous: Option<&LapRecord>, elapsed: f64) -> Self {
        let split_seconds = match previous {
            None => elapsed,
            Some(previous) => elapsed - previous.cumulative_seconds,
        };

        Self {
            split_seconds,
            cumulative_seconds: elapsed,
        }
    }

    /// A row of the lap log, numbered from 1.
    pub fn line(&self, index: usize) -> LapLine<'_> {
        LapLine { index, lap: self }
    }
}

pub struct LapLine<'a> {
    index: usize,
    lap: &'a LapRecord,
}

impl Display for LapLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "# {}          {:.2}          {:.2}",
            self.index + 1,
            self.lap.split_seconds,
            self.lap.cumulative_seconds
        )
    }
}
