use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A user gesture the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Lap,
    Reset,
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Start => write!(f, "start"),
            Command::Pause => write!(f, "pause"),
            Command::Toggle => write!(f, "toggle"),
            Command::Lap => write!(f, "lap"),
            Command::Reset => write!(f, "reset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Ok(Command::Start),
            "p" | "pause" => Ok(Command::Pause),
            // A bare enter acts like the single start/pause button.
            "" | "t" | "toggle" => Ok(Command::Toggle),
            "l" | "lap" => Ok(Command::Lap),
            "r" | "reset" => Ok(Command::Reset),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!("s".parse(), Ok(Command::Start));
        assert_eq!("Pause".parse(), Ok(Command::Pause));
        assert_eq!("  LAP \n".parse(), Ok(Command::Lap));
        assert_eq!("r".parse(), Ok(Command::Reset));
    }

    #[test]
    fn empty_line_toggles() {
        assert_eq!("".parse(), Ok(Command::Toggle));
        assert_eq!("\n".parse(), Ok(Command::Toggle));
    }

    #[test]
    fn rejects_unknown_input() {
        assert_eq!(
            "split".parse::<Command>(),
            Err(UnknownCommand("split".to_string()))
        );
    }
}
