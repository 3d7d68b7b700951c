use crate::command::Command;
use crate::timer::snapshot::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("cannot {command} while {phase}")]
    InvalidTransition { command: Command, phase: Phase },
}
