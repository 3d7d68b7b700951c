pub mod command;
pub mod timer;
