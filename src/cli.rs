use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about)]
pub struct Arguments {
    #[arg(short = 'v', long = None, env = "STOPWATCH_VERBOSITY", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Milliseconds between elapsed time updates while running.
    #[arg(long, env = "STOPWATCH_TICK_MS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Milliseconds between redraws.
    #[arg(long, env = "STOPWATCH_REFRESH_MS", default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_ms: u64,

    /// Print the final state as JSON on exit.
    #[arg(long, env = "STOPWATCH_JSON")]
    pub json: bool,

    /// Open a desktop window instead of drawing on the terminal.
    #[cfg(feature = "ui")]
    #[arg(short, long, env = "STOPWATCH_WINDOW")]
    pub window: bool,
}

impl Arguments {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}
