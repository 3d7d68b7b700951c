mod cli;
mod console;
#[cfg(feature = "ui")]
mod window;

use crate::cli::Arguments;
use crate::console::{Input, Screen};
use clap::Parser;
use std::io;
use std::time::Duration;
use stopwatch::timer::{self, MonotonicClock, Stopwatch};
use tracing_log::LogTracer;

fn main() {
    let arguments = cli::Arguments::parse();
    set_log_level(&arguments).expect("Failed to configure logging");

    tracing::debug!(?arguments, "starting stopwatch");

    if let Err(e) = run(arguments) {
        tracing::error!(%e, "Unable to run the stopwatch");
    }
}

fn set_log_level(arguments: &Arguments) -> anyhow::Result<()> {
    LogTracer::init()?;

    let level = match arguments.verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Stdout belongs to the terminal display.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn run(arguments: Arguments) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()?;
    let stopwatch = Stopwatch::new(
        MonotonicClock::default(),
        arguments.tick_interval(),
        runtime.handle().clone(),
    );

    #[cfg(feature = "ui")]
    let result = if arguments.window {
        window::Window::new(stopwatch.clone())?
            .run(stopwatch.subscribe(), arguments.refresh_interval())
    } else {
        runtime.block_on(terminal(stopwatch.clone(), arguments.refresh_interval()))
    };

    #[cfg(not(feature = "ui"))]
    let result = runtime.block_on(terminal(stopwatch.clone(), arguments.refresh_interval()));

    // The stdin reader may still be blocked on a read.
    runtime.shutdown_background();
    result?;

    if arguments.json {
        println!("{}", serde_json::to_string_pretty(&stopwatch.snapshot())?);
    }

    Ok(())
}

async fn terminal(stopwatch: Stopwatch<MonotonicClock>, refresh: Duration) -> anyhow::Result<()> {
    let (sender, mut receiver) = tokio::sync::mpsc::channel(16);

    let reader = tokio::task::spawn_blocking(move || console::read_loop(io::stdin().lock(), sender));
    let renderer = tokio::spawn(timer::render(
        stopwatch.subscribe(),
        Screen::new(io::stdout()),
        refresh,
    ));

    while let Some(input) = receiver.recv().await {
        match input {
            Input::Quit => break,
            Input::Command(command) => {
                if let Err(e) = stopwatch.apply(command) {
                    tracing::warn!(%e, %command, "Rejected command");
                }
            }
        }
    }

    renderer.abort();
    println!();

    reader.await?
}
