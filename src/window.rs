use slint::{ModelRc, SharedString, TimerMode, VecModel, Weak};
use std::time::Duration;
use stopwatch::timer::{Clock, Observer, Stopwatch, StopwatchState};
use tokio::sync::watch::Receiver;

slint::slint! {
import { Button, HorizontalBox, ListView, VerticalBox } from "std-widgets.slint";

export component MainWindow inherits Window {
    in property <string> time: "0.00";
    in property <[string]> laps;
    in property <bool> running;

    callback start-pause();
    callback reset();
    callback lap();

    preferred-width: 360px;
    preferred-height: 640px;
    title: "Stopwatch";
    background: #171717;

    VerticalBox {
        Text {
            text: "Stopwatch";
            color: white;
            font-size: 24px;
            horizontal-alignment: center;
        }
        Text {
            text: root.time;
            color: white;
            font-size: 48px;
            horizontal-alignment: center;
            vertical-alignment: center;
            vertical-stretch: 1;
        }
        ListView {
            height: 100px;
            for lap in root.laps: Text {
                text: lap;
                color: white;
            }
        }
        HorizontalBox {
            alignment: center;
            Button {
                text: "Reset";
                clicked => {
                    root.reset();
                }
            }
            Button {
                text: root.running ? "Pause" : "Start";
                clicked => {
                    root.start-pause();
                }
            }
            Button {
                text: "Lap";
                enabled: root.running;
                clicked => {
                    root.lap();
                }
            }
        }
    }
}
}

pub struct Window {
    main_window: MainWindow,
}

impl Window {
    pub fn new<C>(stopwatch: Stopwatch<C>) -> anyhow::Result<Self>
    where
        C: Clock + Send + 'static,
    {
        let main_window = MainWindow::new()?;

        main_window.on_start_pause({
            let stopwatch = stopwatch.clone();
            move || stopwatch.toggle()
        });
        main_window.on_reset({
            let stopwatch = stopwatch.clone();
            move || stopwatch.reset()
        });
        main_window.on_lap(move || {
            if let Err(e) = stopwatch.lap() {
                tracing::warn!(%e, "Rejected lap");
            }
        });

        Ok(Self { main_window })
    }

    /// Blocks until the window is closed, redrawing every `refresh`.
    pub fn run(&self, mut receiver: Receiver<StopwatchState>, refresh: Duration) -> anyhow::Result<()> {
        let surface = Surface(self.main_window.as_weak());
        let state = receiver.borrow_and_update().clone();
        surface.on_snapshot(&state);

        let timer = slint::Timer::default();
        timer.start(TimerMode::Repeated, refresh, move || {
            if receiver.has_changed().unwrap_or(false) {
                let state = receiver.borrow_and_update().clone();
                surface.on_snapshot(&state);
            }
        });

        self.main_window.run()?;
        Ok(())
    }
}

struct Surface(Weak<MainWindow>);

impl Observer for Surface {
    fn on_snapshot(&self, state: &StopwatchState) {
        let state = state.clone();

        if let Err(e) = self.0.upgrade_in_event_loop(move |app| {
            let laps: Vec<SharedString> = state
                .recent_lap_lines()
                .into_iter()
                .map(SharedString::from)
                .collect();

            app.set_time(SharedString::from(state.display_time()));
            app.set_running(state.running);
            app.set_laps(ModelRc::new(VecModel::from(laps)));
        }) {
            tracing::error!(%e, "Failed to update the UI");
        }
    }
}
