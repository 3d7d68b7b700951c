use crate::command::Command;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub mod clock;
pub mod engine;
pub mod error;
pub mod lap;
pub mod snapshot;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{Engine, Epoch};
pub use error::Error;
pub use lap::LapRecord;
pub use snapshot::{Phase, StopwatchState};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// A render surface.
pub trait Observer {
    fn on_snapshot(&self, state: &StopwatchState);
}

struct Inner<C> {
    engine: Engine<C>,
    ticker: Option<JoinHandle<()>>,
}

/// Shared handle to an engine, its tick loop and its published snapshots.
///
/// Every mutation goes through one mutex and publishes a fresh snapshot before the lock is
/// released, so subscribers see mutations in order.
pub struct Stopwatch<C> {
    inner: Arc<Mutex<Inner<C>>>,
    sender: watch::Sender<StopwatchState>,
    runtime: Handle,
    tick_interval: Duration,
}

impl<C> Clone for Stopwatch<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sender: self.sender.clone(),
            runtime: self.runtime.clone(),
            tick_interval: self.tick_interval,
        }
    }
}

impl<C> Stopwatch<C>
where
    C: Clock + Send + 'static,
{
    pub fn new(clock: C, tick_interval: Duration, runtime: Handle) -> Self {
        let engine = Engine::new(clock);
        let (sender, _) = watch::channel(engine.snapshot());

        Self {
            inner: Arc::new(Mutex::new(Inner {
                engine,
                ticker: None,
            })),
            sender,
            runtime,
            tick_interval,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StopwatchState> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> StopwatchState {
        lock(&self.inner).engine.snapshot()
    }

    pub fn start(&self) {
        let mut guard = lock(&self.inner);
        if guard.engine.is_running() {
            return;
        }

        let epoch = guard.engine.start();
        self.schedule(&mut *guard, epoch);
        self.publish(&*guard);
    }

    pub fn pause(&self) {
        let mut guard = lock(&self.inner);
        guard.engine.pause();
        cancel(&mut *guard);
        self.publish(&*guard);
    }

    pub fn reset(&self) {
        let mut guard = lock(&self.inner);
        guard.engine.reset();
        cancel(&mut *guard);
        self.publish(&*guard);
    }

    pub fn toggle(&self) {
        let mut guard = lock(&self.inner);
        if guard.engine.is_running() {
            guard.engine.pause();
            cancel(&mut *guard);
        } else {
            let epoch = guard.engine.start();
            self.schedule(&mut *guard, epoch);
        }
        self.publish(&*guard);
    }

    pub fn lap(&self) -> Result<LapRecord, Error> {
        let mut guard = lock(&self.inner);
        let lap = guard.engine.lap()?;
        self.publish(&*guard);
        Ok(lap)
    }

    pub fn apply(&self, command: Command) -> Result<(), Error> {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Toggle => self.toggle(),
            Command::Lap => {
                self.lap()?;
            }
            Command::Reset => self.reset(),
        }

        Ok(())
    }

    fn schedule(&self, guard: &mut Inner<C>, epoch: Epoch) {
        cancel(guard);

        let task = tick_loop(
            Arc::downgrade(&self.inner),
            self.sender.clone(),
            epoch,
            self.tick_interval,
        );
        guard.ticker = Some(self.runtime.spawn(task));
    }

    fn publish(&self, guard: &Inner<C>) {
        publish(&self.sender, &guard.engine);
    }
}

fn lock<C>(inner: &Mutex<Inner<C>>) -> MutexGuard<'_, Inner<C>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cancel<C>(guard: &mut Inner<C>) {
    if let Some(ticker) = guard.ticker.take() {
        ticker.abort();
    }
}

async fn tick_loop<C: Clock>(
    inner: Weak<Mutex<Inner<C>>>,
    sender: watch::Sender<StopwatchState>,
    epoch: Epoch,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let Some(shared) = inner.upgrade() else {
            break;
        };

        let mut guard = lock(&shared);
        if !guard.engine.refresh(epoch) {
            break;
        }

        publish(&sender, &guard.engine);
    }
}

/// Notifies subscribers only when the snapshot actually changed.
fn publish<C: Clock>(sender: &watch::Sender<StopwatchState>, engine: &Engine<C>) {
    sender.send_if_modified(|state| {
        let snapshot = engine.snapshot();
        if *state == snapshot {
            false
        } else {
            *state = snapshot;
            true
        }
    });
}

/// Feeds changed snapshots to `observer`, polling every `period`.
///
/// Returns once every `Stopwatch` handle publishing to `receiver` is gone.
pub async fn render(
    mut receiver: watch::Receiver<StopwatchState>,
    observer: impl Observer,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = receiver.borrow_and_update().clone();
    observer.on_snapshot(&state);

    loop {
        interval.tick().await;

        match receiver.has_changed() {
            Ok(true) => {
                let state = receiver.borrow_and_update().clone();
                observer.on_snapshot(&state);
            }
            Ok(false) => {}
            Err(_) => break,
        }
    }
}
