use crate::command::Command;
use crate::timer::clock::Clock;
use crate::timer::error::Error;
use crate::timer::lap::LapRecord;
use crate::timer::snapshot::{Phase, StopwatchState};

/// Identifies one running session. Bumped on every start and reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Epoch(u64);

impl Epoch {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// The stopwatch state machine: Reset, Running and Paused.
///
/// While running, elapsed time is always recomputed from an anchor
/// (`now - anchor`) so missed ticks never cause drift.
#[derive(Debug)]
pub struct Engine<C> {
    clock: C,
    phase: Phase,
    anchor: f64,
    elapsed: f64,
    laps: Vec<LapRecord>,
    epoch: Epoch,
}

impl<C: Clock> Engine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            phase: Phase::Reset,
            anchor: 0.0,
            elapsed: 0.0,
            laps: Vec::new(),
            epoch: Epoch::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    /// Starts or resumes. Returns the epoch ticks must carry to be accepted.
    pub fn start(&mut self) -> Epoch {
        match self.phase {
            Phase::Running => return self.epoch,
            Phase::Reset => {
                self.elapsed = 0.0;
                self.laps.clear();
            }
            Phase::Paused => {}
        }

        self.anchor = self.clock.now() - self.elapsed;
        self.phase = Phase::Running;
        self.epoch = self.epoch.next();

        tracing::debug!(elapsed = self.elapsed, epoch = self.epoch.0, "started");

        self.epoch
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            tracing::debug!(elapsed = self.elapsed, "paused");
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Reset;
        self.anchor = 0.0;
        self.elapsed = 0.0;
        self.laps.clear();
        self.epoch = self.epoch.next();

        tracing::debug!(epoch = self.epoch.0, "reset");
    }

    /// The single start/pause control.
    pub fn toggle(&mut self) -> Phase {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }

        self.phase
    }

    pub fn lap(&mut self) -> Result<LapRecord, Error> {
        if !self.is_running() {
            return Err(Error::InvalidTransition {
                command: Command::Lap,
                phase: self.phase,
            });
        }

        let lap = LapRecord::after(self.laps.last(), self.elapsed);
        self.laps.push(lap);

        tracing::debug!(
            split = lap.split_seconds,
            cumulative = lap.cumulative_seconds,
            "recorded lap"
        );

        Ok(lap)
    }

    /// Recomputes elapsed time. Ignored unless running.
    pub fn tick(&mut self, now: f64) {
        if self.is_running() {
            // Never move backwards, even if ticks arrive out of order.
            self.elapsed = self.elapsed.max(now - self.anchor).max(0.0);
        }
    }

    /// Ticks only on behalf of the current running session.
    ///
    /// Returns `false` when the tick is stale and whoever scheduled it should stop.
    pub fn tick_epoch(&mut self, epoch: Epoch, now: f64) -> bool {
        if epoch != self.epoch || !self.is_running() {
            tracing::trace!(stale = epoch.0, current = self.epoch.0, "discarded tick");
            return false;
        }

        self.tick(now);
        true
    }

    /// Ticks with the engine's own clock.
    pub fn refresh(&mut self, epoch: Epoch) -> bool {
        let now = self.clock.now();
        self.tick_epoch(epoch, now)
    }

    pub fn apply(&mut self, command: Command) -> Result<(), Error> {
        match command {
            Command::Start => {
                self.start();
            }
            Command::Pause => self.pause(),
            Command::Toggle => {
                self.toggle();
            }
            Command::Lap => {
                self.lap()?;
            }
            Command::Reset => self.reset(),
        }

        Ok(())
    }

    pub fn snapshot(&self) -> StopwatchState {
        StopwatchState {
            elapsed_seconds: self.elapsed,
            running: self.is_running(),
            phase: self.phase,
            laps: self.laps.clone(),
        }
    }
}
