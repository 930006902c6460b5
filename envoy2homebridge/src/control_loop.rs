use crate::error::Result;
use crate::poller::Poller;
use crate::shutdown::ShutdownFlag;
use crate::sources::grid_source::GridSource;
use crate::targets::notifier::Notifier;
use log::{error, info};
use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on a single sleep, and so on how long a shutdown request can
/// go unnoticed.
pub const DEFAULT_SLEEP_INCREMENT: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoopState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// One unit of work driven by the control loop.
pub trait Tick {
    fn tick(&mut self) -> Result<()>;
}

impl<S: GridSource, N: Notifier> Tick for Poller<S, N> {
    fn tick(&mut self) -> Result<()> {
        self.run_once()
    }
}

pub struct ControlLoop {
    poll_interval: Duration,
    sleep_increment: Duration,
    shutdown: ShutdownFlag,
    state: LoopState,
}

impl ControlLoop {
    pub fn new(poll_interval: Duration, shutdown: ShutdownFlag) -> Self {
        Self {
            poll_interval,
            sleep_increment: DEFAULT_SLEEP_INCREMENT,
            shutdown,
            state: LoopState::Starting,
        }
    }

    pub fn with_sleep_increment(mut self, sleep_increment: Duration) -> Self {
        self.sleep_increment = sleep_increment;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    fn set_state(&mut self, new_state: LoopState) {
        if self.state != new_state {
            self.state = new_state;
            info!("Control loop is {new_state:?}");
        }
    }

    /// Ticks every `poll_interval` until shutdown is requested. Tick errors
    /// are logged and never end the loop.
    pub fn run<T: Tick>(&mut self, ticker: &mut T) {
        self.set_state(LoopState::Running);

        while !self.shutdown_observed() {
            let next_target = Instant::now() + self.poll_interval;
            if let Err(e) = ticker.tick() {
                error!("Error in poll: {}", error_chain(&e));
            }
            self.sleep_until(next_target);
        }

        self.set_state(LoopState::Stopped);
    }

    fn shutdown_observed(&mut self) -> bool {
        if self.state == LoopState::Stopping {
            return true;
        }
        if self.shutdown.is_requested() {
            info!("Shutdown requested, exiting");
            self.set_state(LoopState::Stopping);
            return true;
        }
        false
    }

    fn sleep_until(&mut self, target: Instant) {
        loop {
            let now = Instant::now();
            if now >= target || self.shutdown_observed() {
                return;
            }
            thread::sleep((target - now).min(self.sleep_increment));
        }
    }
}

/// Renders an error followed by all of its sources.
fn error_chain(e: &(dyn Error + 'static)) -> String {
    std::iter::successors(Some(e), |&e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
