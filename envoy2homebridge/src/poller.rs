use crate::error::Result;
use crate::grid_state::GridState;
use crate::sources::grid_source::GridSource;
use crate::targets::notifier::Notifier;
use log::{info, warn};
use std::time::{Duration, Instant};

/// Watches a grid source and forwards transitions to a notifier.
///
/// Besides transitions, the last known state is re-sent every
/// `refresh_interval` so that a receiver which lost its accessory state gets
/// it back. Without a refresh interval only transitions are forwarded.
pub struct Poller<S: GridSource, N: Notifier> {
    source: S,
    notifier: N,
    last_grid_state: Option<GridState>,
    next_refresh_deadline: Instant,
    refresh_interval: Option<Duration>,
}

impl<S: GridSource, N: Notifier> Poller<S, N> {
    pub fn new(source: S, notifier: N, refresh_interval: Option<Duration>) -> Self {
        Self::starting_at(source, notifier, refresh_interval, Instant::now())
    }

    pub fn starting_at(
        source: S,
        notifier: N,
        refresh_interval: Option<Duration>,
        now: Instant,
    ) -> Self {
        Self {
            source,
            notifier,
            last_grid_state: None,
            next_refresh_deadline: now + refresh_interval.unwrap_or_default(),
            refresh_interval,
        }
    }

    pub fn last_grid_state(&self) -> Option<&GridState> {
        self.last_grid_state.as_ref()
    }

    pub fn next_refresh_deadline(&self) -> Instant {
        self.next_refresh_deadline
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn run_once(&mut self) -> Result<()> {
        self.run_once_at(Instant::now())
    }

    /// One poll-decide-notify step, with `now` as the current time.
    ///
    /// Fetch and parse failures leave the state untouched. The state is
    /// committed before notifying, so a failed delivery is only retried by
    /// the next refresh.
    pub fn run_once_at(&mut self, now: Instant) -> Result<()> {
        let Some(grid_state) = self.source.fetch_grid_state()? else {
            warn!("This system doesn't report a grid state, it probably lacks a meter collar");
            return Ok(());
        };

        if self.last_grid_state.as_ref() != Some(&grid_state) {
            info!("Grid state transitions to {grid_state}");
            self.commit(grid_state.clone(), now);
            self.notifier.notify(&grid_state)
        } else if self.refresh_due(now) {
            info!("Refreshing grid state {grid_state}");
            self.commit(grid_state.clone(), now);
            self.notifier.notify(&grid_state)
        } else {
            Ok(())
        }
    }

    fn refresh_due(&self, now: Instant) -> bool {
        self.refresh_interval.is_some()
            && self.last_grid_state.is_some()
            && now >= self.next_refresh_deadline
    }

    fn commit(&mut self, grid_state: GridState, now: Instant) {
        self.last_grid_state = Some(grid_state);
        if let Some(refresh_interval) = self.refresh_interval {
            self.next_refresh_deadline = now + refresh_interval;
        }
    }
}
