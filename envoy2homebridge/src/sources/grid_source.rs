use crate::error::Result;
use crate::grid_state::GridState;

/// Reachability of a networked source as seen by its last request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkState {
    Unknown,
    Online,
    Offline,
}

pub trait GridSource {
    /// Reads the current grid state. `Ok(None)` means the device answered
    /// but does not report a grid state at all.
    fn fetch_grid_state(&mut self) -> Result<Option<GridState>>;
}

impl<T: GridSource + ?Sized> GridSource for Box<T> {
    fn fetch_grid_state(&mut self) -> Result<Option<GridState>> {
        (**self).fetch_grid_state()
    }
}
