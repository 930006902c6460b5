use crate::error::Result;
use crate::grid_state::GridState;

pub trait Notifier {
    fn notify(&mut self, grid_state: &GridState) -> Result<()>;
}
