use crate::error::Result;
use crate::grid_state::GridState;

use super::grid_source::GridSource;

/// Replays a fixed sequence of grid states, wrapping around at the end.
/// An empty sequence behaves like a device without a meter collar.
pub struct FakeGridSource {
    pub states: Vec<GridState>,
    position: usize,
}

impl FakeGridSource {
    pub fn new(states: Vec<GridState>) -> Self {
        Self {
            states,
            position: 0,
        }
    }
}

impl Default for FakeGridSource {
    fn default() -> Self {
        Self::new(vec!["on-grid".into(), "off-grid".into()])
    }
}

impl GridSource for FakeGridSource {
    fn fetch_grid_state(&mut self) -> Result<Option<GridState>> {
        if self.states.is_empty() {
            return Ok(None);
        }
        let state = self.states[self.position % self.states.len()].clone();
        self.position = self.position.wrapping_add(1);
        Ok(Some(state))
    }
}

#[cfg(test)]
mod test {
    use super::FakeGridSource;
    use crate::grid_state::GridState;
    use crate::sources::grid_source::GridSource;

    #[test]
    fn test_cycles_states() {
        let mut source = FakeGridSource::default();
        let seen: Vec<_> = (0..3)
            .map(|_| source.fetch_grid_state().unwrap().unwrap())
            .collect();

        assert_eq!(
            seen,
            vec![
                GridState::from("on-grid"),
                GridState::from("off-grid"),
                GridState::from("on-grid")
            ]
        );
    }

    #[test]
    fn test_empty_reports_nothing() {
        let mut source = FakeGridSource::new(vec![]);
        assert_eq!(source.fetch_grid_state().unwrap(), None);
    }
}
