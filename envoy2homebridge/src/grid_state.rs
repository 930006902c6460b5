use std::fmt;

use serde_derive::Deserialize;

/// Grid states for which the accessory is switched on.
const ON_GRID_STATES: [&str; 2] = ["on-grid", "multimode-ongrid"];

/// Connection mode reported by the inverter, kept as the raw token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct GridState(String);

impl GridState {
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_on(&self) -> bool {
        ON_GRID_STATES.contains(&self.as_str())
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GridState {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
