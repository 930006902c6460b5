pub mod envoy;
pub mod fake;
pub mod grid_source;
