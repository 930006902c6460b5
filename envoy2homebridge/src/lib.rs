// externally visible interfaces
pub mod config;
pub mod control_loop;
pub mod error;
pub mod grid_state;
pub mod poller;
pub mod shutdown;
pub mod sources;
pub mod targets;
