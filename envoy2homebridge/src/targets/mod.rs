pub mod homebridge;
pub mod notifier;
