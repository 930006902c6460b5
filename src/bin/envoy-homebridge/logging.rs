use env_logger::{Builder, Target};
use log::LevelFilter;

/// `-v` sets the base level, `RUST_LOG` directives are applied on top of it.
fn builder(verbose: bool, rust_log: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    if let Some(filters) = rust_log {
        builder.parse_filters(filters);
    }
    builder.target(Target::Stderr).format_timestamp_millis();
    builder
}

/// Timestamped lines on stderr.
pub fn init_logger(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    builder(verbose, rust_log.as_deref()).init();
}

#[cfg(test)]
mod test {
    use super::builder;
    use log::{Level, Log, Metadata};

    fn enabled(logger: &impl Log, level: Level, target: &str) -> bool {
        logger.enabled(&Metadata::builder().level(level).target(target).build())
    }

    #[test]
    fn test_verbose_enables_debug() {
        let logger = builder(true, None).build();
        assert!(enabled(&logger, Level::Debug, "envoy2homebridge::poller"));
        assert!(!enabled(&logger, Level::Trace, "envoy2homebridge::poller"));

        let logger = builder(false, None).build();
        assert!(!enabled(&logger, Level::Debug, "envoy2homebridge::poller"));
        assert!(enabled(&logger, Level::Info, "envoy2homebridge::poller"));
    }

    #[test]
    fn test_rust_log_refines_verbose() {
        let logger = builder(true, Some("reqwest=warn")).build();

        assert!(enabled(&logger, Level::Debug, "envoy2homebridge::poller"));
        assert!(!enabled(&logger, Level::Info, "reqwest::connect"));
    }
}
