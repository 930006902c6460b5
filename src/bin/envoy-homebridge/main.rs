mod logging;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use envoy2homebridge::config::{BridgeConfig, PartialConfig, SourceConfig};
use envoy2homebridge::control_loop::ControlLoop;
use envoy2homebridge::poller::Poller;
use envoy2homebridge::shutdown::ShutdownFlag;
use envoy2homebridge::sources::envoy::proxy::EnvoyProxy;
use envoy2homebridge::sources::fake::FakeGridSource;
use envoy2homebridge::sources::grid_source::GridSource;
use envoy2homebridge::targets::homebridge::webhook::HomebridgeWebhook;
use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
use std::fmt::Display;
use std::path::PathBuf;

use log::info;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// How often to poll, in seconds
    #[arg(long, env = "INTERVAL")]
    interval: Option<f64>,

    /// Base URL for the envoyproxy install
    #[arg(long, env = "ENVOYPROXY_URL")]
    envoyproxy_url: Option<String>,

    /// ID of the homebridge-dummy switch
    #[arg(long, env = "HOMEBRIDGE_ACCESSORY_ID")]
    homebridge_accessory_id: Option<String>,

    /// URL to send webhooks to
    #[arg(long, env = "HOMEBRIDGE_WEBHOOK_URL")]
    homebridge_webhook_url: Option<String>,

    /// Re-send the current state every this many polls, 0 to disable
    #[arg(long, env = "REFRESH_MULTIPLIER")]
    refresh_multiplier: Option<u32>,

    /// Timeout for outbound HTTP calls, in seconds
    #[arg(long, env = "HTTP_TIMEOUT")]
    http_timeout: Option<f64>,

    /// Use a fake grid source
    #[arg(short, long)]
    fake: bool,

    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> PartialConfig {
        PartialConfig {
            verbose: self.verbose.then_some(true),
            fake: self.fake.then_some(true),
            interval: self.interval,
            envoyproxy_url: self.envoyproxy_url.clone(),
            homebridge_accessory_id: self.homebridge_accessory_id.clone(),
            homebridge_webhook_url: self.homebridge_webhook_url.clone(),
            refresh_multiplier: self.refresh_multiplier,
            http_timeout: self.http_timeout,
        }
    }
}

fn usage_error(kind: ErrorKind, message: impl Display) -> ! {
    Cli::command().error(kind, message).exit()
}

fn resolve_config(args: &Cli) -> BridgeConfig {
    let file = args
        .config
        .as_deref()
        .map(PartialConfig::from_file)
        .transpose()
        .unwrap_or_else(|e| usage_error(ErrorKind::Io, e))
        .unwrap_or_default();

    let partial = args.overrides().or(file);
    let kind = if partial.missing().is_empty() {
        ErrorKind::ValueValidation
    } else {
        ErrorKind::MissingRequiredArgument
    };
    BridgeConfig::try_from(partial).unwrap_or_else(|e| usage_error(kind, e))
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = resolve_config(&args);
    logging::init_logger(config.verbose);
    info!("Running version: {}", env!("CARGO_PKG_VERSION"));

    let shutdown = ShutdownFlag::new();
    for signal in [SIGINT, SIGTERM, SIGQUIT] {
        signal_hook::flag::register(signal, shutdown.as_atomic())
            .with_context(|| format!("could not install handler for signal {signal}"))?;
    }

    let client = config.http_client()?;
    let refresh_interval = config.refresh_interval();
    info!(
        "Polling every {:?}, refreshing every {:?}",
        config.interval, refresh_interval
    );

    let source: Box<dyn GridSource> = match &config.source {
        SourceConfig::Fake => {
            info!("Using a fake grid source");
            Box::new(FakeGridSource::default())
        }
        SourceConfig::Envoy { url } => {
            info!("envoyproxy: {url}");
            Box::new(EnvoyProxy::new(client.clone(), url))
        }
    };

    info!(
        "Publishing to homebridge accessory {} at {}",
        config.homebridge_accessory_id, config.homebridge_webhook_url
    );
    let webhook = HomebridgeWebhook::new(
        client,
        &config.homebridge_webhook_url,
        &config.homebridge_accessory_id,
    );

    let mut poller = Poller::new(source, webhook, refresh_interval);
    ControlLoop::new(config.interval, shutdown).run(&mut poller);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::Cli;
    use clap::Parser;
    use envoy2homebridge::config::{BridgeConfig, SourceConfig};

    #[test]
    fn test_fake_runs_without_envoy_url() {
        let args = Cli::try_parse_from([
            "envoy-homebridge",
            "--fake",
            "--homebridge-accessory-id",
            "grid-switch",
            "--homebridge-webhook-url",
            "http://homebridge.local:51828/",
        ])
        .unwrap();

        let config = BridgeConfig::try_from(args.overrides()).unwrap();

        assert_eq!(config.source, SourceConfig::Fake);
        assert_eq!(config.homebridge_accessory_id, "grid-switch");
    }

    #[test]
    fn test_flags_override() {
        let args = Cli::try_parse_from([
            "envoy-homebridge",
            "-v",
            "--interval",
            "2.5",
            "--envoyproxy-url",
            "http://envoy.local/",
        ])
        .unwrap();
        let overrides = args.overrides();

        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.interval, Some(2.5));
        assert_eq!(overrides.envoyproxy_url.as_deref(), Some("http://envoy.local/"));
        assert_eq!(overrides.fake, None);
    }
}
