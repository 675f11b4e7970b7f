//! Relay CLI - drive an entertainment system from the command line.
//!
//! Builds an in-memory registry of virtual devices from a YAML file, attaches
//! the configured media sources, and runs one action against the selected
//! source. Results are printed as JSON on stdout; logs go to stderr.

mod config;
mod virtual_device;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use entertainment_core::{
    CommandKind, CommandOutput, EntertainmentSystem, InMemoryRegistry, MediaCommand, MediaSource,
    RelayContext, TokioScheduler,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::RelayConfig;
use crate::virtual_device::VirtualDevices;

/// Relay CLI - send media commands through an entertainment system.
#[derive(Parser, Debug)]
#[command(name = "relay-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE", env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "RELAY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Media source to select before running the action (overrides config file).
    #[arg(short, long)]
    source: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Relay a command, e.g. `run set_volume_level --args '{"volume":0.4}'`.
    Run {
        /// Command name (`turn_on`, `media_seek`, ...).
        command: String,

        /// Command arguments as a JSON object.
        #[arg(short, long, value_name = "JSON")]
        args: Option<String>,
    },

    /// List media sources with their aggregate features.
    Sources,

    /// Set the selected source's ambiance brightness, 0.0..=1.0.
    Brightness { level: f64 },
}

#[derive(Serialize)]
struct RunReport<'a> {
    source: &'a str,
    command: &'static str,
    performed: bool,
    handled_by: Option<&'a str>,
    output: Option<CommandOutput>,
}

#[derive(Serialize)]
struct SourceReport<'a> {
    name: &'a str,
    sort_order: u32,
    selected: bool,
    features: Vec<String>,
    ambiance: bool,
}

#[derive(Serialize)]
struct BrightnessReport<'a> {
    source: &'a str,
    light: &'a str,
    level: f64,
    brightness: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Relay CLI v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        RelayConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(source) = args.source {
        config.default_source = Some(source);
    }

    // Register virtual devices and build the system
    let registry = Arc::new(InMemoryRegistry::new());
    let devices = VirtualDevices::register(&config, &registry);
    let context = RelayContext::new(registry, TokioScheduler::current().arc());
    let system = EntertainmentSystem::new(&config.system, context);
    system.attach_all().await;

    if let Some(name) = &config.default_source {
        system
            .select(name)
            .with_context(|| format!("Cannot select media source {name}"))?;
    }

    let report = match args.action {
        Action::Run { command, args } => {
            let command = parse_command(&command, args.as_deref())?;
            run(&system, &devices, command).await?
        }
        Action::Sources => list_sources(&system)?,
        Action::Brightness { level } => set_brightness(&system, level).await?,
    };

    println!("{report}");
    Ok(())
}

/// Builds a [`MediaCommand`] from its name and optional JSON arguments.
fn parse_command(name: &str, args: Option<&str>) -> Result<MediaCommand> {
    if CommandKind::from_name(name).is_none() {
        let known: Vec<_> = CommandKind::ALL.iter().map(|kind| kind.name()).collect();
        bail!("Unknown command '{name}' (expected one of: {})", known.join(", "));
    }

    let mut object = match args {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("Invalid --args JSON")? {
            Value::Object(map) => map,
            _ => bail!("--args must be a JSON object"),
        },
        None => Map::new(),
    };
    object.insert("command".into(), Value::String(name.to_string()));

    serde_json::from_value(Value::Object(object))
        .with_context(|| format!("Invalid arguments for '{name}'"))
}

fn selected(system: &EntertainmentSystem) -> Result<Arc<MediaSource>> {
    system
        .selected()
        .ok_or_else(|| anyhow!("No media sources configured"))
}

async fn run(
    system: &EntertainmentSystem,
    devices: &VirtualDevices,
    command: MediaCommand,
) -> Result<String> {
    let source = selected(system)?;
    let kind = command.kind();

    let output = source
        .relay(command)
        .await
        .with_context(|| format!("{} failed on {}", kind, source.name()))?;

    let report = RunReport {
        source: source.name(),
        command: kind.name(),
        performed: output.is_some(),
        handled_by: devices.handled_by(kind),
        output,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn list_sources(system: &EntertainmentSystem) -> Result<String> {
    let selected = system.selected();
    let reports: Vec<_> = system
        .sources()
        .iter()
        .map(|source| SourceReport {
            name: source.name(),
            sort_order: source.sort_order(),
            selected: selected
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, source)),
            features: source
                .supported_features()
                .iter_names()
                .map(|(name, _)| name.to_ascii_lowercase())
                .collect(),
            ambiance: source.ambiance().is_some(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&reports)?)
}

async fn set_brightness(system: &EntertainmentSystem, level: f64) -> Result<String> {
    let source = selected(system)?;
    let ambiance = source
        .ambiance()
        .ok_or_else(|| anyhow!("{} has no ambiance configured", source.name()))?;
    let light = ambiance.brightness().device().ok_or_else(|| {
        anyhow!(
            "Brightness light {} is not registered",
            ambiance.brightness().entity_id()
        )
    })?;

    let brightness = ambiance.brightness_scale().to_device(level);
    light
        .set_brightness(brightness)
        .await
        .with_context(|| format!("Failed to set brightness on {}", light.entity_id()))?;

    let report = BrightnessReport {
        source: source.name(),
        light: light.entity_id(),
        level,
        brightness,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
