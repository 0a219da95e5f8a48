//! Tracker application bootstrapping: configuration, logging and the core
//! tracker.
//!
//! The configuration comes, in order of priority, from:
//!
//! 1. The `BITTRICKLE_CONFIG_TOML` environment variable (the whole TOML
//!    content).
//! 2. The file named by `BITTRICKLE_CONFIG_TOML_PATH`, or `bittrickle.toml`
//!    in the working directory.
//! 3. The built-in defaults, when no configuration file exists.
use std::env;
use std::path::Path;
use std::sync::Arc;

use bittrickle_configuration::{Configuration, DEFAULT_CONFIG_TOML_PATH, ENV_VAR_CONFIG_TOML, ENV_VAR_CONFIG_TOML_PATH};

use crate::bootstrap;
use crate::core::Tracker;

/// It loads the configuration and builds the domain layer.
///
/// The command line port, when given, overrides the configured bind port.
///
/// # Panics
///
/// Will panic if the configuration cannot be loaded or the credentials file
/// cannot be read.
#[must_use]
pub fn setup(port_override: Option<u16>) -> (Arc<Configuration>, Arc<Tracker>) {
    let mut configuration = initialize_configuration();

    if let Some(port) = port_override {
        configuration.udp_tracker.bind_address.set_port(port);
    }

    let configuration = Arc::new(configuration);
    let tracker = initialize_with_configuration(&configuration);

    (configuration, tracker)
}

/// # Panics
///
/// Will panic if the credentials file cannot be read.
#[must_use]
pub fn initialize_with_configuration(configuration: &Arc<Configuration>) -> Arc<Tracker> {
    initialize_static();
    initialize_logging(configuration);
    Arc::new(initialize_tracker(configuration))
}

/// It initializes lazily-evaluated statics, such as the time the application
/// started.
pub fn initialize_static() {
    lazy_static::initialize(&bittrickle_clock::static_time::TIME_AT_APP_START);
}

/// # Panics
///
/// Will panic if the configuration source exists but cannot be parsed.
#[must_use]
fn initialize_configuration() -> Configuration {
    if let Ok(config_toml) = env::var(ENV_VAR_CONFIG_TOML) {
        println!("Loading configuration from environment variable {ENV_VAR_CONFIG_TOML}");
        return Configuration::load_from_source(&config_toml).expect("the configuration env var should hold valid TOML");
    }

    let config_path = env::var(ENV_VAR_CONFIG_TOML_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_TOML_PATH.to_owned());

    if Path::new(&config_path).exists() {
        println!("Loading configuration from config file {config_path}");
        Configuration::load_from_file(&config_path).expect("the configuration file should hold valid TOML")
    } else {
        Configuration::default()
    }
}

/// # Panics
///
/// Will panic if the credentials file cannot be read or parsed.
#[must_use]
pub fn initialize_tracker(config: &Arc<Configuration>) -> Tracker {
    Tracker::new(config).expect("it should be able to load the credentials file")
}

pub fn initialize_logging(config: &Arc<Configuration>) {
    bootstrap::logging::setup(config);
}
