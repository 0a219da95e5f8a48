//! Configuration data structures for [BitTrickle](https://docs.rs/bittrickle).
//!
//! The configuration is loaded from a [TOML](https://toml.io/en/) file
//! `bittrickle.toml` in the working directory or from an environment variable
//! with the same content as the file. When neither is present the default
//! configuration is used.
//!
//! # Sections
//!
//! Each section in the toml structure is mapped to a data structure:
//!
//! - `[core]` → [`Core`]: credentials file and session policy.
//! - `[udp_tracker]` → [`UdpTracker`]: the socket the control server binds to.
//! - `[logging]` → [`Logging`]: the threshold for the operator log.
//!
//! # Default configuration
//!
//! The default configuration is:
//!
//! ```toml
//! [logging]
//! threshold = "info"
//!
//! [core]
//! credentials_path = "./storage/tracker/etc/credentials.txt"
//!
//! [core.session_policy]
//! heartbeat_timeout = 3
//! heartbeat_interval = 2
//!
//! [udp_tracker]
//! bind_address = "0.0.0.0:6969"
//! ```
pub mod core;
pub mod logging;
pub mod udp_tracker;

use std::fs;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::core::{Core, SessionPolicy};
pub use crate::logging::{Logging, Threshold};
pub use crate::udp_tracker::UdpTracker;

/// The whole `bittrickle.toml` file content. It has priority over the config
/// file, even if the file is not on the default path.
pub const ENV_VAR_CONFIG_TOML: &str = "BITTRICKLE_CONFIG_TOML";

/// The `bittrickle.toml` file location.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "BITTRICKLE_CONFIG_TOML_PATH";

/// The default `bittrickle.toml` file location.
pub const DEFAULT_CONFIG_TOML_PATH: &str = "./bittrickle.toml";

/// Prefix for the environment variables overriding single options.
const ENV_VAR_PREFIX: &str = "BITTRICKLE_";

/// Errors returned when loading or saving the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {source}")]
    Figment {
        #[from]
        source: figment::Error,
    },

    #[error("unable to write the configuration to {path}: {source}")]
    UnableToWriteFile { path: String, source: std::io::Error },
}

/// The whole tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Configuration {
    /// Logging configuration.
    #[serde(default)]
    pub logging: Logging,

    /// Core tracker configuration.
    #[serde(default)]
    pub core: Core,

    /// UDP control server configuration.
    #[serde(default)]
    pub udp_tracker: UdpTracker,
}

impl Configuration {
    /// Loads the configuration from the configuration file, with
    /// `BITTRICKLE_`-prefixed environment variables taking precedence.
    ///
    /// # Errors
    ///
    /// Will return `Err` if `path` does not exist or has a bad configuration.
    pub fn load_from_file(path: &str) -> Result<Configuration, Error> {
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_VAR_PREFIX));

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Loads the configuration from a TOML source, usually the content of the
    /// `BITTRICKLE_CONFIG_TOML` environment variable.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the source is not valid TOML or has a bad
    /// configuration.
    pub fn load_from_source(toml_source: &str) -> Result<Configuration, Error> {
        let figment = Figment::new()
            .merge(Toml::string(toml_source))
            .merge(Env::prefixed(ENV_VAR_PREFIX));

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Saves the configuration to the configuration file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file cannot be written.
    pub fn save_to_file(&self, path: &str) -> Result<(), Error> {
        fs::write(path, self.to_toml()).map_err(|source| Error::UnableToWriteFile {
            path: path.to_owned(),
            source,
        })
    }

    /// Encodes the configuration to TOML.
    fn to_toml(&self) -> String {
        toml::to_string(self).expect("the configuration should be encodable to TOML")
    }
}

#[cfg(test)]
mod tests {
    use crate::{Configuration, Threshold};

    #[test]
    fn configuration_should_have_a_default() {
        let configuration = Configuration::default();

        assert_eq!(configuration.logging.threshold, Threshold::Info);
        assert_eq!(configuration.core.session_policy.heartbeat_timeout, 3);
        assert_eq!(configuration.core.session_policy.heartbeat_interval, 2);
        assert_eq!(configuration.udp_tracker.bind_address, "0.0.0.0:6969".parse().unwrap());
    }

    #[test]
    fn configuration_should_be_loaded_from_a_toml_source() {
        let source = r#"
            [logging]
            threshold = "off"

            [core]
            credentials_path = "./credentials.txt"

            [core.session_policy]
            heartbeat_timeout = 10
            heartbeat_interval = 5

            [udp_tracker]
            bind_address = "127.0.0.1:8000"
        "#;

        let configuration = Configuration::load_from_source(source).unwrap();

        assert_eq!(configuration.logging.threshold, Threshold::Off);
        assert_eq!(configuration.core.credentials_path, "./credentials.txt");
        assert_eq!(configuration.core.session_policy.heartbeat_timeout, 10);
        assert_eq!(configuration.udp_tracker.bind_address, "127.0.0.1:8000".parse().unwrap());
    }

    #[test]
    fn configuration_sections_should_be_optional_in_the_toml_source() {
        let configuration = Configuration::load_from_source("[core]").unwrap();

        assert_eq!(configuration, Configuration::default());
    }

    #[test]
    fn configuration_should_survive_a_toml_round_trip() {
        let configuration = Configuration::default();

        let round_tripped = Configuration::load_from_source(&configuration.to_toml()).unwrap();

        assert_eq!(round_tripped, configuration);
    }
}
