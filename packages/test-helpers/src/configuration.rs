//! Ephemeral tracker configurations for testing.
use std::env;
use std::fmt::Write as _;
use std::fs;

use bittrickle_configuration::{Configuration, Threshold};

use crate::random;

/// The credential entries preloaded in every ephemeral configuration.
pub const DEFAULT_CREDENTIALS: &[(&str, &str)] = &[
    ("alice", "Wonderland!23"),
    ("bob", "Builder#99"),
    ("carol", "Carols*2024"),
];

/// This configuration is used for testing. It binds to an ephemeral port and
/// writes a temporary credentials file, so configurations do not collide if
/// you run more than one tracker at the same time.
///
/// # Panics
///
/// Will panic if the temporary credentials file cannot be written.
#[must_use]
pub fn ephemeral() -> Configuration {
    ephemeral_with_credentials(DEFAULT_CREDENTIALS)
}

/// Same as [`ephemeral`], but with a custom credential list.
///
/// # Panics
///
/// Will panic if the temporary credentials file cannot be written.
#[must_use]
pub fn ephemeral_with_credentials(credentials: &[(&str, &str)]) -> Configuration {
    let mut config = Configuration::default();

    config.logging.threshold = Threshold::Off; // Change to `debug` for tests debugging

    // Ephemeral socket address for the UDP control server
    config.udp_tracker.bind_address = "127.0.0.1:0".parse().expect("it should be a valid socket address");

    // Ephemeral credentials file
    config.core.credentials_path = write_temp_credentials_file(credentials);

    config
}

/// Same as [`ephemeral`], but with a custom heartbeat timeout in seconds,
/// for tests that let sessions go stale in real time.
///
/// # Panics
///
/// Will panic if the temporary credentials file cannot be written.
#[must_use]
pub fn ephemeral_with_heartbeat_timeout(heartbeat_timeout: u64) -> Configuration {
    let mut config = ephemeral();
    config.core.session_policy.heartbeat_timeout = heartbeat_timeout;
    config
}

fn write_temp_credentials_file(credentials: &[(&str, &str)]) -> String {
    let path = env::temp_dir().join(format!("credentials_{}.txt", random::string(16)));

    let mut contents = String::new();
    for (username, password) in credentials {
        writeln!(contents, "{username} {password}").expect("it should write into the string buffer");
    }

    fs::write(&path, contents).expect("it should write the temporary credentials file");

    path.to_str()
        .expect("the temporary credentials path should be valid UTF-8")
        .to_owned()
}
