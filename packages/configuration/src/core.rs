use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Core tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Core {
    /// Path to the credentials file, one `username password` pair per line.
    /// The file is loaded once, before the tracker starts serving.
    #[serde(default = "Core::default_credentials_path")]
    pub credentials_path: String,

    /// Session liveness policy.
    #[serde(default = "Core::default_session_policy")]
    pub session_policy: SessionPolicy,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            credentials_path: Self::default_credentials_path(),
            session_policy: Self::default_session_policy(),
        }
    }
}

impl Core {
    fn default_credentials_path() -> String {
        String::from("./storage/tracker/etc/credentials.txt")
    }

    fn default_session_policy() -> SessionPolicy {
        SessionPolicy::default()
    }
}

/// Session liveness policy.
///
/// Peers signal liveness with periodic heartbeats. A session whose last
/// heartbeat is older than the timeout is reported as not live, but it is
/// only removed when the user disconnects explicitly.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Maximum time in seconds since the last heartbeat before a session
    /// stops being considered live.
    #[serde(default = "SessionPolicy::default_heartbeat_timeout")]
    pub heartbeat_timeout: u64,

    /// Interval in seconds between the heartbeats a peer sends once it is
    /// authenticated.
    #[serde(default = "SessionPolicy::default_heartbeat_interval")]
    pub heartbeat_interval: u64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            heartbeat_timeout: Self::default_heartbeat_timeout(),
            heartbeat_interval: Self::default_heartbeat_interval(),
        }
    }
}

impl SessionPolicy {
    fn default_heartbeat_timeout() -> u64 {
        3
    }

    fn default_heartbeat_interval() -> u64 {
        2
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout)
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval)
    }
}
