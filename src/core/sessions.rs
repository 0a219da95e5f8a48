//! The session registry: which usernames are currently connected, from
//! where, and how recently they proved they are alive.
//!
//! A session is created by a successful `auth` and destroyed by an explicit
//! `xit`. Liveness is evaluated lazily, on demand, by comparing the last
//! heartbeat against the configured timeout. A session whose owner stops
//! heartbeating without disconnecting stays in the registry and is simply
//! reported as not live; there is no eviction sweep.
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use bittrickle_clock::clock::Time;
use bittrickle_clock::conv::convert_from_timestamp_to_datetime_utc;
use bittrickle_primitives::endpoint::TransferEndpoint;
use bittrickle_primitives::username::Username;
use bittrickle_primitives::DurationSinceUnixEpoch;
use chrono::{DateTime, Utc};

use crate::CurrentClock;

/// A tracker-side record of one currently-or-recently-authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: Username,
    /// The address control messages for this session arrive from. It is the
    /// session's sole identity proof: commands after `auth` carry no
    /// credentials.
    pub control_address: SocketAddr,
    /// The TCP port where this user's process accepts transfer connections.
    pub transfer_port: u16,
    /// Timestamp of the most recent liveness signal.
    pub last_heartbeat: DurationSinceUnixEpoch,
}

impl Session {
    #[must_use]
    pub fn new(username: Username, control_address: SocketAddr, transfer_port: u16) -> Session {
        Session {
            username,
            control_address,
            transfer_port,
            last_heartbeat: CurrentClock::now(),
        }
    }

    /// The endpoint other peers connect to when they download from this user.
    #[must_use]
    pub fn transfer_endpoint(&self) -> TransferEndpoint {
        TransferEndpoint::new(self.control_address.ip(), self.transfer_port)
    }

    /// The last heartbeat as a UTC datetime, for operator logs.
    #[must_use]
    pub fn last_heartbeat_time(&self) -> DateTime<Utc> {
        convert_from_timestamp_to_datetime_utc(self.last_heartbeat)
    }
}

/// The registry of sessions, owned by the tracker for its whole lifetime.
#[derive(Debug)]
pub struct SessionRegistry {
    heartbeat_timeout: Duration,
    sessions: BTreeMap<Username, Session>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(heartbeat_timeout: Duration) -> SessionRegistry {
        SessionRegistry {
            heartbeat_timeout,
            sessions: BTreeMap::new(),
        }
    }

    /// It opens a session, replacing any previous session for the same
    /// username. The caller is responsible for rejecting usernames that are
    /// still live.
    pub fn open(&mut self, session: Session) {
        self.sessions.insert(session.username.clone(), session);
    }

    /// It closes the session and returns it, or `None` if there was none.
    pub fn close(&mut self, username: &Username) -> Option<Session> {
        self.sessions.remove(username)
    }

    /// It records a liveness signal. Unknown usernames are ignored.
    pub fn touch(&mut self, username: &Username) {
        if let Some(session) = self.sessions.get_mut(username) {
            session.last_heartbeat = CurrentClock::now();
        }
    }

    #[must_use]
    pub fn get(&self, username: &Username) -> Option<&Session> {
        self.sessions.get(username)
    }

    /// Whether the username has a session whose last heartbeat is within the
    /// timeout. `false` when no session exists.
    #[must_use]
    pub fn is_live(&self, username: &Username) -> bool {
        self.sessions.get(username).is_some_and(|session| {
            CurrentClock::now()
                .checked_sub(session.last_heartbeat)
                .unwrap_or_default()
                <= self.heartbeat_timeout
        })
    }

    /// The transfer endpoint of the username's session, if that session is
    /// live.
    #[must_use]
    pub fn live_endpoint(&self, username: &Username) -> Option<TransferEndpoint> {
        self.is_live(username)
            .then(|| self.sessions.get(username).map(Session::transfer_endpoint))
            .flatten()
    }

    /// The usernames with a live session, in lexicographic order.
    pub fn live_usernames(&self) -> impl Iterator<Item = &Username> {
        self.sessions.keys().filter(|username| self.is_live(username))
    }

    /// Reverse lookup from the address a message arrived on back to the
    /// owning session. This is the sole authentication mechanism for all
    /// commands after `auth`.
    #[must_use]
    pub fn resolve_username(&self, control_address: &SocketAddr) -> Option<&Username> {
        self.sessions
            .values()
            .find(|session| session.control_address == *control_address)
            .map(|session| &session.username)
    }
}
