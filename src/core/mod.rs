//! The core `tracker` module contains the generic peer-discovery logic which
//! is independent of the delivery layer.
//!
//! It's a domain layer which does not specify how the end user should connect
//! to the `Tracker`. Typically this module is intended to be used by higher
//! modules like the UDP control server.
//!
//! ```text
//! Delivery layer     Domain layer
//!
//! UDP control server |> Core tracker
//! ```
//!
//! # Table of contents
//!
//! - [Tracker](#tracker)
//! - [Sessions](#sessions)
//! - [Publications](#publications)
//! - [Atomicity](#atomicity)
//!
//! # Tracker
//!
//! The `Tracker` is the main struct in this module. It has three groups of
//! responsibilities:
//!
//! - **Authentication**: it checks `auth` requests against the read-only
//!   credential store loaded at startup.
//! - **Sessions**: it tracks which usernames are connected, from which
//!   control address, on which transfer port, and how recently they have
//!   heartbeated. See [`sessions`].
//! - **Publications**: it tracks which user published which filename and
//!   whether each publication is live or dormant. See [`directory`].
//!
//! # Sessions
//!
//! A session is created by a successful `auth` and destroyed by an explicit
//! `xit`. Between those two points the session's control address is the only
//! proof of identity a command carries: every handler resolves the caller by
//! reverse-looking-up the address the datagram came from.
//!
//! Liveness is lazy. A peer is expected to heartbeat every couple of seconds;
//! consumers that care about reachability (file resolution, peer listing)
//! compare the last heartbeat against the timeout at the moment they need the
//! answer. A session that stops heartbeating without disconnecting stays in
//! the registry indefinitely and is simply reported as not live. That is a
//! deliberate trade-off: it keeps the write path heartbeat-only and makes
//! reconnection after a crash cheap, at the cost of registry growth under
//! churn.
//!
//! # Publications
//!
//! Publishing associates a filename with the publishing user. Disconnecting
//! does not forget the association, it only marks it dormant; a later
//! reconnect reactivates every dormant publication the user owns without an
//! explicit republish.
//!
//! # Atomicity
//!
//! Command handling for each inbound message must execute as one atomic unit
//! of mutation-then-response before the next message is processed. The
//! session registry and the file directory therefore live behind a single
//! lock, and every operation takes the lock exactly once for its whole
//! read-modify cycle. Do not split the lock per map without re-proving the
//! cross-map invariants (reactivation on `auth`, deactivation on `xit`,
//! liveness checks during resolution).
pub mod auth;
pub mod directory;
pub mod error;
pub mod sessions;

use std::net::SocketAddr;
use std::panic::Location;

use bittrickle_configuration::{Configuration, SessionPolicy};
use bittrickle_primitives::endpoint::TransferEndpoint;
use bittrickle_primitives::username::Username;
use tokio::sync::Mutex;
use tracing::{debug, info};

use self::auth::Credentials;
use self::directory::FileDirectory;
use self::error::Error;
use self::sessions::{Session, SessionRegistry};

/// The domain layer tracker service.
///
/// Its main responsibility is to resolve file requests to a reachable
/// holder's transfer endpoint. But it's also a container for the credential
/// store, the session registry and the file directory.
///
/// > **NOTICE**: the `Tracker` is not responsible for handling the network
/// > layer. Typically, the `Tracker` is used by a higher application service
/// > that handles the network layer.
pub struct Tracker {
    credentials: Credentials,
    state: Mutex<State>,
}

/// The mutable tracker state. Both maps sit behind one lock on purpose; see
/// the module docs on atomicity.
struct State {
    sessions: SessionRegistry,
    directory: FileDirectory,
}

impl Tracker {
    /// `Tracker` constructor. It loads the credential store from the file
    /// named by the configuration.
    ///
    /// # Errors
    ///
    /// Will return an `auth::Error` if the credentials file cannot be read or
    /// parsed.
    pub fn new(config: &Configuration) -> Result<Tracker, auth::Error> {
        let credentials = Credentials::load_from_file(&config.core.credentials_path)?;

        Ok(Tracker::with_credentials(credentials, config.core.session_policy))
    }

    /// `Tracker` constructor for a preloaded credential store.
    #[must_use]
    pub fn with_credentials(credentials: Credentials, policy: SessionPolicy) -> Tracker {
        Tracker {
            credentials,
            state: Mutex::new(State {
                sessions: SessionRegistry::new(policy.timeout()),
                directory: FileDirectory::default(),
            }),
        }
    }

    /// It handles an `auth` request: verifies the credentials, opens the
    /// session and reactivates every dormant publication owned by the user.
    ///
    /// A session whose heartbeats have gone stale does not block a new
    /// `auth` for the same username; it is overwritten.
    ///
    /// # Errors
    ///
    /// Will return `Error::UnknownUser`, `Error::WrongPassword` or
    /// `Error::AlreadyActive` when the request must be rejected.
    pub async fn authenticate(
        &self,
        username: &Username,
        password: &str,
        transfer_port: u16,
        control_address: SocketAddr,
    ) -> Result<(), Error> {
        self.credentials.verify(username, password)?;

        let mut state = self.state.lock().await;

        if state.sessions.is_live(username) {
            return Err(Error::AlreadyActive {
                username: username.clone(),
                location: Location::caller(),
            });
        }

        state
            .sessions
            .open(Session::new(username.clone(), control_address, transfer_port));
        state.directory.reactivate(username);

        info!("New connection created for: {control_address}");

        Ok(())
    }

    /// It records a liveness signal from the session owning
    /// `control_address`. Heartbeats from strangers are ignored; they must
    /// not crash the tracker.
    pub async fn heartbeat(&self, control_address: SocketAddr) {
        let mut state = self.state.lock().await;

        let Some(username) = state.sessions.resolve_username(&control_address).cloned() else {
            debug!("Heartbeat from an address with no session: {control_address}");
            return;
        };

        state.sessions.touch(&username);

        if let Some(session) = state.sessions.get(&username) {
            debug!("Heartbeat from {username}, last seen {}", session.last_heartbeat_time());
        }
    }

    /// It handles an `xit` request: marks every publication owned by the user
    /// dormant and removes the session.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotAuthenticated` if no session owns the address.
    pub async fn disconnect(&self, control_address: SocketAddr) -> Result<Username, Error> {
        let mut state = self.state.lock().await;

        let username = Self::caller(&state, control_address)?;

        state.directory.deactivate(&username);
        state.sessions.close(&username);

        info!("The user disconnected - {control_address}");

        Ok(username)
    }

    /// It handles a `pub` request. Republishing an already published file is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotAuthenticated` if no session owns the address.
    pub async fn publish(&self, control_address: SocketAddr, filename: &str) -> Result<(), Error> {
        let mut state = self.state.lock().await;

        let username = Self::caller(&state, control_address)?;

        state.directory.publish(filename, &username);

        Ok(())
    }

    /// It handles an `unp` request.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotAuthenticated` if no session owns the address
    /// and `Error::NotPublished` if the user has no record for the file.
    pub async fn unpublish(&self, control_address: SocketAddr, filename: &str) -> Result<(), Error> {
        let mut state = self.state.lock().await;

        let username = Self::caller(&state, control_address)?;

        state.directory.unpublish(filename, &username)
    }

    /// It handles a `lap` request: the live peers other than the caller.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotAuthenticated` if no session owns the address.
    pub async fn list_active_peers(&self, control_address: SocketAddr) -> Result<Vec<Username>, Error> {
        let state = self.state.lock().await;

        let username = Self::caller(&state, control_address)?;

        Ok(state
            .sessions
            .live_usernames()
            .filter(|peer| **peer != username)
            .cloned()
            .collect())
    }

    /// It handles an `lpf` request: the caller's live publications.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotAuthenticated` if no session owns the address.
    pub async fn list_published_files(&self, control_address: SocketAddr) -> Result<Vec<String>, Error> {
        let state = self.state.lock().await;

        let username = Self::caller(&state, control_address)?;

        Ok(state.directory.list_owned(&username))
    }

    /// It handles an `sch` request: filenames containing the substring that
    /// the caller does not own, with at least one live owner whose session is
    /// also live.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotAuthenticated` if no session owns the address.
    pub async fn search(&self, control_address: SocketAddr, substring: &str) -> Result<Vec<String>, Error> {
        let state = self.state.lock().await;

        let username = Self::caller(&state, control_address)?;

        let State { sessions, directory } = &*state;

        Ok(directory
            .candidates(substring, &username)
            .into_iter()
            .filter(|(_, owners)| owners.iter().any(|owner| sessions.is_live(owner)))
            .map(|(filename, _)| filename.to_owned())
            .collect())
    }

    /// It handles a `get` request: among the owners of the file other than
    /// the caller, the first one in iteration order with a live session wins.
    /// There is no further ranking.
    ///
    /// # Errors
    ///
    /// Will return `Error::NotAuthenticated` if no session owns the address
    /// and `Error::NoLiveHolder` if no reachable peer holds the file.
    pub async fn resolve_holder(&self, control_address: SocketAddr, filename: &str) -> Result<TransferEndpoint, Error> {
        let state = self.state.lock().await;

        let username = Self::caller(&state, control_address)?;

        let State { sessions, directory } = &*state;

        directory
            .owners(filename)
            .filter(|owner| **owner != username)
            .find_map(|owner| sessions.live_endpoint(owner))
            .ok_or_else(|| Error::NoLiveHolder {
                filename: filename.to_owned(),
                location: Location::caller(),
            })
    }

    /// It resolves the caller's identity from the address the message
    /// arrived on. There is no per-message credential.
    fn caller(state: &State, control_address: SocketAddr) -> Result<Username, Error> {
        state
            .sessions
            .resolve_username(&control_address)
            .cloned()
            .ok_or(Error::NotAuthenticated {
                control_address,
                location: Location::caller(),
            })
    }
}
