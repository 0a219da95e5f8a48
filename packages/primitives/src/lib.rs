//! Primitive types for [BitTrickle](https://docs.rs/bittrickle).
//!
//! This module contains the basic data structures for BitTrickle, a peer
//! discovery tracker for a small file-sharing network. These structures are
//! used not only by the tracker server crate, but also by the peer console
//! application and the other crates in the workspace.
use std::time::Duration;

pub mod endpoint;
pub mod username;

/// Duration since the Unix Epoch.
pub type DurationSinceUnixEpoch = Duration;
