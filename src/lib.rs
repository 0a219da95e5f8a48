//! BitTrickle. A peer discovery tracker for a small file-sharing network,
//! plus the console peer it coordinates.
//!
//! The tracker authenticates users, tracks which of them are currently
//! reachable via heartbeats, keeps a directory of which user published which
//! filename, and resolves file requests to a reachable holder's transfer
//! endpoint. Once the tracker hands back a peer's address, the bytes flow
//! directly between the two peers over TCP, bypassing the tracker entirely.
//!
//! ```text
//! Delivery layer     Domain layer
//!
//! UDP control server |> Core tracker
//! ```
//!
//! The crate ships two binaries:
//!
//! - `bittrickle`: the tracker daemon. See [`core`] for the domain layer and
//!   [`servers::udp`] for the control protocol.
//! - `bittrickle-peer`: the interactive peer. See [`console::peer`] for its
//!   event loops and [`peers::transfer`] for the transfer contract it
//!   implements on both sides.
//!
//! Both take exactly one argument, the tracker UDP port.
pub mod app;
pub mod bootstrap;
pub mod console;
pub mod core;
pub mod peers;
pub mod servers;

use bittrickle_clock::clock;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
pub(crate) type CurrentClock = clock::Stopped;
