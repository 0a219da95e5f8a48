//! The BitTrickle peer console application.
//!
//! Once authenticated, the peer is three concurrent activities sharing one
//! process:
//!
//! 1. A heartbeat sender that keeps the tracker-side session live.
//! 2. A command loop reading user input, sending one control message per
//!    command and awaiting exactly one reply before the next (strict
//!    request/response, no pipelining).
//! 3. A transfer listener serving this peer's published files to other
//!    peers, one task per inbound connection.
//!
//! Shutdown is cooperative: `xit` flips the running flag, the heartbeat loop
//! observes it and terminates, and in-flight transfer serving is left to
//! finish on its own.
pub mod app;
pub mod control;
