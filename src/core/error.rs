//! Error returned by the core `Tracker`.
//!
//! Error | Context | Description
//! ---|---|---
//! `UnknownUser` | Authentication | The username is not in the credential store.
//! `WrongPassword` | Authentication | The password does not match the stored one.
//! `AlreadyActive` | Authentication | A live session for the username already exists.
//! `NotAuthenticated` | Identity | The command arrived from an address with no session.
//! `NoLiveHolder` | Resolution | No reachable peer holds the requested file.
//! `NotPublished` | Directory | The user has no publication record for the file.
//!
//! All of these are recovered by the command handlers and turned into a
//! response string. None of them propagate as fatal.
use std::net::SocketAddr;
use std::panic::Location;

use bittrickle_primitives::username::Username;

/// Error returned by the core `Tracker`.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    // Authentication errors
    #[error("unknown username: {username}, {location}")]
    UnknownUser {
        username: Username,
        location: &'static Location<'static>,
    },

    #[error("password does not match for username: {username}, {location}")]
    WrongPassword {
        username: Username,
        location: &'static Location<'static>,
    },

    #[error("a live session already exists for username: {username}, {location}")]
    AlreadyActive {
        username: Username,
        location: &'static Location<'static>,
    },

    // Identity errors
    #[error("no session for control address: {control_address}, {location}")]
    NotAuthenticated {
        control_address: SocketAddr,
        location: &'static Location<'static>,
    },

    // Resolution errors
    #[error("no live holder for file: {filename}, {location}")]
    NoLiveHolder {
        filename: String,
        location: &'static Location<'static>,
    },

    // Directory errors
    #[error("{username} has not published file: {filename}, {location}")]
    NotPublished {
        filename: String,
        username: Username,
        location: &'static Location<'static>,
    },
}
