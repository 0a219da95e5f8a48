//! Peer-side building blocks.
//!
//! Every authenticated peer runs a [`transfer::server`] to serve its
//! published files and uses the [`transfer::client`] to download from other
//! peers. The tracker only arbitrates who talks to whom; the bytes in this
//! module never pass through it.
pub mod transfer;
