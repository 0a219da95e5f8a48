//! Delivery layer: the servers exposing the core tracker to the network.
pub mod signals;
pub mod udp;
