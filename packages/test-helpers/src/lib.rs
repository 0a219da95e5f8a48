//! Helpers for testing the BitTrickle tracker.
pub mod configuration;
pub mod random;
