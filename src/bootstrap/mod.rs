//! Setup for the main tracker application process.
//!
//! The [`app::setup`](crate::bootstrap::app::setup) function builds the
//! domain layer from the configuration; the [`jobs`] submodule launchers
//! start the application services on top of it.
pub mod app;
pub mod jobs;
pub mod logging;
