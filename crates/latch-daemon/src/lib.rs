//! The latch bridge process.
//!
//! Turns the building blocks from `latch-core`, `latch-udp`, and
//! `latch-http` into a running service:
//!
//! - [`cli`] -- flag parsing and config layering
//! - [`bridge`] -- the supervised UDP and HTTP loops sharing one state
//! - [`logging`] -- tracing subscriber setup
//! - [`error`] -- [`DaemonError`], returned from `main`

pub mod bridge;
pub mod cli;
pub mod error;
pub mod logging;

pub use bridge::Bridge;
pub use error::DaemonError;
