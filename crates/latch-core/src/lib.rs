//! Core types for the latch UDP-to-HTTP bridge.
//!
//! The bridge keeps exactly one value: the payload of the most recently
//! accepted UDP datagram. This crate owns everything both network paths
//! share:
//!
//! - [`StateHolder`] -- the lock-guarded latest value plus its update and
//!   zero timestamps
//! - [`AccessFilter`] -- the per-datagram source allow-list
//! - [`LatchConfig`] -- the immutable startup configuration
//! - [`Supervisor`] -- the restart-on-exit wrapper around each network loop
//!
//! # Architecture
//!
//! ```text
//! UDP datagram --> AccessFilter --> StateHolder::write
//!                                        |
//! HTTP GET  <------------------- StateHolder::snapshot
//! ```
//!
//! The UDP loop is the only writer. Readers never see the internal buffer,
//! only copies taken under the lock.

pub mod access;
pub mod config;
pub mod state;
pub mod supervisor;

pub use access::{AccessFilter, is_allowed};
pub use config::{ConfigError, Credentials, LatchConfig, MAX_UDP_BUFFER_SIZE};
pub use state::{StateHolder, StateSnapshot};
pub use supervisor::{Escalation, Supervisor, SupervisorPhase};
