//! UDP side of the latch bridge.
//!
//! - [`listener`] -- the ingestion loop that binds a socket, filters
//!   senders, and writes each admitted datagram into the shared
//!   [`StateHolder`](latch_core::StateHolder)
//! - [`sender`] -- a one-shot client used by `latch send` for manual checks
//! - [`error`] -- [`UdpError`], whose bind variant is the only fatal one

pub mod error;
pub mod listener;
pub mod sender;

pub use error::UdpError;
pub use listener::{IngestConfig, UdpIngest, run_udp_server};
pub use sender::send_datagram;
