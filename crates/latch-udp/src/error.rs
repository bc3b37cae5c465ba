//! Error types for the UDP side of the bridge.
//!
//! [`UdpError`] separates the one terminal condition (the socket could not
//! be bound at all) from the recoverable ones, via its
//! [`Escalation`] implementation.

use std::net::SocketAddr;

use latch_core::Escalation;

/// Errors raised by the ingestion loop and the datagram sender.
#[derive(Debug, thiserror::Error)]
pub enum UdpError {
    /// The listening socket could not be bound.
    ///
    /// Fatal: without a data feed the HTTP side has nothing to serve.
    #[error("cannot start udp server on {addr}: {source}")]
    Bind {
        /// The address we tried to bind.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Too many consecutive `recv_from` failures on a bound socket.
    #[error("{count} consecutive udp read failures, last: {source}")]
    ReadFailures {
        /// How many reads failed in a row.
        count: u32,
        /// The most recent read error.
        source: std::io::Error,
    },

    /// The local address of a bound socket could not be queried.
    #[error("cannot query local udp address: {0}")]
    LocalAddr(std::io::Error),

    /// The sender could not bind its local socket.
    #[error("cannot bind udp local address {local}: {source}")]
    SendBind {
        /// The local address we tried to send from.
        local: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The datagram could not be sent.
    #[error("cannot send data to {target} from {local}: {source}")]
    Send {
        /// The destination address.
        target: SocketAddr,
        /// The local address we sent from.
        local: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl Escalation for UdpError {
    fn is_fatal(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}
