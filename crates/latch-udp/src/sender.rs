//! One-shot datagram sender for manual testing.
//!
//! Used by `latch send` to push a single value at a running bridge. The
//! socket is bound to an explicit local port so the sender's address is
//! predictable when an allow-list is configured.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::debug;

use crate::error::UdpError;

/// Send `payload` as one datagram from `local` to `target`.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`UdpError::SendBind`] if `local` cannot be bound, or
/// [`UdpError::Send`] if the datagram cannot be sent.
pub async fn send_datagram(
    target: SocketAddr,
    local: SocketAddr,
    payload: &[u8],
) -> Result<usize, UdpError> {
    debug!(%target, %local, "sending to given address");

    let socket = UdpSocket::bind(local)
        .await
        .map_err(|source| UdpError::SendBind { local, source })?;
    let local = socket.local_addr().unwrap_or(local);

    let n = socket
        .send_to(payload, target)
        .await
        .map_err(|source| UdpError::Send {
            target,
            local,
            source,
        })?;

    debug!(bytes = n, %target, "datagram written");
    Ok(n)
}
