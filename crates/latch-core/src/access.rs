//! Source-address allow-list for incoming datagrams.
//!
//! Matching is exact and case-sensitive on the host part of the sender
//! address. There is no CIDR, prefix, or wildcard support. An empty list
//! admits every sender.

use std::net::SocketAddr;

/// Decide whether a datagram from `source_address` may update the state.
///
/// Returns `true` when `allow_list` is empty. Otherwise the port suffix
/// after the last `:` is stripped (along with IPv6 brackets) and the
/// remaining host must equal one of the entries exactly.
pub fn is_allowed<S: AsRef<str>>(source_address: &str, allow_list: &[S]) -> bool {
    if allow_list.is_empty() {
        return true;
    }
    let host = host_part(source_address);
    allow_list.iter().any(|allowed| allowed.as_ref() == host)
}

/// Strip the `:port` suffix and any surrounding `[` `]`.
fn host_part(address: &str) -> &str {
    let host = address
        .rsplit_once(':')
        .map_or(address, |(host, _port)| host);
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// An immutable allow-list built once from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessFilter {
    allowed: Vec<String>,
}

impl AccessFilter {
    /// Build a filter from the configured host strings, keeping their order.
    pub const fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Whether the filter admits every sender.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty()
    }

    /// The configured host strings.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Whether a datagram from `peer` may update the state.
    pub fn admits(&self, peer: &SocketAddr) -> bool {
        is_allowed(&peer.to_string(), self.allowed.as_slice())
    }
}
