//! Configuration loading and typed config structures for the latch bridge.
//!
//! The configuration is built once at startup and never mutated after.
//! Values come from three layers, later ones winning: the defaults below,
//! an optional YAML file, then command-line flags and `LATCH_*`
//! environment variables applied by the binary.
//!
//! ```yaml
//! listen_addr: 0.0.0.0
//! udp_port: 7982
//! http_port: 8080
//! udp_buffer_size: 2048
//! zero: "0"
//! allowed_udp_clients: ["203.0.113.9"]
//! basic_auth: "user:pass"
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::access::AccessFilter;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The listen address is not an IP address.
    #[error("invalid listen address {addr:?}: {source}")]
    ListenAddr {
        /// The rejected address string.
        addr: String,
        /// The underlying parse error.
        source: std::net::AddrParseError,
    },

    /// The UDP buffer would not hold a single byte.
    #[error("udp buffer size must be greater than zero")]
    ZeroBufferSize,

    /// The UDP buffer is larger than any datagram can be.
    #[error("udp buffer size {size} exceeds the maximum datagram size of 65535 bytes")]
    BufferTooLarge {
        /// The rejected size.
        size: usize,
    },
}

/// Largest UDP payload a single datagram can carry.
pub const MAX_UDP_BUFFER_SIZE: usize = 65_535;

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bridge configuration.
///
/// Every field has a default, so an empty YAML document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatchConfig {
    /// IP address both listeners bind to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// UDP port the ingestion loop listens on.
    #[serde(default = "default_udp_port")]
    pub udp_port: u16,

    /// TCP port the HTTP API listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Maximum number of bytes read from a single datagram.
    #[serde(default = "default_udp_buffer_size")]
    pub udp_buffer_size: usize,

    /// Payload that counts as a "zero" observation.
    #[serde(default)]
    pub zero: String,

    /// Sender hosts allowed to update the state. Empty admits everyone.
    #[serde(default)]
    pub allowed_udp_clients: Vec<String>,

    /// Optional `user:pass` pair guarding the HTTP API.
    #[serde(default)]
    pub basic_auth: Option<String>,

    /// Consecutive datagram read failures tolerated before the UDP socket
    /// is torn down and rebound.
    #[serde(default = "default_max_read_failures")]
    pub max_read_failures: u32,

    /// Delay between a network loop exiting and its restart.
    #[serde(default = "default_restart_cooldown_ms")]
    pub restart_cooldown_ms: u64,
}

impl Default for LatchConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            udp_port: default_udp_port(),
            http_port: default_http_port(),
            udp_buffer_size: default_udp_buffer_size(),
            zero: String::new(),
            allowed_udp_clients: Vec::new(),
            basic_auth: None,
            max_read_failures: default_max_read_failures(),
            restart_cooldown_ms: default_restart_cooldown_ms(),
        }
    }
}

impl LatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check the values that cannot be caught by deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_ip()?;
        match self.udp_buffer_size {
            0 => Err(ConfigError::ZeroBufferSize),
            size if size > MAX_UDP_BUFFER_SIZE => Err(ConfigError::BufferTooLarge { size }),
            _ => Ok(()),
        }
    }

    /// The listen address parsed as an IP.
    pub fn listen_ip(&self) -> Result<IpAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|source| ConfigError::ListenAddr {
                addr: self.listen_addr.clone(),
                source,
            })
    }

    /// Socket address for the UDP listener.
    pub fn udp_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.listen_ip()?, self.udp_port))
    }

    /// Socket address for the HTTP listener.
    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.listen_ip()?, self.http_port))
    }

    /// Build the allow-list for the UDP loop.
    pub fn access_filter(&self) -> AccessFilter {
        AccessFilter::new(self.allowed_udp_clients.clone())
    }

    /// Parsed basic-auth credentials, or `None` if auth is disabled.
    pub fn credentials(&self) -> Option<Credentials> {
        self.basic_auth.as_deref().and_then(Credentials::parse)
    }

    /// Supervisor cool-down as a [`Duration`].
    pub const fn restart_cooldown(&self) -> Duration {
        Duration::from_millis(self.restart_cooldown_ms)
    }
}

/// A single basic-auth account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The expected user name.
    pub user: String,
    /// The expected password.
    pub pass: String,
}

impl Credentials {
    /// Split a `user:pass` string on its first colon.
    ///
    /// Returns `None` (auth disabled) unless both halves are non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (user, pass) = raw.split_once(':')?;
        if user.is_empty() || pass.is_empty() {
            return None;
        }
        Some(Self {
            user: user.to_owned(),
            pass: pass.to_owned(),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_listen_addr() -> String {
    String::from("0.0.0.0")
}

const fn default_udp_port() -> u16 {
    7982
}

const fn default_http_port() -> u16 {
    8080
}

const fn default_udp_buffer_size() -> usize {
    2048
}

const fn default_max_read_failures() -> u32 {
    16
}

const fn default_restart_cooldown_ms() -> u64 {
    1000
}
