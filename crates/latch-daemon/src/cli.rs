//! Command-line interface.
//!
//! Flags override values from the optional `--config` YAML file, which in
//! turn override the built-in defaults. Every bridge flag can also be set
//! through a `LATCH_*` environment variable.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use latch_core::LatchConfig;

use crate::error::DaemonError;

/// Create an HTTP API serving the last value emitted by UDP clients.
#[derive(Parser, Debug)]
#[command(name = "latch", version, about)]
pub struct Cli {
    /// Optional subcommand; without one the bridge runs.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Bridge settings.
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Set the logger to debug level (ignored when `RUST_LOG` is set).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "LATCH_JSON_LOGS")]
    pub json_logs: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single message to the given server.
    Send(SendArgs),
}

/// Flags for running the bridge.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// YAML configuration file.
    #[arg(long, env = "LATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen IP address for both servers.
    #[arg(short = 'l', long, env = "LATCH_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// HTTP listen port.
    #[arg(short = 'p', long, env = "LATCH_HTTP_PORT")]
    pub http_port: Option<u16>,

    /// UDP listen port.
    #[arg(short = 'u', long, env = "LATCH_UDP_PORT")]
    pub udp_port: Option<u16>,

    /// Maximum bytes read from one datagram.
    #[arg(short = 'b', long, env = "LATCH_UDP_BUFFER_SIZE")]
    pub udp_buffer_size: Option<usize>,

    /// HTTP basic authentication as `user:pass`.
    #[arg(long = "user", env = "LATCH_USER")]
    pub basic_auth: Option<String>,

    /// Value to accept as zero.
    #[arg(long, env = "LATCH_ZERO")]
    pub zero: Option<String>,

    /// Allow UDP datagrams only from these hosts (comma separated).
    #[arg(long, value_delimiter = ',', env = "LATCH_ALLOWED_UDP_CLIENTS")]
    pub allowed_udp_clients: Vec<String>,

    /// Consecutive UDP read failures before the socket is rebuilt.
    #[arg(long, env = "LATCH_MAX_READ_FAILURES")]
    pub max_read_failures: Option<u32>,
}

impl ServeArgs {
    /// Build the effective configuration: defaults, then file, then flags.
    pub fn load_config(&self) -> Result<LatchConfig, DaemonError> {
        let base = match &self.config {
            Some(path) => LatchConfig::from_file(path)?,
            None => LatchConfig::default(),
        };
        let config = self.apply(base);
        config.validate()?;
        Ok(config)
    }

    /// Overlay the flags that were given on top of `config`.
    pub fn apply(&self, mut config: LatchConfig) -> LatchConfig {
        if let Some(v) = &self.listen_addr {
            config.listen_addr.clone_from(v);
        }
        if let Some(v) = self.http_port {
            config.http_port = v;
        }
        if let Some(v) = self.udp_port {
            config.udp_port = v;
        }
        if let Some(v) = self.udp_buffer_size {
            config.udp_buffer_size = v;
        }
        if let Some(v) = &self.basic_auth {
            config.basic_auth = Some(v.clone());
        }
        if let Some(v) = &self.zero {
            config.zero.clone_from(v);
        }
        if !self.allowed_udp_clients.is_empty() {
            config.allowed_udp_clients.clone_from(&self.allowed_udp_clients);
        }
        if let Some(v) = self.max_read_failures {
            config.max_read_failures = v;
        }
        config
    }
}

/// Flags for `latch send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Words to send; joined with single spaces.
    #[arg(required = true)]
    pub data: Vec<String>,

    /// IP of the bridge.
    #[arg(short = 'i', long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub ip: IpAddr,

    /// UDP port of the bridge.
    #[arg(short = 'p', long, default_value_t = 7982)]
    pub port: u16,

    /// Local port to send from.
    #[arg(short = 'l', long, default_value_t = 7983)]
    pub local_port: u16,
}

impl SendArgs {
    /// The bridge address.
    pub const fn target(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// The local address the datagram is sent from.
    pub const fn local(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.local_port)
    }

    /// The datagram payload.
    pub fn payload(&self) -> String {
        self.data.join(" ")
    }
}
