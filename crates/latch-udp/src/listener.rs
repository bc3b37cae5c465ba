//! The UDP ingestion loop.
//!
//! Binds one socket and feeds every admitted datagram into the shared
//! [`StateHolder`]. Each datagram fully replaces the previous value: there
//! is no framing, concatenation, or reassembly.
//!
//! # Failure policy
//!
//! - Bind failure: [`UdpError::Bind`], returned before the loop starts.
//! - A failed `recv_from`: logged, counted, loop continues. After
//!   `max_read_failures` failures in a row the loop gives up with
//!   [`UdpError::ReadFailures`] so the socket gets rebuilt by the
//!   supervisor. Any successful read resets the count.
//! - Sender not on the allow-list: warn log, datagram dropped.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use latch_core::{AccessFilter, ConfigError, LatchConfig, StateHolder};
use tokio::net::UdpSocket;
use tracing::{debug, error, info, warn};

use crate::error::UdpError;

/// Everything the ingestion loop needs from the startup configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Address to bind.
    pub addr: SocketAddr,
    /// Maximum bytes read per datagram; longer datagrams are truncated.
    pub buffer_size: usize,
    /// Sender allow-list.
    pub filter: AccessFilter,
    /// Consecutive read failures tolerated before giving up on the socket.
    pub max_read_failures: u32,
}

impl IngestConfig {
    /// Extract the UDP settings from the bridge configuration.
    ///
    /// The configuration is validated first, so the receive buffer size is
    /// always within `1..=MAX_UDP_BUFFER_SIZE`.
    pub fn from_config(config: &LatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            addr: config.udp_addr()?,
            buffer_size: config.udp_buffer_size,
            filter: config.access_filter(),
            max_read_failures: config.max_read_failures,
        })
    }
}

/// Counts consecutive read failures against a fixed budget.
#[derive(Debug, Clone, Copy)]
struct ReadFailureBudget {
    limit: u32,
    consecutive: u32,
}

impl ReadFailureBudget {
    const fn new(limit: u32) -> Self {
        Self {
            limit,
            consecutive: 0,
        }
    }

    const fn reset(&mut self) {
        self.consecutive = 0;
    }

    /// Record a failure; returns the running count once the budget is spent.
    const fn record_failure(&mut self) -> Option<u32> {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive >= self.limit {
            Some(self.consecutive)
        } else {
            None
        }
    }
}

/// A bound UDP socket ready to serve.
#[derive(Debug)]
pub struct UdpIngest {
    socket: UdpSocket,
    local_addr: SocketAddr,
    config: IngestConfig,
}

impl UdpIngest {
    /// Bind the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`UdpError::Bind`] if the address cannot be bound, or
    /// [`UdpError::LocalAddr`] if the bound address cannot be read back.
    pub async fn bind(config: IngestConfig) -> Result<Self, UdpError> {
        let socket = UdpSocket::bind(config.addr)
            .await
            .map_err(|source| UdpError::Bind {
                addr: config.addr,
                source,
            })?;
        let local_addr = socket.local_addr().map_err(UdpError::LocalAddr)?;

        info!(
            %local_addr,
            buffer_size = config.buffer_size,
            allow_list = ?config.filter.allowed(),
            "udp server listening"
        );

        Ok(Self {
            socket,
            local_addr,
            config,
        })
    }

    /// The address the socket is actually bound to.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Read datagrams forever, writing admitted payloads into `state`.
    ///
    /// Only returns once the read-failure budget is exhausted.
    pub async fn serve(self, state: &StateHolder) -> Result<(), UdpError> {
        ingest(&self.socket, &self.config, state).await
    }
}

/// Where the ingestion loop gets its datagrams from.
trait DatagramSource {
    /// Receive one datagram into `buf`, returning its length and sender.
    fn recv_datagram<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a;
}

impl DatagramSource for UdpSocket {
    fn recv_datagram<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a {
        self.recv_from(buf)
    }
}

async fn ingest<S: DatagramSource>(
    datagrams: &S,
    config: &IngestConfig,
    state: &StateHolder,
) -> Result<(), UdpError> {
    let mut buf = vec![0_u8; config.buffer_size];
    let mut failures = ReadFailureBudget::new(config.max_read_failures);

    loop {
        let (n, peer) = match datagrams.recv_datagram(&mut buf).await {
            Ok(received) => {
                failures.reset();
                received
            }
            Err(source) => {
                error!(error = %source, "error reading udp data");
                if let Some(count) = failures.record_failure() {
                    return Err(UdpError::ReadFailures { count, source });
                }
                continue;
            }
        };

        if !config.filter.admits(&peer) {
            warn!(%peer, "unauthorized access to udp server");
            continue;
        }

        let payload = buf.get(..n).unwrap_or_default();
        let written = state.write(payload).await;
        debug!(%peer, bytes = written, "datagram accepted");
    }
}

/// Bind and serve in one step. This is the unit the supervisor restarts.
pub async fn run_udp_server(config: IngestConfig, state: &StateHolder) -> Result<(), UdpError> {
    UdpIngest::bind(config).await?.serve(state).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use latch_core::Supervisor;

    use super::*;

    /// Replays a fixed sequence of receive outcomes, then fails forever.
    struct ScriptedSource {
        script: Mutex<VecDeque<Option<&'static [u8]>>>,
    }

    impl ScriptedSource {
        fn new(script: &[Option<&'static [u8]>]) -> Self {
            Self {
                script: Mutex::new(script.iter().copied().collect()),
            }
        }

        fn remaining(&self) -> usize {
            self.script.lock().unwrap().len()
        }
    }

    impl DatagramSource for ScriptedSource {
        fn recv_datagram<'a>(
            &'a self,
            buf: &'a mut [u8],
        ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a {
            let next = self.script.lock().unwrap().pop_front().flatten();
            let result = next.map_or_else(
                || Err(io::Error::other("scripted read failure")),
                |payload| {
                    buf.get_mut(..payload.len())
                        .unwrap()
                        .copy_from_slice(payload);
                    Ok((payload.len(), SocketAddr::from(([127, 0, 0, 1], 40_000))))
                },
            );
            std::future::ready(result)
        }
    }

    fn scripted_config(max_read_failures: u32) -> IngestConfig {
        IngestConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            buffer_size: 64,
            filter: AccessFilter::new(Vec::new()),
            max_read_failures,
        }
    }

    #[tokio::test]
    async fn consecutive_read_failures_end_the_loop() {
        let state = StateHolder::new("0");
        let source = ScriptedSource::new(&[]);

        let err = ingest(&source, &scripted_config(3), &state)
            .await
            .unwrap_err();

        assert!(matches!(err, UdpError::ReadFailures { count: 3, .. }));
        assert_eq!(state.read().await, "0");
    }

    #[tokio::test]
    async fn successful_read_resets_the_failure_count() {
        let state = StateHolder::new("0");
        let source = ScriptedSource::new(&[None, None, Some(b"7".as_slice()), None, None, None]);

        let err = ingest(&source, &scripted_config(3), &state)
            .await
            .unwrap_err();

        assert!(matches!(err, UdpError::ReadFailures { count: 3, .. }));
        assert_eq!(source.remaining(), 0);
        assert_eq!(state.read().await, "7");
    }

    #[tokio::test(start_paused = true)]
    async fn supervisor_restarts_loop_after_read_failures() {
        let state = StateHolder::new("0");
        let config = scripted_config(2);
        let attempts = AtomicU32::new(0);
        let supervisor = Supervisor::new("udp", Duration::from_secs(1));

        let (state, config, attempts) = (&state, &config, &attempts);
        let supervised = supervisor.run(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                let source = ScriptedSource::new(&[]);
                ingest(&source, config, state).await
            }
        });
        let outcome = tokio::time::timeout(Duration::from_millis(2500), supervised).await;

        assert!(outcome.is_err(), "read failures must not stop supervision");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn oversized_buffer_is_rejected_before_binding() {
        let config = LatchConfig {
            udp_buffer_size: usize::MAX,
            ..LatchConfig::default()
        };

        assert!(matches!(
            IngestConfig::from_config(&config),
            Err(ConfigError::BufferTooLarge { .. })
        ));
    }

    #[test]
    fn budget_trips_at_the_limit() {
        let mut budget = ReadFailureBudget::new(3);
        assert_eq!(budget.record_failure(), None);
        assert_eq!(budget.record_failure(), None);
        assert_eq!(budget.record_failure(), Some(3));
    }

    #[test]
    fn success_resets_the_budget() {
        let mut budget = ReadFailureBudget::new(2);
        assert_eq!(budget.record_failure(), None);
        budget.reset();
        assert_eq!(budget.record_failure(), None);
        assert_eq!(budget.record_failure(), Some(2));
    }

    #[test]
    fn zero_limit_gives_up_on_first_failure() {
        let mut budget = ReadFailureBudget::new(0);
        assert_eq!(budget.record_failure(), Some(1));
    }

    #[test]
    fn ingest_config_follows_bridge_config() {
        let config = LatchConfig {
            listen_addr: String::from("127.0.0.1"),
            udp_port: 9999,
            udp_buffer_size: 16,
            allowed_udp_clients: vec![String::from("10.0.0.5")],
            ..LatchConfig::default()
        };

        let ingest = IngestConfig::from_config(&config);

        assert!(ingest.is_ok());
        if let Ok(ingest) = ingest {
            assert_eq!(ingest.addr, SocketAddr::from(([127, 0, 0, 1], 9999)));
            assert_eq!(ingest.buffer_size, 16);
            assert!(!ingest.filter.is_unrestricted());
        }
    }
}
