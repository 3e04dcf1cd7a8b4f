//! Channel construction for the backing-service SDKs.
//!
//! A channel is either connected eagerly ([`connect_with_retry`]), so that an
//! unreachable service fails startup, or lazily ([`connect_lazy`]), so that it
//! shows up as `UNAVAILABLE` on each RPC instead. RPCs are never retried here;
//! call-level failures belong to [`crate::breaker`].

use std::time::Duration;

use anyhow::Context;
use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const HTTP2_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
const HTTP2_KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(10);

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Transport settings of one backing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpcClientConfig {
    /// Name used in logs, spans and connection errors.
    pub service_name: &'static str,
    pub connect_timeout: Duration,
    /// Deadline of every RPC issued on the channel.
    pub rpc_timeout: Duration,
    /// Connection attempts made after the first one fails.
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            service_name: "grpc_client",
            connect_timeout: Duration::from_secs(5),
            rpc_timeout: Duration::from_secs(10),
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl GrpcClientConfig {
    #[must_use]
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff = base;
        self.max_backoff = max;
        self
    }

    /// Pause after the `attempt`-th failed connection: linear in `attempt`,
    /// capped at `max_backoff`.
    #[must_use]
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(attempt)
            .min(self.max_backoff)
    }

    fn endpoint(&self, uri: String) -> Result<Endpoint, tonic::transport::Error> {
        Ok(Endpoint::from_shared(uri)?
            .connect_timeout(self.connect_timeout)
            .timeout(self.rpc_timeout)
            .tcp_keepalive(Some(TCP_KEEPALIVE))
            .http2_keep_alive_interval(HTTP2_KEEPALIVE_INTERVAL)
            .keep_alive_timeout(HTTP2_KEEPALIVE_TIMEOUT)
            .keep_alive_while_idle(true))
    }
}

/// One connection attempt, inside a `grpc_connect` span.
///
/// # Errors
/// The URI cannot be parsed or the service cannot be reached.
pub async fn connect_once<TClient>(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let uri = uri.into();
    let span = tracing::debug_span!("grpc_connect", service = cfg.service_name, uri = %uri);
    async {
        let channel = cfg.endpoint(uri)?.connect().await?;
        tracing::debug!("channel established");
        Ok(TClient::from(channel))
    }
    .instrument(span)
    .await
}

/// Connect, making up to `max_retries` further attempts with
/// [`GrpcClientConfig::backoff_after`] pauses in between.
///
/// # Errors
/// The last connection error, once every attempt has failed.
pub async fn connect_with_retry<TClient>(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let uri = uri.into();
    let attempts = cfg.max_retries.saturating_add(1);
    let mut attempt = 1;

    loop {
        match connect_once::<TClient>(uri.as_str(), cfg).await {
            Ok(client) => {
                tracing::info!(
                    service = cfg.service_name,
                    attempt,
                    rpc_timeout_ms = millis(cfg.rpc_timeout),
                    "gRPC client connected"
                );
                return Ok(client);
            }
            Err(e) if attempt < attempts => {
                let backoff = cfg.backoff_after(attempt);
                tracing::warn!(
                    service = cfg.service_name,
                    attempt,
                    attempts,
                    error = %e,
                    backoff_ms = millis(backoff),
                    "gRPC connection failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "failed to connect to {} at {uri} after {attempt} attempts",
                        cfg.service_name
                    )
                });
            }
        }
    }
}

/// Client whose channel connects on first use.
///
/// # Errors
/// Only an unparsable URI.
pub fn connect_lazy<TClient>(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let uri = uri.into();
    let channel = cfg.endpoint(uri.clone())?.connect_lazy();
    tracing::info!(
        service = cfg.service_name,
        uri = %uri,
        rpc_timeout_ms = millis(cfg.rpc_timeout),
        "gRPC client configured (lazy connect)"
    );
    Ok(TClient::from(channel))
}
