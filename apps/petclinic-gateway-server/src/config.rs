//! Layered application configuration.
//!
//! Layers, lowest precedence first: compiled defaults, the optional YAML file,
//! `PETCLINIC__*` environment variables (`__` separates nesting levels), then
//! CLI overrides.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use petclinic_api_gateway::GatewayConfig;
use petclinic_transport_grpc::GrpcClientConfig;
use serde::{Deserialize, Serialize};

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "PETCLINIC__";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Owner/pet directory service.
    pub customers: EndpointConfig,
    /// Visit-history service.
    pub visits: EndpointConfig,
    pub gateway: GatewayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            customers: EndpointConfig::with_uri("http://127.0.0.1:9091"),
            visits: EndpointConfig::with_uri("http://127.0.0.1:9092"),
            gateway: GatewayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    pub bind_addr: String,
    /// Whole-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info,petclinic_api_gateway=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// One backing gRPC service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointConfig {
    pub uri: String,
    pub connect_timeout_ms: u64,
    pub rpc_timeout_ms: u64,
    /// Connection attempts when `lazy_connect` is off.
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Connect on first use so the gateway starts while a service is down.
    pub lazy_connect: bool,
}

impl EndpointConfig {
    fn with_uri(uri: &str) -> Self {
        Self {
            uri: uri.to_owned(),
            ..Self::default()
        }
    }

    /// Transport settings for the client of `service_name`.
    #[must_use]
    pub fn client_config(&self, service_name: &'static str) -> GrpcClientConfig {
        GrpcClientConfig::new(service_name)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_rpc_timeout(Duration::from_millis(self.rpc_timeout_ms))
            .with_max_retries(self.max_retries)
            .with_backoff(
                Duration::from_millis(self.base_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            connect_timeout_ms: 5_000,
            rpc_timeout_ms: 10_000,
            max_retries: 3,
            base_backoff_ms: 100,
            max_backoff_ms: 5_000,
            lazy_connect: true,
        }
    }
}

/// CLI values that take precedence over every other layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
}

impl AppConfig {
    /// Load defaults, then `path` (if any), then the environment.
    ///
    /// # Errors
    /// Missing or unparsable file, unknown keys or mistyped values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration (yaml file or PETCLINIC__ environment)")
    }

    /// # Errors
    /// `server.bind_addr` is not a socket address.
    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) -> Result<()> {
        if let Some(port) = cli.port {
            let mut addr = self.bind_addr()?;
            addr.set_port(port);
            self.server.bind_addr = addr.to_string();
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.filter),
            2 => "debug".clone_into(&mut self.logging.filter),
            _ => "trace".clone_into(&mut self.logging.filter),
        }
        Ok(())
    }

    /// Checks the settings that deserialization alone cannot.
    ///
    /// # Errors
    /// First invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.server.request_timeout_ms == 0 {
            bail!("server.request_timeout_ms must be positive");
        }
        for (section, endpoint) in [("customers", &self.customers), ("visits", &self.visits)] {
            if endpoint.uri.trim().is_empty() {
                bail!("{section}.uri must be set");
            }
            endpoint
                .uri
                .parse::<axum::http::Uri>()
                .with_context(|| format!("{section}.uri is not a valid URI: '{}'", endpoint.uri))?;
        }
        if self.gateway.visits_breaker.failure_threshold == 0 {
            bail!("gateway.visits_breaker.failure_threshold must be positive");
        }
        Ok(())
    }

    /// # Errors
    /// `server.bind_addr` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid server.bind_addr address '{}'", self.server.bind_addr))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    /// # Errors
    /// Serialization failure.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}
