//! Gateway module configuration.

use std::time::Duration;

use petclinic_transport_grpc::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};

/// Gateway module configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Fault boundary around visit lookups of the composite owner read.
    pub visits_breaker: BreakerSettings,
}

/// Circuit breaker settings as they appear in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakerSettings {
    /// Number of consecutive failures to open circuit.
    pub failure_threshold: u32,
    /// Failures older than this (milliseconds) no longer count.
    pub failure_window_ms: u64,
    /// Time in milliseconds before half-open state.
    pub cooldown_ms: u64,
    /// Upper bound for one guarded call in milliseconds.
    pub call_timeout_ms: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window_ms: 10_000,
            cooldown_ms: 30_000,
            call_timeout_ms: 2_000,
        }
    }
}

impl From<&BreakerSettings> for CircuitBreakerConfig {
    fn from(s: &BreakerSettings) -> Self {
        CircuitBreakerConfig::default()
            .with_failure_threshold(s.failure_threshold)
            .with_failure_window(Duration::from_millis(s.failure_window_ms))
            .with_cooldown(Duration::from_millis(s.cooldown_ms))
            .with_call_timeout(Duration::from_millis(s.call_timeout_ms))
    }
}
