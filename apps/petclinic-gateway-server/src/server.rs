//! HTTP server lifecycle: wire the backing-service clients, serve the REST
//! router, stop on Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{Request, Response, StatusCode};
use customers_sdk::CustomersClientV1;
use petclinic_api_gateway::{Service, router};
use petclinic_transport_grpc::{CircuitBreaker, CircuitBreakerConfig};
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use visits_sdk::VisitsClientV1;

use crate::config::{AppConfig, EndpointConfig};

/// Serve until a shutdown signal arrives.
///
/// # Errors
/// Invalid endpoint settings, an eager connection that cannot be made, or a
/// listener that cannot be bound.
pub async fn run(config: &AppConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    let service = Arc::new(build_service(config).await?);
    let app = apply_layers(router(service), config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
    tracing::info!(%addr, "HTTP server bound");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = wait_for_shutdown().await {
                tracing::error!(error = %e, "signal handling failed, shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn build_service(config: &AppConfig) -> Result<Service> {
    let customers = wire_customers(&config.customers).await?;
    let visits = wire_visits(&config.visits).await?;
    let breaker_cfg = CircuitBreakerConfig::from(&config.gateway.visits_breaker);
    tracing::info!(
        failure_threshold = breaker_cfg.failure_threshold,
        cooldown_ms = config.gateway.visits_breaker.cooldown_ms,
        call_timeout_ms = config.gateway.visits_breaker.call_timeout_ms,
        "visits circuit breaker configured"
    );
    let breaker = Arc::new(CircuitBreaker::new("visits", breaker_cfg));
    Ok(Service::new(customers, visits, breaker))
}

async fn wire_customers(endpoint: &EndpointConfig) -> Result<Arc<dyn CustomersClientV1>> {
    let cfg = endpoint.client_config("customers");
    if endpoint.lazy_connect {
        customers_sdk::wire_lazy_client(&endpoint.uri, &cfg)
    } else {
        customers_sdk::wire_client(&endpoint.uri, &cfg).await
    }
}

async fn wire_visits(endpoint: &EndpointConfig) -> Result<Arc<dyn VisitsClientV1>> {
    let cfg = endpoint.client_config("visits");
    if endpoint.lazy_connect {
        visits_sdk::wire_lazy_client(&endpoint.uri, &cfg)
    } else {
        visits_sdk::wire_client(&endpoint.uri, &cfg).await
    }
}

fn apply_layers(router: Router, config: &AppConfig) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            config.request_timeout(),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<axum::body::Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &Response<axum::body::Body>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        tracing::debug!(parent: span, "response sent");
                    },
                ),
        )
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::select! {
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            tracing::info!("Received Ctrl+C signal");
        }
        result = wait_sigterm() => result?,
    }
    tracing::info!("Shutdown signal received, initiating graceful shutdown");
    Ok(())
}

#[cfg(unix)]
async fn wait_sigterm() -> Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;
    sigterm.recv().await;
    tracing::info!("Received SIGTERM signal");
    Ok(())
}

#[cfg(not(unix))]
async fn wait_sigterm() -> Result<()> {
    std::future::pending::<Result<()>>().await
}
