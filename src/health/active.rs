//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends
//! - Update backend liveness based on results

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio::sync::broadcast;
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use axum::http::{Request, StatusCode};
use axum::body::Body;

use crate::config::HealthCheckConfig;
use crate::load_balancer::backend::{Backend, HealthState};
use crate::load_balancer::pool::BackendPool;
use crate::observability::metrics;

/// Result of probing one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    BadStatus(StatusCode),
    Unreachable(String),
    TimedOut,
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy)
    }
}

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(pool: Arc<BackendPool>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .build(HttpConnector::new());

        Self {
            pool,
            config,
            client,
        }
    }

    /// Probe on every tick until shutdown. The first tick fires one interval after start.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            timeout = self.config.timeout_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        // interval_at panics on a zero period
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend once, concurrently, and apply the outcomes.
    pub async fn check_all(&self) {
        let checks = self.pool.backends().iter().map(|backend| self.check(backend));
        join_all(checks).await;
    }

    async fn check(&self, backend: &Arc<Backend>) {
        let outcome = self.probe(backend).await;
        let label = backend.label();

        let previous = if outcome.is_healthy() {
            self.pool.mark_alive(backend.index)
        } else {
            self.pool.mark_down(backend.index)
        };

        match (previous, outcome.is_healthy()) {
            (Some(HealthState::Down), true) => {
                tracing::info!(backend = %label, "Backend recovered, marked alive");
            }
            (Some(HealthState::Alive), false) => {
                tracing::warn!(backend = %label, outcome = ?outcome, "Backend marked down");
            }
            _ => {
                tracing::debug!(
                    backend = %label,
                    outcome = ?outcome,
                    consecutive_failures = backend.consecutive_failures(),
                    "Health check"
                );
            }
        }

        metrics::record_backend_alive(&label, backend.is_alive());
    }

    /// Issue one liveness probe with the configured timeout.
    pub async fn probe(&self, backend: &Backend) -> ProbeOutcome {
        let uri_string = format!(
            "{}{}",
            backend.url.as_str().trim_end_matches('/'),
            self.config.path
        );

        let request = match Request::builder()
            .method("GET")
            .uri(uri_string)
            .header("user-agent", "role-balancer-health-check")
            .body(Body::empty()) {
                Ok(req) => req,
                Err(e) => return ProbeOutcome::Unreachable(e.to_string()),
            };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status().is_success() => ProbeOutcome::Healthy,
            Ok(Ok(response)) => ProbeOutcome::BadStatus(response.status()),
            Ok(Err(e)) => ProbeOutcome::Unreachable(e.to_string()),
            Err(_) => ProbeOutcome::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    async fn dead_url() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    /// Answers every connection with `status_line`.
    async fn fixed_status_url(status_line: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        status_line
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn config() -> HealthCheckConfig {
        HealthCheckConfig {
            enabled: true,
            interval_secs: 1,
            timeout_secs: 1,
            path: "/health".into(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_counts_failures() {
        let healthy = fixed_status_url("200 OK").await;
        let dead = dead_url().await;
        let pool = Arc::new(BackendPool::new(vec![healthy, dead], 0).unwrap());
        let monitor = HealthMonitor::new(pool.clone(), config());

        for _ in 0..3 {
            monitor.check_all().await;
        }

        let snap = pool.list_backends();
        assert!(snap[0].alive);
        assert_eq!(snap[0].consecutive_failures, 0);
        assert!(!snap[1].alive);
        assert_eq!(snap[1].consecutive_failures, 3);
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let url = fixed_status_url("503 Service Unavailable").await;
        let pool = Arc::new(BackendPool::new(vec![url], 0).unwrap());
        let monitor = HealthMonitor::new(pool.clone(), config());

        let outcome = monitor.probe(pool.get(0).unwrap()).await;
        assert_eq!(outcome, ProbeOutcome::BadStatus(StatusCode::SERVICE_UNAVAILABLE));

        monitor.check_all().await;
        assert!(!pool.get(0).unwrap().is_alive());
    }

    #[tokio::test]
    async fn test_successful_probe_restores_backend() {
        let url = fixed_status_url("200 OK").await;
        let pool = Arc::new(BackendPool::new(vec![url], 0).unwrap());
        pool.mark_down(0);
        pool.mark_down(0);

        let monitor = HealthMonitor::new(pool.clone(), config());
        monitor.check_all().await;

        let backend = pool.get(0).unwrap();
        assert!(backend.is_alive());
        assert_eq!(backend.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_disabled_monitor_returns_immediately() {
        let pool = Arc::new(BackendPool::new(vec![dead_url().await], 0).unwrap());
        let mut config = config();
        config.enabled = false;
        let (_tx, rx) = broadcast::channel(1);

        HealthMonitor::new(pool.clone(), config).run(rx).await;
        assert!(pool.get(0).unwrap().is_alive());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let pool = Arc::new(BackendPool::new(vec![dead_url().await], 0).unwrap());
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(HealthMonitor::new(pool, config()).run(rx));

        tx.send(()).unwrap();
        time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_zero_interval_keeps_monitoring() {
        let pool = Arc::new(BackendPool::new(vec![dead_url().await], 0).unwrap());
        let mut config = config();
        config.interval_secs = 0;
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(HealthMonitor::new(pool.clone(), config).run(rx));

        let deadline = Instant::now() + Duration::from_secs(3);
        while pool.get(0).unwrap().is_alive() && Instant::now() < deadline {
            time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!pool.get(0).unwrap().is_alive());
        assert!(!handle.is_finished());

        tx.send(()).unwrap();
        time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }
}
