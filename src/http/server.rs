//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all balancing handler
//! - Wire up middleware (tracing, request ID)
//! - Extract the role, dispatch, forward
//! - Spawn the health monitor and the stats surface
//! - Shut down gracefully on signal

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderName, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::admin::{setup_admin_router, AdminState};
use crate::auth::{AuthError, JwtRoleExtractor, Role, RoleExtractor};
use crate::config::{finalize, BalancerConfig, ConfigError};
use crate::error::GatewayError;
use crate::health::HealthMonitor;
use crate::http::forward::Forwarder;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::load_balancer::pool::BackendPool;
use crate::observability::metrics;
use crate::routing::Dispatcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub extractor: Arc<dyn RoleExtractor>,
    pub auth_header: HeaderName,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Create a server verifying HS256 tokens with the configured secret.
    ///
    /// The configuration is validated first; an invalid one is rejected.
    pub fn new(config: BalancerConfig) -> Result<Self, ConfigError> {
        let extractor = Arc::new(JwtRoleExtractor::new(&config.auth.secret));
        Self::with_extractor(config, extractor)
    }

    /// Create a server with a custom role extractor.
    pub fn with_extractor(
        config: BalancerConfig,
        extractor: Arc<dyn RoleExtractor>,
    ) -> Result<Self, ConfigError> {
        let config = finalize(config)?;
        let pool = Arc::new(BackendPool::from_config(&config.backends)?);
        let forwarder = Forwarder::new(config.forward.timeout_secs.map(Duration::from_secs));
        let dispatcher = Arc::new(Dispatcher::new(pool.clone(), forwarder));

        let state = AppState {
            dispatcher,
            extractor,
            auth_header: HeaderName::from_bytes(config.auth.header.as_bytes())
                .unwrap_or(header::AUTHORIZATION),
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(balance_handler))
            .route("/", any(balance_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.pool.len(),
            privileged = %self.pool.privileged().label(),
            "HTTP server starting"
        );

        let monitor = HealthMonitor::new(self.pool.clone(), self.config.health_check.clone());
        tokio::spawn(monitor.run(shutdown.resubscribe()));

        if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            tracing::info!(address = %admin_listener.local_addr()?, "Stats surface listening");
            let admin = setup_admin_router(AdminState {
                pool: self.pool.clone(),
                api_key: Arc::from(self.config.admin.api_key.as_str()),
            });
            let mut admin_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                let result = axum::serve(admin_listener, admin)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Stats surface failed");
                }
            });
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The pool this server balances across.
    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// The router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Main balancing handler.
/// Extracts the role, selects a backend, and forwards the request.
async fn balance_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let credential = credential_role(state.extractor.as_ref(), request.headers(), &state.auth_header);
    let role = match credential {
        Ok(role) => role,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected credential");
            let error = GatewayError::from(e);
            metrics::record_request("none", error.status().as_u16(), start_time);
            return error.into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        role = %role,
        method = %request.method(),
        path = %request.uri().path(),
        "Balancing request"
    );

    match state.dispatcher.dispatch(role, request, client_ip).await {
        Ok(response) => {
            metrics::record_request(role.claim(), response.status().as_u16(), start_time);
            response
        }
        Err(error) => {
            metrics::record_request(role.claim(), error.status().as_u16(), start_time);
            error.into_response()
        }
    }
}

/// Read the credential header and hand it to the extractor.
/// An absent header is passed as empty; one that is not valid text is malformed.
fn credential_role(
    extractor: &dyn RoleExtractor,
    headers: &HeaderMap,
    name: &HeaderName,
) -> Result<Role, AuthError> {
    match headers.get(name) {
        None => extractor.extract_role(""),
        Some(value) => match value.to_str() {
            Ok(credential) => extractor.extract_role(credential),
            Err(_) => Err(AuthError::Malformed(format!("{} header is not valid text", name))),
        },
    }
}
