//! Read-only stats surface.
//!
//! Served on its own listener so it never competes with balanced traffic,
//! and guarded by a static bearer API key.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::get,
    Router,
    middleware,
};

use crate::load_balancer::pool::BackendPool;
use self::handlers::*;
use self::auth::admin_auth_middleware;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub pool: Arc<BackendPool>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/stats", get(get_stats))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;
    use url::Url;

    fn state() -> AdminState {
        let urls = vec![
            Url::parse("http://127.0.0.1:8081").unwrap(),
            Url::parse("http://127.0.0.1:8082").unwrap(),
        ];
        AdminState {
            pool: Arc::new(BackendPool::new(urls, 0).unwrap()),
            api_key: Arc::from("secret-key"),
        }
    }

    #[tokio::test]
    async fn test_rejects_missing_key() {
        let app = setup_admin_router(state());
        let res = app
            .oneshot(Request::get("/admin/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_wrong_key() {
        let app = setup_admin_router(state());
        let res = app
            .oneshot(
                Request::get("/admin/status")
                    .header(header::AUTHORIZATION, "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_stats_snapshot() {
        let state = state();
        state.pool.record_dispatch(1);
        state.pool.mark_down(0);
        let app = setup_admin_router(state);

        let res = app
            .oneshot(
                Request::get("/admin/stats")
                    .header(header::AUTHORIZATION, "Bearer secret-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["dispatched"], 1);
        assert_eq!(json["backends"][0]["privileged"], true);
        assert_eq!(json["backends"][0]["alive"], false);
        assert_eq!(json["backends"][0]["consecutive_failures"], 1);
        assert_eq!(json["backends"][1]["served"], 1);
        assert_eq!(json["backends"][1]["url"], "http://127.0.0.1:8082/");
    }
}
