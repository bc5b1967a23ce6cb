//! Forwarding to a chosen backend.
//!
//! # Responsibilities
//! - Rewrite the request target onto the backend's base URL
//! - Strip hop-by-hop headers, add `X-Forwarded-*`
//! - Relay the backend response (status, headers, body) unchanged
//!
//! # Design Decisions
//! - One attempt per request; failures surface as 502, never retried here
//! - Optional per-forward deadline; otherwise the transport's own timeout applies

use std::net::IpAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, Uri, Version},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::{Position, Url};

use crate::error::ForwardError;
use crate::load_balancer::backend::Backend;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Headers meaningful only for a single transport hop.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Reverse-proxy client shared by all request flows.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Option<Duration>,
}

impl Forwarder {
    pub fn new(timeout: Option<Duration>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    /// Send `request` to `backend` and return its response.
    pub async fn forward(
        &self,
        backend: &Backend,
        request: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Result<Response<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = rewrite_uri(&backend.url, &parts.uri).map_err(|reason| {
            ForwardError::BadTarget {
                index: backend.index,
                reason,
            }
        })?;

        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        if let Some(host) = parts.headers.remove(header::HOST) {
            parts.headers.insert(X_FORWARDED_HOST, host);
        }
        if let Some(ip) = client_ip {
            append_forwarded_for(&mut parts.headers, ip);
        }

        let response_future = self.client.request(Request::from_parts(parts, body));
        let result = match self.timeout {
            Some(after) => tokio::time::timeout(after, response_future)
                .await
                .map_err(|_| ForwardError::Timeout {
                    index: backend.index,
                    after,
                })?,
            None => response_future.await,
        };

        let response = result.map_err(|source| ForwardError::Transport {
            index: backend.index,
            source,
        })?;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Join the backend base URL with the request's path and query.
pub fn rewrite_uri(base: &Url, original: &Uri) -> Result<Uri, String> {
    let authority = &base[Position::BeforeHost..Position::AfterPort];
    let base_path = base.path().trim_end_matches('/');
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("{}://{}{}{}", base.scheme(), authority, base_path, path_and_query)
        .parse::<Uri>()
        .map_err(|e| e.to_string())
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in Connection are hop-by-hop too.
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: IpAddr) {
    let value = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, ip),
        None => ip.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
