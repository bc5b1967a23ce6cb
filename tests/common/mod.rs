//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::future::Future;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use role_balancer::auth::{issue_token, jwt::DEFAULT_TOKEN_TTL, Role};
use role_balancer::config::{BackendConfig, BalancerConfig};
use role_balancer::{HttpServer, Shutdown};

pub const SECRET: &str = "integration-secret";

/// Read the request head and return its path.
async fn read_path(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf)
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string()
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable backend on an ephemeral port. `f` maps the request
/// path to a status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let path = read_path(&mut socket).await;
                let (status, body) = f(path).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a healthy backend answering every non-health path with
/// "Response from Backend {id}".
pub async fn start_backend(id: usize) -> SocketAddr {
    start_programmable_backend(move |path| async move {
        if path == "/health" {
            (200, format!("Backend {} is healthy", id))
        } else {
            (200, format!("Response from Backend {}", id))
        }
    })
    .await
}

/// An address with nothing listening on it.
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Balancer config over `backends`, the first privileged, health checks off.
pub fn config_for(backends: &[SocketAddr]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backends = backends
        .iter()
        .enumerate()
        .map(|(i, addr)| BackendConfig {
            url: format!("http://{}", addr),
            privileged: i == 0,
        })
        .collect();
    config.health_check.enabled = false;
    config.auth.secret = SECRET.into();
    config
}

/// A running balancer.
pub struct Harness {
    pub url: String,
    pub pool: Arc<role_balancer::load_balancer::pool::BackendPool>,
    pub shutdown: Shutdown,
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_balancer(config: BalancerConfig) -> Harness {
    let server = HttpServer::new(config).unwrap();
    let pool = server.pool().clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Harness {
        url: format!("http://{}", addr),
        pool,
        shutdown,
    }
}

pub fn bearer(role: Role) -> String {
    format!("Bearer {}", issue_token(role, SECRET, DEFAULT_TOKEN_TTL).unwrap())
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Send one GET as `role`, returning status and body.
pub async fn send(client: &reqwest::Client, url: &str, role: Role) -> (u16, String) {
    let res = client
        .get(url)
        .header("authorization", bearer(role))
        .send()
        .await
        .expect("balancer unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap_or_default())
}

/// Backend id parsed from a mock response body.

pub fn backend_id(body: &str) -> Option<usize> {
    body.strip_prefix("Response from Backend ")?.trim().parse().ok()
}
