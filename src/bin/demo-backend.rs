//! Stand-in backend for local runs of the balancer.

use axum::{
    extract::Path,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Router,
};
use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "demo-backend")]
struct Args {
    /// Backend id, echoed in every response. Id 1 also serves /admin/*.
    #[arg(short, long, default_value_t = 1)]
    id: u16,

    #[arg(short, long, default_value_t = 8081)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demo_backend=info".into()),
        )
        .init();

    let args = Args::parse();
    let id = args.id;

    let mut app = Router::new()
        .route("/health", get(move || async move {
            (StatusCode::OK, format!("Backend {} is healthy", id))
        }))
        .fallback(move |method: Method, uri: Uri, headers: HeaderMap| async move {
            tracing::info!(backend = id, method = %method, path = %uri.path(), "Request received");
            let mut body = format!(
                "Response from Backend {}\nPath: {}\nMethod: {}\nHeaders:\n",
                id,
                uri.path(),
                method
            );
            for (name, value) in headers.iter() {
                body.push_str(&format!("{}: {}\n", name, value.to_str().unwrap_or("<binary>")));
            }
            body
        });

    if id == 1 {
        app = app.route("/admin/{*rest}", any(|Path(rest): Path<String>| async move {
            format!("Admin endpoint on Backend 1\nPath: /admin/{}\n", rest)
        }));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(backend = id, address = %addr, "Demo backend listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
