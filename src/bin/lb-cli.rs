use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use role_balancer::auth::{issue_token, Role};

#[derive(Parser)]
#[command(name = "lb-cli")]
#[command(about = "Management CLI for the role balancer", long_about = None)]
struct Cli {
    /// Stats surface base URL.
    #[arg(short, long, default_value = "http://localhost:9081")]
    url: String,

    /// Stats surface API key.
    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    User,
    Client,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Role::Privileged,
            RoleArg::User => Role::User,
            RoleArg::Client => Role::Client,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a signed bearer token for a role
    Token {
        #[arg(value_enum)]
        role: RoleArg,

        /// Shared HS256 secret
        #[arg(short, long, default_value = "your-secret-key-replace-in-production")]
        secret: String,

        /// Lifetime in seconds
        #[arg(long, default_value_t = 3600)]
        ttl: u64,
    },
    /// Check balancer status
    Status,
    /// Show per-backend liveness and counters
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let path = match cli.command {
        Commands::Token { role, secret, ttl } => {
            let token = issue_token(role.into(), &secret, Duration::from_secs(ttl))?;
            println!("{}", token);
            return Ok(());
        }
        Commands::Status => "/admin/status",
        Commands::Stats => "/admin/stats",
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = reqwest::Client::new()
        .get(format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: stats surface returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
