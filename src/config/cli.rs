//! Command-line overrides.

use std::path::PathBuf;
use clap::Parser;

use crate::config::schema::{BackendConfig, BalancerConfig};

/// Command-line arguments for the balancer binary.
#[derive(Debug, Parser)]
#[command(name = "role-balancer")]
#[command(about = "Role-aware HTTP load balancer", long_about = None)]
pub struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on (binds 0.0.0.0).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Backend base URL; repeat in pool order. The first is privileged.
    #[arg(short, long = "backend")]
    pub backends: Vec<String>,

    /// Write logs to this file instead of stdout.
    #[arg(short, long)]
    pub log: Option<String>,
}

impl Args {
    /// Apply overrides on top of file or default configuration.
    pub fn apply(&self, config: &mut BalancerConfig) {
        if let Some(port) = self.port {
            config.listener.bind_address = format!("0.0.0.0:{}", port);
        }
        if !self.backends.is_empty() {
            config.backends = self
                .backends
                .iter()
                .enumerate()
                .map(|(i, url)| BackendConfig {
                    url: url.clone(),
                    privileged: i == 0,
                })
                .collect();
        }
        if let Some(log) = &self.log {
            config.observability.log_file = Some(log.clone());
        }
    }
}
