// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cluster_dns_e2e::config::Config;
use cluster_dns_e2e::scenario::run_in_fresh_namespaces;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, defaulting to info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting cluster DNS scenario");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: manifest_dir={}, cluster_dns_domain={}",
        config.manifest_dir.display(),
        config.cluster_dns_domain
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    run_in_fresh_namespaces(&client, &config)
        .await
        .context("Cluster DNS scenario failed")?;

    info!("Cluster DNS scenario succeeded");
    Ok(())
}
