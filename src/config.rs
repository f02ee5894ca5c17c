// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{timeouts, DEFAULT_CLUSTER_DNS_DOMAIN};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scenario configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the backend and frontend manifests
    pub manifest_dir: PathBuf,
    /// DNS domain of the cluster under test, e.g. `cluster.local`
    pub cluster_dns_domain: String,
    pub kubectl: String,
    /// Passed to kubectl as `--kubeconfig` when set
    pub kubeconfig: Option<PathBuf>,
    /// Leave the test namespaces behind after the run
    pub keep_namespaces: bool,
    pub timeouts: Timeouts,
}

/// Poll interval and per-condition budgets of the readiness waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub poll_interval: Duration,
    pub pod_start: Duration,
    pub service_start: Duration,
    pub service_responding: Duration,
    pub pod_responding: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(timeouts::POLL_INTERVAL_SECS),
            pod_start: Duration::from_secs(timeouts::POD_START_SECS),
            service_start: Duration::from_secs(timeouts::SERVICE_START_SECS),
            service_responding: Duration::from_secs(timeouts::SERVICE_RESPONDING_SECS),
            pod_responding: Duration::from_secs(timeouts::POD_RESPONDING_SECS),
        }
    }
}

impl Timeouts {
    /// Reject settings that would poll the API server without pause
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            bail!("E2E_POLL_INTERVAL_SECS must be greater than zero");
        }
        Ok(())
    }
}

impl Config {
    /// Configuration with default domain, kubectl and timeouts
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            cluster_dns_domain: DEFAULT_CLUSTER_DNS_DOMAIN.to_string(),
            kubectl: "kubectl".to_string(),
            kubeconfig: None,
            keep_namespaces: false,
            timeouts: Timeouts::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let manifest_dir = env::var("CLUSTER_DNS_EXAMPLE_DIR").unwrap_or_else(|_| "manifests".to_string());
        let mut config = Config::new(manifest_dir);

        if let Ok(domain) = env::var("CLUSTER_DNS_DOMAIN") {
            config.cluster_dns_domain = domain;
        }
        if let Ok(kubectl) = env::var("KUBECTL") {
            config.kubectl = kubectl;
        }
        config.kubeconfig = env::var_os("KUBECONFIG").map(PathBuf::from);
        config.keep_namespaces = parse_flag("KEEP_NAMESPACES")?;

        let t = &mut config.timeouts;
        override_secs("E2E_POLL_INTERVAL_SECS", &mut t.poll_interval)?;
        override_secs("E2E_POD_START_TIMEOUT_SECS", &mut t.pod_start)?;
        override_secs("E2E_SERVICE_START_TIMEOUT_SECS", &mut t.service_start)?;
        override_secs("E2E_SERVICE_RESPONDING_TIMEOUT_SECS", &mut t.service_responding)?;
        override_secs("E2E_POD_RESPONDING_TIMEOUT_SECS", &mut t.pod_responding)?;
        t.validate()?;

        Ok(config)
    }

    /// Full path of a manifest file inside the manifest directory
    pub fn manifest_path(&self, file: &str) -> PathBuf {
        self.manifest_dir.join(file)
    }

    pub fn kubeconfig(&self) -> Option<&Path> {
        self.kubeconfig.as_deref()
    }
}

/// Boolean flag, `false` when unset
fn parse_flag(var: &str) -> Result<bool> {
    match env::var(var) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(anyhow!("{var} must be true or false, got {value:?}")),
        },
        Err(_) => Ok(false),
    }
}

fn override_secs(var: &str, target: &mut Duration) -> Result<()> {
    if let Ok(value) = env::var(var) {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("{var} must be a number of seconds, got {value:?}"))?;
        *target = Duration::from_secs(secs);
    }
    Ok(())
}
