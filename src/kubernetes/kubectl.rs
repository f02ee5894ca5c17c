// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource creation through the kubectl CLI

use crate::config::Config;
use crate::error::{Result, ScenarioError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Submits manifests into a namespace. Failures are not retried.
#[async_trait]
pub trait ManifestApplier: Send + Sync {
    async fn create_from_file(&self, manifest: &Path, namespace: &str) -> Result<()>;

    /// Create the resources described by an in-memory manifest.
    async fn create_from_stdin(&self, manifest: &str, namespace: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: String,
    kubeconfig: Option<PathBuf>,
}

impl Kubectl {
    pub fn new(binary: impl Into<String>, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            kubeconfig,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.kubectl.clone(), config.kubeconfig().map(Path::to_path_buf))
    }

    /// Arguments for `kubectl create -f <source> --namespace=<namespace>`
    fn create_args(&self, source: &str, namespace: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        args.extend([
            "create".to_string(),
            "-f".to_string(),
            source.to_string(),
            namespace_flag(namespace),
        ]);
        args
    }

    async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String> {
        debug!("Running {} {}", self.binary, args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScenarioError::KubectlError(format!("failed to run {}: {}", self.binary, e)))?;

        if let (Some(data), Some(mut pipe)) = (stdin, child.stdin.take()) {
            match pipe.write_all(data.as_bytes()).await {
                Ok(()) => {}
                // the exit status below carries the real failure
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin early", self.binary);
                }
                Err(e) => {
                    return Err(ScenarioError::KubectlError(format!("failed to write stdin: {}", e)));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ScenarioError::KubectlError(format!("failed to wait for {}: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(ScenarioError::KubectlError(format!(
                "{} {} exited with {}: {}",
                self.binary,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl ManifestApplier for Kubectl {
    #[instrument(skip(self))]
    async fn create_from_file(&self, manifest: &Path, namespace: &str) -> Result<()> {
        let args = self.create_args(&manifest.to_string_lossy(), namespace);
        let out = self.run(&args, None).await?;
        info!("{}", out.trim());
        Ok(())
    }

    #[instrument(skip(self, manifest))]
    async fn create_from_stdin(&self, manifest: &str, namespace: &str) -> Result<()> {
        let args = self.create_args("-", namespace);
        let out = self.run(&args, Some(manifest)).await?;
        info!("{}", out.trim());
        Ok(())
    }
}

pub fn namespace_flag(namespace: &str) -> String {
    format!("--namespace={}", namespace)
}
