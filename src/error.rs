// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to build request: {0}")]
    RequestError(#[from] http::Error),

    #[error("kubectl failed: {0}")]
    KubectlError(String),

    #[error("Failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest {} does not contain {pattern:?}", .path.display())]
    ManifestPatternNotFound { path: PathBuf, pattern: String },

    #[error("Timed out after {timeout:?} waiting for {what}{}", last_error_suffix(.last_error))]
    Timeout {
        what: String,
        timeout: Duration,
        last_error: Option<String>,
    },

    #[error("No running pods found in namespace {0}")]
    NoBackendPods(String),

    #[error("Pod exec failed: {0}")]
    ExecError(String),

    #[error("Namespace operation failed: {0}")]
    NamespaceError(String),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_deref()
        .map(|e| format!(" (last error: {})", e))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
