// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Literal rewriting of manifest payloads before they are submitted.

use crate::error::{Result, ScenarioError};
use std::path::Path;
use tracing::debug;

/// Replace the first occurrence of `old` in `text` with `new`.
///
/// Returns `text` unchanged when `old` does not occur. Pass enough context in
/// `old` that only the intended occurrence can match.
pub fn replace_first(text: &str, old: &str, new: &str) -> String {
    text.replacen(old, new, 1)
}

/// Read a manifest and replace the first occurrence of `old` with `new`.
///
/// Fails when the file cannot be read or does not contain `old`.
pub fn prepare_resource_with_replaced_string(path: &Path, old: &str, new: &str) -> Result<String> {
    let data = std::fs::read_to_string(path).map_err(|source| ScenarioError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    if !data.contains(old) {
        return Err(ScenarioError::ManifestPatternNotFound {
            path: path.to_path_buf(),
            pattern: old.to_string(),
        });
    }

    debug!("Rewriting {:?} to {:?} in {}", old, new, path.display());
    Ok(replace_first(&data, old, new))
}

/// Fully-qualified service name as seen from inside the cluster
pub fn service_fqdn(service: &str, namespace: &str, cluster_domain: &str) -> String {
    format!("{}.{}.svc.{}", service, namespace, cluster_domain)
}
