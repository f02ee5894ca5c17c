// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod status and label selector helpers

use crate::constants::NAME_LABEL;
use k8s_openapi::api::core::v1::Pod;
use std::collections::BTreeMap;

/// Render a label map as a `k=v,k2=v2` selector
pub fn label_selector(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Selector matching pods labelled `name=<name>`
pub fn name_selector(name: &str) -> String {
    format!("{}={}", NAME_LABEL, name)
}

pub fn phase(pod: &Pod) -> Option<&str> {
    pod.status.as_ref().and_then(|s| s.phase.as_deref())
}

pub fn is_running(pod: &Pod) -> bool {
    phase(pod) == Some("Running")
}

/// A pod without a reported phase has not been scheduled yet
pub fn is_pending(pod: &Pod) -> bool {
    matches!(phase(pod), None | Some("Pending"))
}
