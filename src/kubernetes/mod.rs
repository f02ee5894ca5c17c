// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes collaborators: cluster API, kubectl, and namespace management.

pub mod cluster;
pub mod kubectl;
pub mod namespaces;
pub mod pods;

pub use cluster::{ClusterApi, KubeCluster};
pub use kubectl::{Kubectl, ManifestApplier};
pub use namespaces::{create_namespace, delete_namespace};
