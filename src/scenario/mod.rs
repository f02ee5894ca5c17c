// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The cluster DNS scenario and the harness that runs it in fresh namespaces.

pub mod cluster_dns;
pub mod harness;

pub use cluster_dns::{dns_query_command, namespace_names, resolution_target, ClusterDnsScenario};
pub use harness::run_in_fresh_namespaces;
