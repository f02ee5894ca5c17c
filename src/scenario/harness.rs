// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace setup and teardown around a scenario run.

use crate::config::Config;
use crate::error::Result;
use crate::kubernetes::{create_namespace, delete_namespace, KubeCluster, Kubectl};
use crate::scenario::{namespace_names, ClusterDnsScenario};
use kube::Client;
use tracing::{info, warn};

/// Create the test namespaces, run the scenario in them, and delete the
/// namespaces this run created unless `keep_namespaces` is set. Teardown runs
/// whatever the outcome.
pub async fn run_in_fresh_namespaces(client: &Client, config: &Config) -> Result<()> {
    let mut created = Vec::new();

    let result = run(client, config, &namespace_names(), &mut created).await;

    if config.keep_namespaces {
        info!("Keeping namespaces {:?}", created);
    } else {
        for ns in &created {
            if let Err(e) = delete_namespace(client, ns).await {
                warn!("Teardown failed: {}", e);
            }
        }
    }

    result
}

async fn run(
    client: &Client,
    config: &Config,
    namespaces: &[String],
    created: &mut Vec<String>,
) -> Result<()> {
    for ns in namespaces {
        create_namespace(client, ns).await?;
        created.push(ns.clone());
    }

    let cluster = KubeCluster::new(client.clone(), config.timeouts);
    let kubectl = Kubectl::from_config(config);
    ClusterDnsScenario::new(config, &cluster, &kubectl, namespaces.to_vec())
        .run()
        .await
}
