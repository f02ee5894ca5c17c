// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cross-namespace name resolution scenario.
//!
//! A backend ReplicationController and Service are created in every test
//! namespace. Once the backends answer and the first namespace's service name
//! resolves from inside a backend pod, a frontend pod pointed at that name is
//! created in every namespace and must print the expected greeting.

use crate::config::Config;
use crate::constants::{backend, dns, frontend, namespaces};
use crate::error::{Result, ScenarioError};
use crate::kubernetes::pods::name_selector;
use crate::kubernetes::{ClusterApi, ManifestApplier};
use crate::manifest::{prepare_resource_with_replaced_string, service_fqdn};
use kube::ResourceExt;
use tracing::{info, instrument};

/// Names of the test namespaces, `dnsexample0` and `dnsexample1`
pub fn namespace_names() -> Vec<String> {
    (0..namespaces::COUNT)
        .map(|i| format!("{}{}", namespaces::PREFIX, i))
        .collect()
}

/// Host name looked up by the resolution probe
pub fn resolution_target(service: &str, namespace: &str) -> String {
    format!("{}.{}", service, namespace)
}

/// `python -c <script>` resolving `host` and printing `ok` or `err`
pub fn dns_query_command(host: &str) -> Vec<String> {
    vec![
        "python".to_string(),
        "-c".to_string(),
        dns::QUERY_SCRIPT_TEMPLATE
            .replace("{host}", host)
            .replace("{ok}", dns::OK_TOKEN)
            .replace("{err}", dns::ERR_TOKEN),
    ]
}

pub struct ClusterDnsScenario<'a> {
    config: &'a Config,
    cluster: &'a dyn ClusterApi,
    kubectl: &'a dyn ManifestApplier,
    namespaces: Vec<String>,
}

impl<'a> ClusterDnsScenario<'a> {
    pub fn new(
        config: &'a Config,
        cluster: &'a dyn ClusterApi,
        kubectl: &'a dyn ManifestApplier,
        namespaces: Vec<String>,
    ) -> Self {
        Self {
            config,
            cluster,
            kubectl,
            namespaces,
        }
    }

    /// Run every step in order; the first failure aborts the scenario.
    pub async fn run(&self) -> Result<()> {
        let Some(first) = self.namespaces.first() else {
            return Err(ScenarioError::NamespaceError("no test namespaces given".to_string()));
        };
        info!("Running cluster DNS scenario in namespaces {:?}", self.namespaces);

        self.create_backends().await?;
        self.wait_for_backends().await?;
        self.verify_backends_responding().await?;
        self.wait_for_name_resolution(first).await?;

        let frontend_manifest = self.frontend_manifest_for(first)?;
        self.create_frontends(&frontend_manifest).await?;
        self.wait_for_frontends_scheduled().await?;
        self.verify_frontend_output().await?;

        info!("Cluster DNS scenario passed");
        Ok(())
    }

    /// Controllers go to every namespace before any service does.
    async fn create_backends(&self) -> Result<()> {
        let rc = self.config.manifest_path(backend::RC_MANIFEST);
        let svc = self.config.manifest_path(backend::SERVICE_MANIFEST);

        for ns in &self.namespaces {
            self.kubectl.create_from_file(&rc, ns).await?;
        }
        for ns in &self.namespaces {
            self.kubectl.create_from_file(&svc, ns).await?;
        }
        Ok(())
    }

    async fn wait_for_backends(&self) -> Result<()> {
        for ns in &self.namespaces {
            self.cluster
                .wait_for_controlled_pods_running(ns, backend::RC_NAME)
                .await?;
            self.cluster.wait_for_service(ns, backend::SERVICE_NAME).await?;
        }
        Ok(())
    }

    /// Running pods may not be serving yet, so query each one and the service.
    async fn verify_backends_responding(&self) -> Result<()> {
        for ns in &self.namespaces {
            let pods = self
                .cluster
                .list_pods(ns, &name_selector(backend::RC_NAME))
                .await?;
            self.cluster
                .wait_for_pods_responding(ns, backend::POD_NAME, &pods)
                .await?;
            info!("found {} backend pods responding in namespace {}", pods.len(), ns);

            self.cluster
                .wait_for_service_responding(ns, backend::SERVICE_NAME)
                .await?;
        }
        Ok(())
    }

    /// The service name can lag behind the service object in cluster DNS, and
    /// the frontend does not retry failed lookups.
    #[instrument(skip(self))]
    async fn wait_for_name_resolution(&self, namespace: &str) -> Result<()> {
        let pods = self
            .cluster
            .list_pods(namespace, &name_selector(backend::POD_NAME))
            .await?;
        let Some(pod) = pods.first() else {
            return Err(ScenarioError::NoBackendPods(namespace.to_string()));
        };

        let target = resolution_target(backend::SERVICE_NAME, namespace);
        info!("Waiting for {} to resolve from pod {}", target, pod.name_any());
        self.cluster
            .exec_in_pod_and_look_for_string(
                namespace,
                &pod.name_any(),
                &dns_query_command(&target),
                dns::OK_TOKEN,
                dns::READY_TIMEOUT,
            )
            .await?;
        Ok(())
    }

    /// Frontend manifest pointed at the backend service of `namespace`
    fn frontend_manifest_for(&self, namespace: &str) -> Result<String> {
        let domain = &self.config.cluster_dns_domain;
        prepare_resource_with_replaced_string(
            &self.config.manifest_path(frontend::POD_MANIFEST),
            &service_fqdn(backend::SERVICE_NAME, frontend::AUTHORED_NAMESPACE, domain),
            &service_fqdn(backend::SERVICE_NAME, namespace, domain),
        )
    }

    async fn create_frontends(&self, manifest: &str) -> Result<()> {
        for ns in &self.namespaces {
            self.kubectl.create_from_stdin(manifest, ns).await?;
        }
        Ok(())
    }

    /// The frontend exits on its own, so only wait for it to be scheduled.
    async fn wait_for_frontends_scheduled(&self) -> Result<()> {
        for ns in &self.namespaces {
            self.cluster
                .wait_for_pod_not_pending(ns, frontend::POD_NAME)
                .await?;
        }
        Ok(())
    }

    async fn verify_frontend_output(&self) -> Result<()> {
        for ns in &self.namespaces {
            self.cluster
                .look_for_string_in_log(
                    ns,
                    frontend::POD_NAME,
                    frontend::CONTAINER_NAME,
                    frontend::EXPECTED_OUTPUT,
                    self.config.timeouts.pod_start,
                )
                .await?;
            info!("Pod {}/{} printed {:?}", ns, frontend::POD_NAME, frontend::EXPECTED_OUTPUT);
        }
        Ok(())
    }
}
