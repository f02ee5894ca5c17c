// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster readiness conditions the scenario waits on.

use crate::config::Timeouts;
use crate::error::{Result, ScenarioError};
use crate::kubernetes::pods::{is_pending, is_running, label_selector, phase};
use crate::wait::{look_for_string, poll_until};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, ReplicationController, Service};
use kube::api::{AttachParams, ListParams, LogParams};
use kube::{Api, Client, ResourceExt};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, instrument};

/// Control-plane operations consumed by the scenario.
///
/// Every `wait_for_*` blocks until its condition holds and fails with
/// [`ScenarioError::Timeout`] once its budget is spent.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>>;

    /// Wait until every pod selected by the ReplicationController is running.
    async fn wait_for_controlled_pods_running(&self, namespace: &str, controller: &str) -> Result<()>;

    /// Wait until the service object exists.
    async fn wait_for_service(&self, namespace: &str, service: &str) -> Result<()>;

    /// Wait until a request through the service returns a body.
    async fn wait_for_service_responding(&self, namespace: &str, service: &str) -> Result<()>;

    /// Wait until each of `pods` is running and answers a direct request.
    async fn wait_for_pods_responding(
        &self,
        namespace: &str,
        pod_name_prefix: &str,
        pods: &[Pod],
    ) -> Result<()>;

    async fn wait_for_pod_not_pending(&self, namespace: &str, pod: &str) -> Result<()>;

    /// Run `command` in the pod's default container and return its stdout.
    async fn exec_in_pod(&self, namespace: &str, pod: &str, command: &[String]) -> Result<String>;

    async fn pod_logs(&self, namespace: &str, pod: &str, container: &str) -> Result<String>;

    fn poll_interval(&self) -> Duration;

    /// Re-run `command` until its output contains `expected`.
    async fn exec_in_pod_and_look_for_string(
        &self,
        namespace: &str,
        pod: &str,
        command: &[String],
        expected: &str,
        timeout: Duration,
    ) -> Result<String> {
        let what = format!("{:?} in exec output of pod {}/{}", expected, namespace, pod);
        look_for_string(&what, expected, self.poll_interval(), timeout, || {
            self.exec_in_pod(namespace, pod, command)
        })
        .await
    }

    /// Re-read the container log until it contains `expected`.
    async fn look_for_string_in_log(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        expected: &str,
        timeout: Duration,
    ) -> Result<String> {
        let what = format!("{:?} in log of {}/{}[{}]", expected, namespace, pod, container);
        look_for_string(&what, expected, self.poll_interval(), timeout, || {
            self.pod_logs(namespace, pod, container)
        })
        .await
    }
}

/// [`ClusterApi`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    timeouts: Timeouts,
}

impl KubeCluster {
    pub fn new(client: Client, timeouts: Timeouts) -> Self {
        Self { client, timeouts }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// GET through the API server proxy subresource of a pod or service
    async fn proxy_get(&self, namespace: &str, resource: &str, name: &str) -> Result<String> {
        let path = format!("/api/v1/namespaces/{}/{}/{}/proxy/", namespace, resource, name);
        let request = http::Request::get(path).body(Vec::new())?;
        Ok(self.client.request_text(request).await?)
    }

    async fn controlled_pods_running(&self, namespace: &str, controller: &str) -> Result<bool> {
        let rcs: Api<ReplicationController> = Api::namespaced(self.client.clone(), namespace);
        let rc = rcs.get(controller).await?;
        let spec = rc.spec.unwrap_or_default();
        let replicas = usize::try_from(spec.replicas.unwrap_or(1)).unwrap_or_default();
        let selector = label_selector(&spec.selector.unwrap_or_default());

        let pods = self.list_pods(namespace, &selector).await?;
        let running = pods.iter().filter(|p| is_running(p)).count();
        debug!(
            "{}/{} pods of {}/{} running",
            running, replicas, namespace, controller
        );

        Ok(pods.len() >= replicas && running == pods.len())
    }

    async fn pod_responding(&self, namespace: &str, pod: &Pod) -> Result<bool> {
        let name = pod.name_any();
        let current = self.pods(namespace).get(&name).await?;
        if !is_running(&current) {
            debug!(
                "Pod {}/{} is {:?}, not running yet",
                namespace,
                name,
                phase(&current)
            );
            return Ok(false);
        }

        self.proxy_get(namespace, "pods", &name).await?;
        Ok(true)
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    #[instrument(skip(self))]
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>> {
        let lp = ListParams::default().labels(label_selector);
        Ok(self.pods(namespace).list(&lp).await?.items)
    }

    #[instrument(skip(self))]
    async fn wait_for_controlled_pods_running(&self, namespace: &str, controller: &str) -> Result<()> {
        let what = format!("pods of replication controller {}/{} to run", namespace, controller);
        poll_until(&what, self.timeouts.poll_interval, self.timeouts.pod_start, || {
            self.controlled_pods_running(namespace, controller)
        })
        .await?;

        info!("All pods of {}/{} are running", namespace, controller);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn wait_for_service(&self, namespace: &str, service: &str) -> Result<()> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let what = format!("service {}/{} to exist", namespace, service);
        poll_until(&what, self.timeouts.poll_interval, self.timeouts.service_start, || {
            let services = services.clone();
            async move { Ok::<_, ScenarioError>(services.get_opt(service).await?.is_some()) }
        })
        .await?;

        info!("Service {}/{} exists", namespace, service);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn wait_for_service_responding(&self, namespace: &str, service: &str) -> Result<()> {
        let what = format!("service {}/{} to respond", namespace, service);
        poll_until(&what, self.timeouts.poll_interval, self.timeouts.service_responding, || async move {
            let body = self.proxy_get(namespace, "services", service).await?;
            Ok::<_, ScenarioError>(!body.is_empty())
        })
        .await?;

        info!("Service {}/{} is responding", namespace, service);
        Ok(())
    }

    #[instrument(skip(self, pods), fields(pod_count = pods.len()))]
    async fn wait_for_pods_responding(
        &self,
        namespace: &str,
        pod_name_prefix: &str,
        pods: &[Pod],
    ) -> Result<()> {
        let what = format!("{} pods of {}/{} to respond", pods.len(), namespace, pod_name_prefix);
        poll_until(&what, self.timeouts.poll_interval, self.timeouts.pod_responding, || async move {
            for pod in pods {
                if !self.pod_responding(namespace, pod).await? {
                    return Ok::<_, ScenarioError>(false);
                }
            }
            Ok(true)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn wait_for_pod_not_pending(&self, namespace: &str, pod: &str) -> Result<()> {
        let pods = self.pods(namespace);
        let what = format!("pod {}/{} to leave Pending", namespace, pod);
        poll_until(&what, self.timeouts.poll_interval, self.timeouts.pod_start, || {
            let pods = pods.clone();
            async move { Ok::<_, ScenarioError>(!is_pending(&pods.get(pod).await?)) }
        })
        .await
    }

    #[instrument(skip(self, command))]
    async fn exec_in_pod(&self, namespace: &str, pod: &str, command: &[String]) -> Result<String> {
        let mut attached = self
            .pods(namespace)
            .exec(pod, command.to_vec(), &AttachParams::default().stderr(false))
            .await?;

        let mut output = String::new();
        if let Some(mut stdout) = attached.stdout() {
            stdout
                .read_to_string(&mut output)
                .await
                .map_err(|e| ScenarioError::ExecError(format!("reading stdout of {}/{}: {}", namespace, pod, e)))?;
        }
        attached
            .join()
            .await
            .map_err(|e| ScenarioError::ExecError(format!("exec in {}/{}: {}", namespace, pod, e)))?;

        Ok(output)
    }

    #[instrument(skip(self))]
    async fn pod_logs(&self, namespace: &str, pod: &str, container: &str) -> Result<String> {
        let lp = LogParams {
            container: Some(container.to_string()),
            ..LogParams::default()
        };
        Ok(self.pods(namespace).logs(pod, &lp).await?)
    }

    fn poll_interval(&self) -> Duration {
        self.timeouts.poll_interval
    }
}
