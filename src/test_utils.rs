// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API server and recording fakes of the
//! scenario's collaborators.

use crate::error::{Result, ScenarioError};
use crate::kubernetes::{ClusterApi, ManifestApplier};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Handle on the `(method, path)` of every request served, in order
    pub fn requests(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        self.requests.clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("path", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

fn pod_value(name: &str, phase: &str) -> serde_json::Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "labels": { "name": "dns-backend" }
        },
        "status": { "phase": phase }
    })
}

pub fn pod_json(name: &str, phase: &str) -> String {
    pod_value(name, phase).to_string()
}

/// A PodList of `(name, phase)` pairs
pub fn pod_list_json(pods: &[(&str, &str)]) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "PodList",
        "metadata": {},
        "items": pods.iter().map(|(name, phase)| pod_value(name, phase)).collect::<Vec<_>>()
    })
    .to_string()
}

pub fn rc_json(name: &str, replicas: i32) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ReplicationController",
        "metadata": { "name": name },
        "spec": {
            "replicas": replicas,
            "selector": { "name": name }
        }
    })
    .to_string()
}

pub fn service_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": name },
        "spec": {
            "ports": [{ "port": 8000 }],
            "selector": { "name": name }
        }
    })
    .to_string()
}

pub fn pod(name: &str, phase: Option<&str>) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: phase.map(|p| PodStatus {
            phase: Some(p.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Ordered record of calls made against the fakes
pub type Events = Arc<Mutex<Vec<String>>>;

/// In-memory [`ClusterApi`] that records every call into a shared event log
pub struct FakeCluster {
    events: Events,
    pub backend_pods: Vec<Pod>,
    pub dns_output: String,
    pub frontend_log: String,
}

impl FakeCluster {
    pub fn new(events: Events) -> Self {
        Self {
            events,
            backend_pods: vec![pod("dns-backend-7x2kq", Some("Running"))],
            dns_output: "ok\n".to_string(),
            frontend_log: "Hello World!\n".to_string(),
        }
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>> {
        self.record(format!("list {} {}", namespace, label_selector));
        Ok(self.backend_pods.clone())
    }

    async fn wait_for_controlled_pods_running(&self, namespace: &str, controller: &str) -> Result<()> {
        self.record(format!("running {}/{}", namespace, controller));
        Ok(())
    }

    async fn wait_for_service(&self, namespace: &str, service: &str) -> Result<()> {
        self.record(format!("service {}/{}", namespace, service));
        Ok(())
    }

    async fn wait_for_service_responding(&self, namespace: &str, service: &str) -> Result<()> {
        self.record(format!("service-responding {}/{}", namespace, service));
        Ok(())
    }

    async fn wait_for_pods_responding(
        &self,
        namespace: &str,
        pod_name_prefix: &str,
        pods: &[Pod],
    ) -> Result<()> {
        self.record(format!(
            "pods-responding {}/{} ({})",
            namespace,
            pod_name_prefix,
            pods.len()
        ));
        Ok(())
    }

    async fn wait_for_pod_not_pending(&self, namespace: &str, pod: &str) -> Result<()> {
        self.record(format!("not-pending {}/{}", namespace, pod));
        Ok(())
    }

    async fn exec_in_pod(&self, namespace: &str, pod: &str, _command: &[String]) -> Result<String> {
        self.record(format!("exec {}/{}", namespace, pod));
        Ok(self.dns_output.clone())
    }

    async fn pod_logs(&self, namespace: &str, pod: &str, container: &str) -> Result<String> {
        self.record(format!("logs {}/{}[{}]", namespace, pod, container));
        Ok(self.frontend_log.clone())
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(2)
    }
}

/// [`ManifestApplier`] that records creations and keeps stdin payloads
pub struct FakeKubectl {
    events: Events,
    pub payloads: Mutex<Vec<(String, String)>>,
    /// Manifest file name whose creation fails
    pub fail_on: Option<String>,
}

impl FakeKubectl {
    pub fn new(events: Events) -> Self {
        Self {
            events,
            payloads: Mutex::new(Vec::new()),
            fail_on: None,
        }
    }
}

#[async_trait]
impl ManifestApplier for FakeKubectl {
    async fn create_from_file(&self, manifest: &Path, namespace: &str) -> Result<()> {
        let file = manifest
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        self.events
            .lock()
            .unwrap()
            .push(format!("create {} {}", file, namespace));

        if self.fail_on.as_deref() == Some(file.as_str()) {
            return Err(ScenarioError::KubectlError(format!(
                "kubectl create -f {} --namespace={} exited with exit status: 1",
                file, namespace
            )));
        }
        Ok(())
    }

    async fn create_from_stdin(&self, manifest: &str, namespace: &str) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("create - {}", namespace));
        self.payloads
            .lock()
            .unwrap()
            .push((namespace.to_string(), manifest.to_string()));
        Ok(())
    }
}
