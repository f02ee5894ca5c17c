// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Test namespaces are named `<PREFIX><index>`
pub mod namespaces {
    pub const PREFIX: &str = "dnsexample";
    pub const COUNT: usize = 2;
}

/// Backend workload: a ReplicationController fronted by a Service
pub mod backend {
    pub const RC_MANIFEST: &str = "dns-backend-rc.yaml";
    pub const RC_NAME: &str = "dns-backend";
    pub const SERVICE_MANIFEST: &str = "dns-backend-service.yaml";
    pub const SERVICE_NAME: &str = "dns-backend";
    /// Value of the `name` label carried by every backend pod
    pub const POD_NAME: &str = "dns-backend";
}

/// Frontend workload: a single pod that calls the backend by its FQDN
pub mod frontend {
    pub const POD_MANIFEST: &str = "dns-frontend-pod.yaml";
    pub const POD_NAME: &str = "dns-frontend";
    pub const CONTAINER_NAME: &str = "dns-frontend";
    /// Namespace the frontend manifest is authored against
    pub const AUTHORED_NAMESPACE: &str = "development";
    /// Printed by the frontend once it has reached the backend
    pub const EXPECTED_OUTPUT: &str = "Hello World!";
}

/// Name resolution probe executed inside a backend pod
pub mod dns {
    use super::Duration;

    pub const READY_TIMEOUT: Duration = Duration::from_secs(60);
    pub const OK_TOKEN: &str = "ok";
    pub const ERR_TOKEN: &str = "err";

    /// Python program printing `{ok}` when `{host}` resolves and `{err}`
    /// otherwise. All three placeholders are substituted before use.
    pub const QUERY_SCRIPT_TEMPLATE: &str = "
import socket
try:
\tsocket.gethostbyname('{host}')
\tprint('{ok}')
except:
\tprint('{err}')";
}

/// Label key used to select the pods of a workload
pub const NAME_LABEL: &str = "name";

/// Default cluster DNS domain
pub const DEFAULT_CLUSTER_DNS_DOMAIN: &str = "cluster.local";

/// Polling defaults, all in seconds
pub mod timeouts {
    pub const POLL_INTERVAL_SECS: u64 = 2;
    pub const POD_START_SECS: u64 = 5 * 60;
    pub const SERVICE_START_SECS: u64 = 3 * 60;
    pub const SERVICE_RESPONDING_SECS: u64 = 2 * 60;
    pub const POD_RESPONDING_SECS: u64 = 15 * 60;
}
