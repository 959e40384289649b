// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Default field manager used for server-side apply
pub const DEFAULT_FIELD_MANAGER: &str = "k8s-chaos-provider";

/// Namespace used when a manifest for a namespaced kind omits one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Condition-wait defaults
pub mod wait {
    use std::time::Duration;

    /// Default timeout as written in resource configuration
    pub const DEFAULT_TIMEOUT: &str = "30s";
    /// Default poll interval as written in resource configuration
    pub const DEFAULT_POLL_INTERVAL: &str = "5s";
    /// Deadline applied to a negative ("wait forever") timeout
    pub const UNBOUNDED_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);
}

/// API groups of the supported chaos CRDs
pub mod groups {
    pub const CHAOS_MESH: &str = "chaos-mesh.org";
    pub const LITMUS: &str = "litmuschaos.io";
    pub const VERSION: &str = "v1alpha1";
}

/// Metadata fields populated by the API server, dropped from rendered manifests
pub const SERVER_METADATA_FIELDS: &[&str] = &[
    "uid",
    "resourceVersion",
    "generation",
    "creationTimestamp",
    "deletionTimestamp",
    "deletionGracePeriodSeconds",
    "managedFields",
    "selfLink",
];
