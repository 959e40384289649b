// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation

use crate::error::{ProviderError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Create a client from an explicit kubeconfig file, or infer one from the
/// environment (`KUBECONFIG`, `~/.kube/config` or the in-cluster service account)
#[instrument]
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let Some(path) = kubeconfig else {
        debug!("No kubeconfig given, inferring client configuration");
        return Client::try_default()
            .await
            .map_err(|e| ProviderError::KubeconfigError(format!("Failed to infer config: {}", e)));
    };

    info!("Loading kubeconfig from {}", path.display());
    let kubeconfig = tokio::fs::read_to_string(path).await.map_err(|e| {
        ProviderError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    create_client_from_kubeconfig(&kubeconfig, context).await
}

/// Create a Kubernetes client from a kubeconfig string
pub async fn create_client_from_kubeconfig(kubeconfig: &str, context: Option<&str>) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| ProviderError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let client_config = kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &options)
        .await
        .map_err(|e| ProviderError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| ProviderError::KubeconfigError(format!("Failed to create client: {}", e)))
}
