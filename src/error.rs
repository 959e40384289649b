// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Invalid JSONPath '{path}': {reason}")]
    InvalidJsonPath { path: String, reason: String },

    #[error("Invalid import identifier '{id}': expected format '{expected}'")]
    InvalidImportId { id: String, expected: &'static str },

    #[error("Unsupported resource kind: {0}")]
    UnknownKind(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Resource {0} not found")]
    ResourceNotFound(String),

    #[error("{resource} was {action}, but wait condition {condition} was not met within {timeout}")]
    ConditionNotMet {
        resource: String,
        action: &'static str,
        condition: String,
        timeout: humantime::Duration,
    },

    #[error("Wait for {0} was cancelled")]
    WaitCancelled(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
