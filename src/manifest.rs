// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource configuration as written by users, and YAML rendering of manifests.

use crate::constants::SERVER_METADATA_FIELDS;
use crate::duration::DurationValue;
use crate::error::{ProviderError, Result};
use crate::types::ChaosKind;
use crate::wait::WaitSpec;
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Configuration of one managed resource
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ResourceConfig {
    /// The custom resource: apiVersion, kind, metadata and spec
    pub manifest: Value,
    #[serde(default, alias = "wait_for", skip_serializing_if = "Vec::is_empty")]
    pub wait_for_upsert: Vec<WaitForUpsert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_delete: Option<WaitForDelete>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WaitForUpsert {
    pub jsonpath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default = "DurationValue::default_timeout")]
    pub timeout: DurationValue,
    #[serde(default = "DurationValue::default_poll_interval")]
    pub poll_interval: DurationValue,
}

impl WaitForUpsert {
    pub fn to_spec(&self) -> Result<WaitSpec> {
        WaitSpec::upsert(
            &self.jsonpath,
            self.value.clone(),
            &self.timeout,
            &self.poll_interval,
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WaitForDelete {
    #[serde(default = "DurationValue::default_timeout")]
    pub timeout: DurationValue,
    #[serde(default = "DurationValue::default_poll_interval")]
    pub poll_interval: DurationValue,
}

impl WaitForDelete {
    pub fn to_spec(&self) -> Result<WaitSpec> {
        WaitSpec::delete(&self.timeout, &self.poll_interval)
    }
}

impl ResourceConfig {
    /// Parse a configuration document (YAML, or JSON which is valid YAML)
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// The catalog entry matching the manifest's apiVersion and kind
    pub fn kind(&self) -> Result<ChaosKind> {
        let field = |name: &str| {
            self.manifest
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| ProviderError::InvalidManifest(format!("missing '{}'", name)))
        };

        let kind: ChaosKind = field("kind")?.parse()?;
        let api_version = field("apiVersion")?;
        if api_version != kind.api_version() {
            return Err(ProviderError::InvalidManifest(format!(
                "{} uses apiVersion {}, got {}",
                kind,
                kind.api_version(),
                api_version
            )));
        }
        Ok(kind)
    }

    /// The object to apply, with its namespace settled
    pub fn desired_object(&self, default_namespace: &str) -> Result<(ChaosKind, DynamicObject)> {
        let kind = self.kind()?;
        let mut object: DynamicObject = serde_json::from_value(self.manifest.clone())?;

        let Some(name) = object.metadata.name.clone() else {
            return Err(ProviderError::InvalidManifest(
                "metadata.name is required".to_string(),
            ));
        };

        match (kind.is_namespaced(), object.metadata.namespace.as_deref()) {
            (true, None) | (true, Some("")) => {
                object.metadata.namespace = Some(default_namespace.to_string());
            }
            (false, Some(ns)) if !ns.is_empty() => {
                return Err(ProviderError::InvalidManifest(format!(
                    "{} '{}' is cluster scoped but sets namespace '{}'",
                    kind, name, ns
                )));
            }
            _ => {}
        }

        if let Some(data) = object.data.as_object_mut() {
            if data.remove("status").is_some() {
                warn!("Ignoring status of {} '{}', it is owned by the cluster", kind, name);
            }
        }

        Ok((kind, object))
    }

    pub fn upsert_waits(&self) -> Result<Vec<WaitSpec>> {
        self.wait_for_upsert.iter().map(WaitForUpsert::to_spec).collect()
    }

    pub fn delete_wait(&self) -> Result<Option<WaitSpec>> {
        self.wait_for_delete.as_ref().map(WaitForDelete::to_spec).transpose()
    }
}

/// Render an object as a YAML manifest, without status and server-populated metadata
pub fn render_manifest(object: &DynamicObject) -> Result<String> {
    let mut value = serde_json::to_value(object)?;

    if let Some(root) = value.as_object_mut() {
        root.remove("status");
        if let Some(metadata) = root.get_mut("metadata").and_then(Value::as_object_mut) {
            for field in SERVER_METADATA_FIELDS {
                metadata.remove(*field);
            }
        }
    }

    Ok(serde_yaml::to_string(&value)?)
}
