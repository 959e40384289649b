// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle operations on chaos custom resources through the dynamic API.

use crate::config::Config;
use crate::error::{ProviderError, Result};
use crate::types::ChaosKind;
use crate::wait::{Poller, WaitOutcome, WaitSpec};
use kube::{
    api::{ApiResource, DeleteParams, DynamicObject, Patch, PatchParams},
    Api, Client,
};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Result of a create or update
#[derive(Debug, Clone)]
pub struct Applied {
    /// The object as returned by the API server after the apply
    pub object: DynamicObject,
    /// One outcome per configured upsert wait, in order
    pub waits: Vec<WaitOutcome>,
}

/// Create, read, update, delete and import for one chaos kind.
///
/// Client, field manager and force-conflicts flag are fixed at construction.
#[derive(Clone)]
pub struct ResourceHandler {
    client: Client,
    kind: ChaosKind,
    api_resource: ApiResource,
    field_manager: String,
    force_conflicts: bool,
    poller: Poller,
}

impl ResourceHandler {
    pub fn new(client: Client, kind: ChaosKind, config: &Config) -> Self {
        Self {
            client,
            kind,
            api_resource: kind.api_resource(),
            field_manager: config.field_manager.clone(),
            force_conflicts: config.force_conflicts,
            poller: Poller::default(),
        }
    }

    /// Use a poller whose waits can be cancelled from outside
    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    pub fn kind(&self) -> ChaosKind {
        self.kind
    }

    fn api(&self, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) if self.kind.is_namespaced() => {
                Api::namespaced_with(self.client.clone(), ns, &self.api_resource)
            }
            _ => Api::all_with(self.client.clone(), &self.api_resource),
        }
    }

    fn describe(&self, namespace: Option<&str>, name: &str) -> String {
        match namespace {
            Some(ns) if self.kind.is_namespaced() => format!("{} {}/{}", self.kind, ns, name),
            _ => format!("{} {}", self.kind, name),
        }
    }

    #[instrument(skip(self, desired, waits), fields(kind = %self.kind, name = ?desired.metadata.name))]
    pub async fn create(&self, desired: &DynamicObject, waits: &[WaitSpec]) -> Result<Applied> {
        self.apply("created", desired, waits).await
    }

    #[instrument(skip(self, desired, waits), fields(kind = %self.kind, name = ?desired.metadata.name))]
    pub async fn update(&self, desired: &DynamicObject, waits: &[WaitSpec]) -> Result<Applied> {
        self.apply("updated", desired, waits).await
    }

    /// Server-side apply, then run every wait in order.
    ///
    /// A wait that times out is reported as `ConditionNotMet`; the applied
    /// object stays in the cluster.
    async fn apply(
        &self,
        action: &'static str,
        desired: &DynamicObject,
        waits: &[WaitSpec],
    ) -> Result<Applied> {
        let Some(name) = desired.metadata.name.as_deref() else {
            return Err(ProviderError::InvalidManifest(
                "metadata.name is required".to_string(),
            ));
        };
        let namespace = desired.metadata.namespace.as_deref();
        let api = self.api(namespace);

        let mut params = PatchParams::apply(&self.field_manager);
        if self.force_conflicts {
            params = params.force();
        }

        let object = api.patch(name, &params, &Patch::Apply(desired)).await?;
        info!("{} {}", self.describe(namespace, name), action);

        let mut outcomes = Vec::with_capacity(waits.len());
        for spec in waits {
            let outcome = self.wait_for(&api, name, spec).await?;
            if outcome.is_timed_out() {
                return Err(ProviderError::ConditionNotMet {
                    resource: self.describe(namespace, name),
                    action,
                    condition: spec.condition.to_string(),
                    timeout: spec.timeout.budget().into(),
                });
            }
            outcomes.push(outcome);
        }

        Ok(Applied {
            object,
            waits: outcomes,
        })
    }

    /// Current state of the object, `None` once it is gone
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn read(&self, namespace: Option<&str>, name: &str) -> Result<Option<DynamicObject>> {
        Ok(self.api(namespace).get_opt(name).await?)
    }

    /// Data source lookup: like `read`, but a missing object is an error
    pub async fn lookup(&self, namespace: Option<&str>, name: &str) -> Result<DynamicObject> {
        self.read(namespace, name)
            .await?
            .ok_or_else(|| ProviderError::ResourceNotFound(self.describe(namespace, name)))
    }

    /// Delete the object and, when configured, wait until it is gone
    #[instrument(skip(self, wait), fields(kind = %self.kind))]
    pub async fn delete(
        &self,
        namespace: Option<&str>,
        name: &str,
        wait: Option<&WaitSpec>,
    ) -> Result<WaitOutcome> {
        let api = self.api(namespace);

        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => info!("{} deleted", self.describe(namespace, name)),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("{} was already deleted", self.describe(namespace, name));
            }
            Err(e) => return Err(e.into()),
        }

        let Some(spec) = wait else {
            return Ok(WaitOutcome::Skipped);
        };

        let outcome = self.wait_for(&api, name, spec).await?;
        if outcome.is_timed_out() {
            return Err(ProviderError::ConditionNotMet {
                resource: self.describe(namespace, name),
                action: "deleted",
                condition: spec.condition.to_string(),
                timeout: spec.timeout.budget().into(),
            });
        }
        Ok(outcome)
    }

    /// Attach an existing object, identified by `namespace/name` or `name`
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn import(&self, id: &str) -> Result<DynamicObject> {
        let (namespace, name) = parse_import_id(id, self.kind.is_namespaced())?;
        self.lookup(namespace.as_deref(), &name).await
    }

    async fn wait_for(
        &self,
        api: &Api<DynamicObject>,
        name: &str,
        spec: &WaitSpec,
    ) -> Result<WaitOutcome> {
        self.poller
            .wait(spec, || fetch_json(api.clone(), name.to_string()))
            .await
    }
}

/// GET the object as JSON; only a 404 counts as "not found"
async fn fetch_json(api: Api<DynamicObject>, name: String) -> Result<Option<Value>> {
    let found = api.get_opt(&name).await?;
    Ok(found.map(serde_json::to_value).transpose()?)
}

/// Split an import identifier into namespace and name
pub fn parse_import_id(id: &str, namespaced: bool) -> Result<(Option<String>, String)> {
    let parts: Vec<&str> = id.split('/').collect();

    match (namespaced, parts.as_slice()) {
        (true, [namespace, name]) if !namespace.is_empty() && !name.is_empty() => {
            Ok((Some(namespace.to_string()), name.to_string()))
        }
        (false, [name]) if !name.is_empty() => Ok((None, name.to_string())),
        (true, _) => Err(ProviderError::InvalidImportId {
            id: id.to_string(),
            expected: "namespace/name",
        }),
        (false, _) => Err(ProviderError::InvalidImportId {
            id: id.to_string(),
            expected: "name",
        }),
    }
}
