// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Catalog of the chaos CRDs the provider can manage.

use crate::constants::groups::{CHAOS_MESH, LITMUS, VERSION};
use crate::error::ProviderError;
use crate::types::pod_chaos::PodChaos;
use kube::discovery::{ApiResource, Scope};
use kube::core::GroupVersionKind;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChaosKind {
    PodChaos,
    NetworkChaos,
    IOChaos,
    StressChaos,
    TimeChaos,
    KernelChaos,
    DNSChaos,
    HTTPChaos,
    JVMChaos,
    BlockChaos,
    AWSChaos,
    GCPChaos,
    AzureChaos,
    PhysicalMachineChaos,
    PhysicalMachine,
    Schedule,
    Workflow,
    WorkflowNode,
    StatusCheck,
    PodNetworkChaos,
    PodIOChaos,
    PodHttpChaos,
    RemoteCluster,
    ChaosEngine,
    ChaosExperiment,
    ChaosResult,
}

impl ChaosKind {
    pub const ALL: &'static [ChaosKind] = &[
        ChaosKind::PodChaos,
        ChaosKind::NetworkChaos,
        ChaosKind::IOChaos,
        ChaosKind::StressChaos,
        ChaosKind::TimeChaos,
        ChaosKind::KernelChaos,
        ChaosKind::DNSChaos,
        ChaosKind::HTTPChaos,
        ChaosKind::JVMChaos,
        ChaosKind::BlockChaos,
        ChaosKind::AWSChaos,
        ChaosKind::GCPChaos,
        ChaosKind::AzureChaos,
        ChaosKind::PhysicalMachineChaos,
        ChaosKind::PhysicalMachine,
        ChaosKind::Schedule,
        ChaosKind::Workflow,
        ChaosKind::WorkflowNode,
        ChaosKind::StatusCheck,
        ChaosKind::PodNetworkChaos,
        ChaosKind::PodIOChaos,
        ChaosKind::PodHttpChaos,
        ChaosKind::RemoteCluster,
        ChaosKind::ChaosEngine,
        ChaosKind::ChaosExperiment,
        ChaosKind::ChaosResult,
    ];

    /// The `kind` field of the custom resource
    pub fn kind(&self) -> &'static str {
        match self {
            ChaosKind::PodChaos => "PodChaos",
            ChaosKind::NetworkChaos => "NetworkChaos",
            ChaosKind::IOChaos => "IOChaos",
            ChaosKind::StressChaos => "StressChaos",
            ChaosKind::TimeChaos => "TimeChaos",
            ChaosKind::KernelChaos => "KernelChaos",
            ChaosKind::DNSChaos => "DNSChaos",
            ChaosKind::HTTPChaos => "HTTPChaos",
            ChaosKind::JVMChaos => "JVMChaos",
            ChaosKind::BlockChaos => "BlockChaos",
            ChaosKind::AWSChaos => "AWSChaos",
            ChaosKind::GCPChaos => "GCPChaos",
            ChaosKind::AzureChaos => "AzureChaos",
            ChaosKind::PhysicalMachineChaos => "PhysicalMachineChaos",
            ChaosKind::PhysicalMachine => "PhysicalMachine",
            ChaosKind::Schedule => "Schedule",
            ChaosKind::Workflow => "Workflow",
            ChaosKind::WorkflowNode => "WorkflowNode",
            ChaosKind::StatusCheck => "StatusCheck",
            ChaosKind::PodNetworkChaos => "PodNetworkChaos",
            ChaosKind::PodIOChaos => "PodIOChaos",
            ChaosKind::PodHttpChaos => "PodHttpChaos",
            ChaosKind::RemoteCluster => "RemoteCluster",
            ChaosKind::ChaosEngine => "ChaosEngine",
            ChaosKind::ChaosExperiment => "ChaosExperiment",
            ChaosKind::ChaosResult => "ChaosResult",
        }
    }

    /// Resource name used in API paths; the chaos kinds are not pluralized
    pub fn plural(&self) -> String {
        match self {
            ChaosKind::PhysicalMachine => "physicalmachines".to_string(),
            ChaosKind::Schedule => "schedules".to_string(),
            ChaosKind::Workflow => "workflows".to_string(),
            ChaosKind::WorkflowNode => "workflownodes".to_string(),
            ChaosKind::StatusCheck => "statuschecks".to_string(),
            ChaosKind::RemoteCluster => "remoteclusters".to_string(),
            ChaosKind::ChaosEngine => "chaosengines".to_string(),
            ChaosKind::ChaosExperiment => "chaosexperiments".to_string(),
            ChaosKind::ChaosResult => "chaosresults".to_string(),
            other => other.kind().to_lowercase(),
        }
    }

    pub fn group(&self) -> &'static str {
        match self {
            ChaosKind::ChaosEngine | ChaosKind::ChaosExperiment | ChaosKind::ChaosResult => LITMUS,
            _ => CHAOS_MESH,
        }
    }

    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group(), VERSION)
    }

    pub fn scope(&self) -> Scope {
        match self {
            ChaosKind::RemoteCluster => Scope::Cluster,
            _ => Scope::Namespaced,
        }
    }

    pub fn is_namespaced(&self) -> bool {
        matches!(self.scope(), Scope::Namespaced)
    }

    /// Resource description for the dynamic API
    pub fn api_resource(&self) -> ApiResource {
        match self {
            ChaosKind::PodChaos => ApiResource::erase::<PodChaos>(&()),
            _ => {
                let gvk = GroupVersionKind::gvk(self.group(), VERSION, self.kind());
                ApiResource::from_gvk_with_plural(&gvk, &self.plural())
            }
        }
    }
}

impl fmt::Display for ChaosKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl FromStr for ChaosKind {
    type Err = ProviderError;

    /// Accepts the kind (any case) or its plural resource name
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim().to_lowercase();
        ChaosKind::ALL
            .iter()
            .copied()
            .find(|k| k.kind().to_lowercase() == wanted || k.plural() == wanted)
            .ok_or_else(|| ProviderError::UnknownKind(name.to_string()))
    }
}
