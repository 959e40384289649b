// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "chaos-mesh.org", version = "v1alpha1", kind = "PodChaos", plural = "podchaos")]
#[kube(namespaced)]
#[kube(status = "PodChaosStatus")]
#[serde(rename_all = "camelCase")]
pub struct PodChaosSpec {
    /// One of `pod-failure`, `pod-kill` or `container-kill`
    pub action: String,
    /// One of `one`, `all`, `fixed`, `fixed-percent` or `random-max-percent`
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub selector: PodSelector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selectors: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_selectors: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pods: Option<BTreeMap<String, Vec<String>>>,
}

impl PodChaos {
    /// Check if chaos has been injected into every selected pod
    pub fn is_all_injected(&self) -> bool {
        self.condition_is_true("AllInjected")
    }

    /// Check if the experiment is paused
    pub fn is_paused(&self) -> bool {
        self.condition_is_true("Paused")
    }

    /// The phase the controller is driving the experiment towards
    pub fn desired_phase(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.experiment.as_ref())
            .and_then(|e| e.desired_phase.as_deref())
    }

    /// One-line description of the experiment state
    pub fn summary(&self) -> String {
        let injected = self
            .status
            .as_ref()
            .and_then(|s| s.experiment.as_ref())
            .and_then(|e| e.container_records.as_ref())
            .map(|records| records.iter().filter(|r| r.phase == "Injected").count())
            .unwrap_or(0);

        format!(
            "action={} desiredPhase={} injected={} allInjected={} paused={}",
            self.spec.action,
            self.desired_phase().unwrap_or("unknown"),
            injected,
            self.is_all_injected(),
            self.is_paused()
        )
    }

    fn condition_is_true(&self, condition_type: &str) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.condition_type == condition_type && c.status == "True")
            })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodChaosStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<ChaosCondition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment: Option<ExperimentStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChaosCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_records: Option<Vec<ContainerRecord>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRecord {
    pub id: String,
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_key: Option<String>,
    #[serde(default)]
    pub injected_count: i64,
    #[serde(default)]
    pub recovered_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn make_pod_chaos(status: Option<PodChaosStatus>) -> PodChaos {
        PodChaos {
            metadata: ObjectMeta {
                name: Some("kill-nginx".to_string()),
                namespace: Some("chaos-testing".to_string()),
                ..Default::default()
            },
            spec: PodChaosSpec {
                action: "pod-kill".to_string(),
                mode: "one".to_string(),
                ..Default::default()
            },
            status,
        }
    }

    fn condition(condition_type: &str, status: &str) -> ChaosCondition {
        ChaosCondition {
            condition_type: condition_type.to_string(),
            status: status.to_string(),
            reason: None,
        }
    }

    #[test]
    fn test_is_all_injected() {
        let chaos = make_pod_chaos(Some(PodChaosStatus {
            conditions: Some(vec![condition("Selected", "True"), condition("AllInjected", "True")]),
            experiment: None,
        }));

        assert!(chaos.is_all_injected());
        assert!(!chaos.is_paused());
    }

    #[test]
    fn test_is_all_injected_false() {
        let chaos = make_pod_chaos(Some(PodChaosStatus {
            conditions: Some(vec![condition("AllInjected", "False")]),
            experiment: None,
        }));

        assert!(!chaos.is_all_injected());
    }

    #[test]
    fn test_no_status() {
        let chaos = make_pod_chaos(None);

        assert!(!chaos.is_all_injected());
        assert_eq!(chaos.desired_phase(), None);
        assert_eq!(
            chaos.summary(),
            "action=pod-kill desiredPhase=unknown injected=0 allInjected=false paused=false"
        );
    }

    #[test]
    fn test_summary_counts_injected_records() {
        let chaos = make_pod_chaos(Some(PodChaosStatus {
            conditions: Some(vec![condition("AllInjected", "True")]),
            experiment: Some(ExperimentStatus {
                desired_phase: Some("Run".to_string()),
                container_records: Some(vec![
                    ContainerRecord {
                        id: "chaos-testing/nginx-1".to_string(),
                        phase: "Injected".to_string(),
                        selector_key: Some(".".to_string()),
                        injected_count: 1,
                        recovered_count: 0,
                    },
                    ContainerRecord {
                        id: "chaos-testing/nginx-2".to_string(),
                        phase: "Not Injected".to_string(),
                        selector_key: None,
                        injected_count: 0,
                        recovered_count: 0,
                    },
                ]),
            }),
        }));

        assert_eq!(chaos.desired_phase(), Some("Run"));
        assert_eq!(
            chaos.summary(),
            "action=pod-kill desiredPhase=Run injected=1 allInjected=true paused=false"
        );
    }

    #[test]
    fn test_deserialize_from_cluster_json() {
        let chaos: PodChaos = serde_json::from_value(serde_json::json!({
            "apiVersion": "chaos-mesh.org/v1alpha1",
            "kind": "PodChaos",
            "metadata": {"name": "kill-nginx", "namespace": "chaos-testing"},
            "spec": {
                "action": "pod-kill",
                "mode": "fixed-percent",
                "value": "50",
                "selector": {"labelSelectors": {"app": "nginx"}}
            },
            "status": {
                "conditions": [{"type": "Paused", "status": "True"}],
                "experiment": {"desiredPhase": "Stop"}
            }
        }))
        .unwrap();

        assert_eq!(chaos.spec.value.as_deref(), Some("50"));
        assert!(chaos.is_paused());
        assert_eq!(chaos.desired_phase(), Some("Stop"));
    }
}
