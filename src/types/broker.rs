// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::artemis::{HEADLESS_SERVICE_SUFFIX, STATEFULSET_SUFFIX};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "broker.amq.io",
    version = "v1beta1",
    kind = "ActiveMQArtemis",
    plural = "activemqartemises"
)]
#[kube(namespaced)]
#[kube(status = "ActiveMQArtemisStatus")]
#[serde(rename_all = "camelCase")]
pub struct ActiveMQArtemisSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_plan: Option<DeploymentPlan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptors: Vec<Acceptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrades: Option<Upgrades>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<Console>,
    /// Spec fields the harness does not model, kept so file-based brokers round-trip
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_migration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_login: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Broker-side listener for one or more messaging protocols
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Acceptor {
    pub name: String,
    /// Comma separated protocol list, e.g. `amqp,openwire`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_secret: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Upgrades {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Console {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMQArtemisStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_status: Option<PodStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActiveMQArtemis {
    /// Declared replica count, the operator defaults to a single broker
    pub fn size(&self) -> i32 {
        self.spec
            .deployment_plan
            .as_ref()
            .and_then(|p| p.size)
            .unwrap_or(1)
    }

    /// Name of the stateful set the operator creates for this broker
    pub fn statefulset_name(&self) -> String {
        format!("{}{}", self.name_any(), STATEFULSET_SUFFIX)
    }

    pub fn headless_service_name(&self) -> String {
        format!("{}{}", self.name_any(), HEADLESS_SERVICE_SUFFIX)
    }

    /// Check the operator reported the broker as ready
    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.condition_type == "Ready" && c.status == "True")
            })
    }

    pub fn acceptor(&self, name: &str) -> Option<&Acceptor> {
        self.spec.acceptors.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_BROKER: &str = r#"
apiVersion: broker.amq.io/v1beta1
kind: ActiveMQArtemis
metadata:
  name: artemis-broker
spec:
  deploymentPlan:
    size: 1
    image: placeholder
    journalType: nio
  acceptors:
    - name: amqp
      protocols: amqp
      port: 5672
      connectionsAllowed: 5
  adminUser: admin
"#;

    fn make_broker(name: &str, size: Option<i32>, status: Option<ActiveMQArtemisStatus>) -> ActiveMQArtemis {
        let mut broker = ActiveMQArtemis::new(
            name,
            ActiveMQArtemisSpec {
                deployment_plan: Some(DeploymentPlan {
                    size,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        broker.status = status;
        broker
    }

    #[test]
    fn test_parse_preserves_unknown_fields() {
        let broker: ActiveMQArtemis = serde_yaml::from_str(SINGLE_BROKER).unwrap();

        assert_eq!(broker.name_any(), "artemis-broker");
        assert_eq!(broker.size(), 1);
        assert_eq!(broker.spec.extra.get("adminUser").unwrap(), "admin");

        let plan = broker.spec.deployment_plan.as_ref().unwrap();
        assert_eq!(plan.extra.get("journalType").unwrap(), "nio");

        let value = serde_json::to_value(&broker).unwrap();
        assert_eq!(value["spec"]["adminUser"], "admin");
        assert_eq!(value["spec"]["acceptors"][0]["connectionsAllowed"], 5);
        assert_eq!(value["apiVersion"], "broker.amq.io/v1beta1");
        assert_eq!(value["kind"], "ActiveMQArtemis");
    }

    #[test]
    fn test_size_defaults_to_one() {
        assert_eq!(make_broker("b", None, None).size(), 1);
        assert_eq!(make_broker("b", Some(3), None).size(), 3);

        let no_plan = ActiveMQArtemis::new("b", ActiveMQArtemisSpec::default());
        assert_eq!(no_plan.size(), 1);
    }

    #[test]
    fn test_derived_names() {
        let broker = make_broker("my-broker", None, None);

        assert_eq!(broker.statefulset_name(), "my-broker-ss");
        assert_eq!(broker.headless_service_name(), "my-broker-hdls-svc");
    }

    #[test]
    fn test_is_ready_with_ready_condition() {
        let broker = make_broker(
            "b",
            None,
            Some(ActiveMQArtemisStatus {
                pod_status: None,
                conditions: Some(vec![
                    Condition {
                        condition_type: "Deployed".to_string(),
                        status: "True".to_string(),
                        reason: None,
                        message: None,
                    },
                    Condition {
                        condition_type: "Ready".to_string(),
                        status: "True".to_string(),
                        reason: None,
                        message: None,
                    },
                ]),
            }),
        );

        assert!(broker.is_ready());
    }

    #[test]
    fn test_is_ready_without_status() {
        assert!(!make_broker("b", None, None).is_ready());
    }

    #[test]
    fn test_acceptor_lookup() {
        let broker: ActiveMQArtemis = serde_yaml::from_str(SINGLE_BROKER).unwrap();

        assert_eq!(broker.acceptor("amqp").unwrap().port, Some(5672));
        assert!(broker.acceptor("missing").is_none());
    }
}
