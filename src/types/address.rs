// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "broker.amq.io",
    version = "v1beta1",
    kind = "ActiveMQArtemisAddress",
    plural = "activemqartemisaddresses"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMQArtemisAddressSpec {
    pub address_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    /// `anycast` or `multicast`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ActiveMQArtemisAddress {
    pub fn address_name(&self) -> &str {
        &self.spec.address_name
    }

    /// Queue bound to the address, the address name itself when none was declared
    pub fn queue_name(&self) -> &str {
        self.spec
            .queue_name
            .as_deref()
            .filter(|q| !q.is_empty())
            .unwrap_or(&self.spec.address_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_queue_file() {
        let address: ActiveMQArtemisAddress = serde_yaml::from_str(
            r#"
apiVersion: broker.amq.io/v1beta1
kind: ActiveMQArtemisAddress
metadata:
  name: my-address
spec:
  addressName: myAddress
  queueName: myQueue
  routingType: anycast
  removeFromBrokerOnDelete: true
"#,
        )
        .unwrap();

        assert_eq!(address.address_name(), "myAddress");
        assert_eq!(address.queue_name(), "myQueue");
        assert_eq!(address.spec.routing_type.as_deref(), Some("anycast"));
        assert_eq!(
            address.spec.extra.get("removeFromBrokerOnDelete"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_queue_name_falls_back_to_address() {
        let address = ActiveMQArtemisAddress::new(
            "lonely",
            ActiveMQArtemisAddressSpec {
                address_name: "lonely".to_string(),
                queue_name: Some(String::new()),
                ..Default::default()
            },
        );

        assert_eq!(address.queue_name(), "lonely");
    }
}
