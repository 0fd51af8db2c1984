// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Broker security configuration. The nested JAAS and role settings are passed through
/// as-is since tests only ever load them from files.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "broker.amq.io",
    version = "v1beta1",
    kind = "ActiveMQArtemisSecurity",
    plural = "activemqartemissecurities"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMQArtemisSecuritySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_modules: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_domains: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_to_cr_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
