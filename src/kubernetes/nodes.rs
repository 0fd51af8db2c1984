// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::client::KubeClient;
use crate::constants::labels::{NODE_ROLE_MASTER, NODE_ROLE_WORKER};
use crate::error::Result;
use k8s_openapi::api::core::v1::Node;
use kube::{api::ListParams, Api};

impl KubeClient {
    fn nodes(&self) -> Api<Node> {
        Api::all(self.client().clone())
    }

    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.nodes().list(&ListParams::default()).await?.items)
    }

    pub async fn list_worker_nodes(&self) -> Result<Vec<Node>> {
        self.list_nodes_with_label(NODE_ROLE_WORKER).await
    }

    pub async fn list_master_nodes(&self) -> Result<Vec<Node>> {
        self.list_nodes_with_label(NODE_ROLE_MASTER).await
    }

    async fn list_nodes_with_label(&self, label: &str) -> Result<Vec<Node>> {
        Ok(self
            .nodes()
            .list(&ListParams::default().labels(label))
            .await?
            .items)
    }
}

/// Internal IP of a node, falling back to its first reported address
pub fn node_address(node: &Node) -> Option<&str> {
    let addresses = node.status.as_ref()?.addresses.as_ref()?;
    addresses
        .iter()
        .find(|a| a.type_ == "InternalIP")
        .or_else(|| addresses.first())
        .map(|a| a.address.as_str())
}
