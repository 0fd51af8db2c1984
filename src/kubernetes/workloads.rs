// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Stateful set and deployment lookups

use super::client::{filter_by_prefix, KubeClient};
use crate::constants::durations::{MINUTES_3, SECONDS_5};
use crate::error::{Result, SystemTestError};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use kube::{api::ListParams, Api};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

impl KubeClient {
    pub async fn get_statefulset(&self, namespace: &str, name: &str) -> Result<Option<StatefulSet>> {
        let api: Api<StatefulSet> = Api::namespaced(self.client().clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    pub async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Option<Deployment>> {
        let api: Api<Deployment> = Api::namespaced(self.client().clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    /// Find a deployment by name in any namespace
    pub async fn get_deployment_any_namespace(&self, name: &str) -> Result<Deployment> {
        let api: Api<Deployment> = Api::all(self.client().clone());
        let list = api
            .list(&ListParams::default().fields(&format!("metadata.name={}", name)))
            .await?;
        list.items
            .into_iter()
            .next()
            .ok_or_else(|| SystemTestError::not_found("Deployment", "*", name))
    }

    pub async fn list_deployments_by_prefix(
        &self,
        namespace: &str,
        prefix: &str,
    ) -> Result<Vec<Deployment>> {
        let api: Api<Deployment> = Api::namespaced(self.client().clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        Ok(filter_by_prefix(list.items, prefix))
    }

    /// Check the named deployment exists and has all its replicas ready
    pub async fn is_deployment_ready(&self, namespace: &str, name: &str) -> Result<bool> {
        Ok(self
            .get_deployment(namespace, name)
            .await?
            .as_ref()
            .is_some_and(is_deployment_available))
    }

    #[instrument(skip(self))]
    pub async fn wait_for_deployment_ready(&self, namespace: &str, name: &str) -> Result<()> {
        self.wait_for(
            &format!("deployment {}/{} to be ready", namespace, name),
            SECONDS_5,
            MINUTES_3,
            || self.is_deployment_ready(namespace, name),
        )
        .await?;
        debug!("[{}] Deployment {} is ready", namespace, name);
        Ok(())
    }

    /// Wait until the named deployment no longer exists
    #[instrument(skip(self))]
    pub async fn wait_for_deployment_deleted(&self, namespace: &str, name: &str) -> Result<()> {
        self.wait_for(
            &format!("deployment {}/{} to be deleted", namespace, name),
            SECONDS_5,
            MINUTES_3,
            || async move { Ok(self.get_deployment(namespace, name).await?.is_none()) },
        )
        .await
    }
}

/// A stateful set is ready once `readyReplicas` is reported and matches the desired count
pub fn is_statefulset_ready(statefulset: &StatefulSet) -> bool {
    let desired = statefulset
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    statefulset
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .is_some_and(|ready| ready == desired)
}

pub fn is_deployment_available(deployment: &Deployment) -> bool {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    deployment
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .is_some_and(|ready| ready == desired)
}

/// Label selector of a deployment, used to find its pods
pub fn deployment_selector(deployment: &Deployment) -> BTreeMap<String, String> {
    deployment
        .spec
        .as_ref()
        .and_then(|s| s.selector.match_labels.clone())
        .unwrap_or_default()
}
