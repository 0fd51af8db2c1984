// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use super::apply::{delete_if_exists, upsert, ConflictPolicy};
use super::client::KubeClient;
use crate::constants::durations::{MINUTES_3, SECONDS_2};
use crate::constants::labels::{MANAGED_BY, MANAGED_BY_VALUE};
use crate::error::Result;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ListParams, ObjectMeta},
    Api,
};
use rand::{distributions::Alphanumeric, Rng};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// OpenShift annotation holding the uid range assigned to a namespace
pub const UID_RANGE_ANNOTATION: &str = "openshift.io/sa.scc.uid-range";

impl KubeClient {
    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client().clone())
    }

    /// Create (or replace) a labelled namespace and wait until the API server reports it
    #[instrument(skip(self))]
    pub async fn create_namespace(&self, name: &str) -> Result<Namespace> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(BTreeMap::from([(
                    MANAGED_BY.to_string(),
                    MANAGED_BY_VALUE.to_string(),
                )])),
                ..Default::default()
            },
            ..Default::default()
        };

        info!("Creating namespace {}", name);
        let created = upsert(&self.namespaces(), &namespace, ConflictPolicy::Replace).await?;

        self.wait_for(
            &format!("namespace {} to be created", name),
            SECONDS_2,
            MINUTES_3,
            || self.namespace_exists(name),
        )
        .await?;
        info!("Namespace {} created successfully", name);
        Ok(created)
    }

    /// Delete a namespace and wait until it is gone, tolerating one that is already missing
    #[instrument(skip(self))]
    pub async fn delete_namespace(&self, name: &str) -> Result<()> {
        if !delete_if_exists(&self.namespaces(), name).await? {
            debug!("Namespace {} already deleted", name);
            return Ok(());
        }

        info!("Deleting namespace {}", name);
        self.wait_for(
            &format!("namespace {} to be deleted", name),
            SECONDS_2,
            MINUTES_3,
            || async move { self.namespace_exists(name).await.map(|exists| !exists) },
        )
        .await?;
        info!("Namespace {} deleted", name);
        Ok(())
    }

    pub async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>> {
        Ok(self.namespaces().get_opt(name).await?)
    }

    pub async fn namespace_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_namespace(name).await?.is_some())
    }

    /// Namespaces carrying the given label selector, e.g. `app.kubernetes.io/managed-by=x`
    pub async fn list_namespaces_by_label(&self, selector: &str) -> Result<Vec<Namespace>> {
        let list = self
            .namespaces()
            .list(&ListParams::default().labels(selector))
            .await?;
        Ok(list.items)
    }

    /// Offset `default_user_id` into the uid range OpenShift assigned to the namespace.
    ///
    /// Clusters without uid ranges get `default_user_id` unchanged.
    pub async fn available_user_id(&self, namespace: &str, default_user_id: i64) -> Result<i64> {
        let range = self
            .get_namespace(namespace)
            .await?
            .and_then(|ns| ns.metadata.annotations)
            .and_then(|annotations| annotations.get(UID_RANGE_ANNOTATION).cloned());

        let Some(range) = range else {
            debug!(
                "[{}] No {} annotation, using default user id {}",
                namespace, UID_RANGE_ANNOTATION, default_user_id
            );
            return Ok(default_user_id);
        };
        match parse_uid_range(&range) {
            Some(start) => Ok(start + default_user_id),
            None => {
                warn!("[{}] Unparseable uid range '{}'", namespace, range);
                Ok(default_user_id)
            }
        }
    }
}

/// Parse the start of a `<start>/<size>` uid range
pub fn parse_uid_range(range: &str) -> Option<i64> {
    range.split('/').next()?.trim().parse().ok()
}

/// `<prefix>-<6 random lowercase alphanumerics>`, or the bare prefix when randomization is disabled
pub fn random_namespace_name(prefix: &str, disabled: bool) -> String {
    if disabled {
        return prefix.to_string();
    }
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("{}-{}", prefix, suffix)
}
