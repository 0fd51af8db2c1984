// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod lookups and readiness waits

use super::apply::delete_if_exists;
use super::client::{filter_by_prefix, KubeClient};
use crate::constants::durations::{MINUTES_3, MINUTE_1, SECONDS_5};
use crate::error::{Result, SystemTestError};
use k8s_openapi::api::core::v1::Pod;
use kube::{api::ListParams, Api, ResourceExt};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

impl KubeClient {
    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client().clone(), namespace)
    }

    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        Ok(self.pods(namespace).list(&ListParams::default()).await?.items)
    }

    pub async fn list_pods_by_prefix(&self, namespace: &str, prefix: &str) -> Result<Vec<Pod>> {
        Ok(filter_by_prefix(self.list_pods(namespace).await?, prefix))
    }

    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>> {
        Ok(self.pods(namespace).get_opt(name).await?)
    }

    /// First pod whose name starts with `prefix`
    pub async fn get_first_pod_by_prefix(
        &self,
        namespace: &str,
        prefix: &str,
    ) -> Result<Option<Pod>> {
        let pods = self.list_pods_by_prefix(namespace, prefix).await?;
        if pods.len() > 1 {
            warn!(
                "[{}] {} pods match prefix {}, using the first one",
                namespace,
                pods.len(),
                prefix
            );
        }
        Ok(pods.into_iter().next())
    }

    /// Wait until the named pod exists and reports the Ready condition
    #[instrument(skip(self))]
    pub async fn wait_until_pod_ready(&self, namespace: &str, name: &str) -> Result<()> {
        self.wait_for(
            &format!("pod {}/{} to be ready", namespace, name),
            SECONDS_5,
            MINUTES_3,
            || async move {
                let pod = self.get_pod(namespace, name).await?;
                Ok(pod.as_ref().is_some_and(is_pod_ready))
            },
        )
        .await?;
        debug!("[{}] Pod {} is ready", namespace, name);
        Ok(())
    }

    /// Delete the pod and wait for its controller to bring up a ready replacement
    #[instrument(skip(self, pod), fields(pod = %pod.name_any()))]
    pub async fn reload_pod_with_wait(
        &self,
        namespace: &str,
        pod: &Pod,
        prefix: &str,
    ) -> Result<Pod> {
        let siblings = self.sibling_uids(namespace, prefix, pod).await?;
        info!("[{}] Reloading pod {}", namespace, pod.name_any());
        delete_if_exists(&self.pods(namespace), &pod.name_any()).await?;
        self.wait_for_pod_reload(namespace, prefix, pod, &siblings, MINUTE_1)
            .await
    }

    /// UIDs of the other pods with `prefix`, none of which can be the replacement of `old`.
    /// Taken before the change that restarts `old`.
    pub async fn sibling_uids(
        &self,
        namespace: &str,
        prefix: &str,
        old: &Pod,
    ) -> Result<HashSet<String>> {
        let old_uid = old.uid();
        Ok(self
            .list_pods_by_prefix(namespace, prefix)
            .await?
            .iter()
            .filter_map(|pod| pod.uid())
            .filter(|uid| Some(uid) != old_uid.as_ref())
            .collect())
    }

    /// Wait for `old` to be replaced, then for the replacement to be ready.
    ///
    /// A pod keeping the old name (stateful sets) must come back with a new UID. When the
    /// name is gone, the replacement is a pod with `prefix` whose UID is not in `siblings`.
    #[instrument(skip(self, old, siblings), fields(pod = %old.name_any()))]
    pub async fn wait_for_pod_reload(
        &self,
        namespace: &str,
        prefix: &str,
        old: &Pod,
        siblings: &HashSet<String>,
        timeout: Duration,
    ) -> Result<Pod> {
        let old_name = old.name_any();
        let old_uid = old.uid().unwrap_or_default();
        let (old_name, old_uid) = (old_name.as_str(), old_uid.as_str());
        self.wait_for(
            &format!("pod {}/{} to be replaced", namespace, old_name),
            SECONDS_5,
            timeout,
            || async move {
                let pods = self.list_pods_by_prefix(namespace, prefix).await?;
                Ok(replacement_pod(pods, old_name, old_uid, siblings).is_some())
            },
        )
        .await?;

        let pods = self.list_pods_by_prefix(namespace, prefix).await?;
        let reloaded = replacement_pod(pods, old_name, old_uid, siblings)
            .ok_or_else(|| SystemTestError::not_found("Pod", namespace, old_name))?;

        let name = reloaded.name_any();
        info!("[{}] Pod {} replaced by {}", namespace, old_name, name);
        self.wait_until_pod_ready(namespace, &name).await?;
        Ok(reloaded)
    }
}

/// The pod that took over from `old_name`/`old_uid`, ignoring pods in `siblings`
fn replacement_pod(
    pods: Vec<Pod>,
    old_name: &str,
    old_uid: &str,
    siblings: &HashSet<String>,
) -> Option<Pod> {
    if let Some(same_name) = pods.iter().find(|pod| pod.name_any() == old_name) {
        return same_name
            .uid()
            .is_some_and(|uid| uid != old_uid)
            .then(|| same_name.clone());
    }
    pods.into_iter().find(|pod| {
        pod.uid()
            .is_some_and(|uid| uid != old_uid && !siblings.contains(&uid))
    })
}

/// True when the pod carries a `Ready=True` condition
pub fn is_pod_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

/// IP assigned to the pod, once scheduled
pub fn pod_ip(pod: &Pod) -> Option<&str> {
    pod.status.as_ref().and_then(|s| s.pod_ip.as_deref())
}
