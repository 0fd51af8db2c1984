// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client construction and the shared façade type.

use crate::config::Environment;
use crate::error::{Result, SystemTestError};
use crate::wait;
use kube::{config::KubeConfigOptions, Client, Config as KConfig, ResourceExt};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Typed access to the cluster resources the system tests care about.
///
/// Getters return `Ok(None)` for objects that do not exist; every other API failure is
/// returned as an error. Waits started through this client stop when its cancellation
/// token fires.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    cancel: CancellationToken,
}

impl KubeClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Connect using the kubeconfig context selected by the environment
    #[instrument(skip(environment), fields(context = ?environment.kube_context))]
    pub async fn connect(environment: &Environment) -> Result<Self> {
        let config = match &environment.kube_context {
            Some(context) => {
                debug!("Using kubeconfig context {}", context);
                let options = KubeConfigOptions {
                    context: Some(context.clone()),
                    ..Default::default()
                };
                KConfig::from_kubeconfig(&options).await.map_err(|e| {
                    SystemTestError::KubeconfigError(format!(
                        "Failed to load context {}: {}",
                        context, e
                    ))
                })?
            }
            None => KConfig::infer().await.map_err(|e| {
                SystemTestError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?,
        };
        let cluster_url = config.cluster_url.to_string();

        let client = Client::try_from(config).map_err(|e| {
            SystemTestError::KubeconfigError(format!("Failed to create client: {}", e))
        })?;

        let version = client.apiserver_version().await?;
        info!(
            "Created Kubernetes client: {}.{} - {}",
            version.major, version.minor, cluster_url
        );

        Ok(Self::new(client))
    }

    /// Share `token` so that cancelling it aborts every pending wait of this client
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Poll `check` with this client's cancellation token
    pub async fn wait_for<F, Fut>(
        &self,
        description: &str,
        interval: Duration,
        timeout: Duration,
        check: F,
    ) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        wait::wait_for(description, interval, timeout, &self.cancel, check).await
    }

    /// Cancellable fixed delay
    pub async fn pause(&self, duration: Duration) -> Result<()> {
        wait::pause(duration, &self.cancel).await
    }
}

/// Keep only the objects whose name starts with `prefix`
pub fn filter_by_prefix<K: ResourceExt>(items: Vec<K>, prefix: &str) -> Vec<K> {
    items
        .into_iter()
        .filter(|item| item.name_any().starts_with(prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Pod;
    use kube::api::ObjectMeta;

    fn make_pod(name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_by_prefix() {
        let pods = vec![
            make_pod("artemis-broker-ss-0"),
            make_pod("artemis-broker-ss-1"),
            make_pod("systemtests-clients-5f7c"),
        ];

        let filtered = filter_by_prefix(pods, "artemis-broker");

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|p| p.name_any().starts_with("artemis-broker")));
    }

    #[test]
    fn test_filter_by_prefix_no_match() {
        let filtered = filter_by_prefix(vec![make_pod("other")], "artemis");
        assert!(filtered.is_empty());
    }
}
