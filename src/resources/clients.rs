// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ResourceManager, TrackedRef};
use crate::constants::clients::{DEPLOYMENT_NAME, SECRETS_MOUNT_DIR};
use crate::constants::labels::APP;
use crate::error::{Result, SystemTestError};
use crate::kubernetes::{delete_if_exists, upsert, ConflictPolicy};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, Pod, PodSpec, PodTemplateSpec, SecretVolumeSource, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::Api;
use std::collections::BTreeMap;
use tracing::info;

/// Long-running deployment the messaging clients are executed in, with every secret in
/// `secrets` mounted read-only at `/etc/<secret>`
pub fn clients_deployment(namespace: &str, image: &str, secrets: &[&str]) -> Deployment {
    let labels = BTreeMap::from([(APP.to_string(), DEPLOYMENT_NAME.to_string())]);

    let volumes: Vec<Volume> = secrets
        .iter()
        .map(|secret| Volume {
            name: secret.to_string(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(secret.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();
    let mounts: Vec<VolumeMount> = secrets
        .iter()
        .map(|secret| VolumeMount {
            name: secret.to_string(),
            mount_path: format!("{}/{}", SECRETS_MOUNT_DIR, secret),
            read_only: Some(true),
            ..Default::default()
        })
        .collect();

    Deployment {
        metadata: ObjectMeta {
            name: Some(DEPLOYMENT_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: DEPLOYMENT_NAME.to_string(),
                        image: Some(image.to_string()),
                        command: Some(vec!["sleep".to_string(), "infinity".to_string()]),
                        image_pull_policy: Some("IfNotPresent".to_string()),
                        volume_mounts: (!mounts.is_empty()).then_some(mounts),
                        ..Default::default()
                    }],
                    volumes: (!volumes.is_empty()).then_some(volumes),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl ResourceManager {
    /// Deploy the clients container and return its running pod
    pub async fn deploy_clients_container(&mut self, namespace: &str) -> Result<Pod> {
        self.deploy_clients(namespace, &[]).await
    }

    /// Deploy the clients container with `secrets` mounted under `/etc`
    pub async fn deploy_secured_clients_container(
        &mut self,
        namespace: &str,
        secrets: &[&str],
    ) -> Result<Pod> {
        self.deploy_clients(namespace, secrets).await
    }

    async fn deploy_clients(&mut self, namespace: &str, secrets: &[&str]) -> Result<Pod> {
        let deployment = clients_deployment(namespace, &self.environment.clients_image, secrets);
        let api: Api<Deployment> = Api::namespaced(self.kube.client().clone(), namespace);
        upsert(&api, &deployment, ConflictPolicy::Replace).await?;
        self.deployed
            .track_clients(TrackedRef::new(namespace, DEPLOYMENT_NAME));

        self.kube
            .wait_for_deployment_ready(namespace, DEPLOYMENT_NAME)
            .await?;
        let pod = self
            .kube
            .get_first_pod_by_prefix(namespace, DEPLOYMENT_NAME)
            .await?
            .ok_or_else(|| SystemTestError::not_found("Pod", namespace, DEPLOYMENT_NAME))?;
        info!(
            "[{}] Clients container {} is running",
            namespace,
            pod.metadata.name.as_deref().unwrap_or_default()
        );
        Ok(pod)
    }

    pub async fn undeploy_clients_container(&mut self, namespace: &str) -> Result<()> {
        let api: Api<Deployment> = Api::namespaced(self.kube.client().clone(), namespace);
        delete_if_exists(&api, DEPLOYMENT_NAME).await?;
        self.deployed
            .untrack_clients(&TrackedRef::new(namespace, DEPLOYMENT_NAME));
        self.kube
            .wait_for_deployment_deleted(namespace, DEPLOYMENT_NAME)
            .await?;
        info!("[{}] Clients container undeployed", namespace);
        Ok(())
    }
}
