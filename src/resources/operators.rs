// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::ResourceManager;
use crate::config::InstallMethod;
use crate::error::Result;
use crate::operator::{file, ClusterOperator, FileInstallation, Installation, OlmInstallation};
use tracing::{info, warn};

impl ResourceManager {
    /// Installation configured by the environment, using `channel` and `index_image` for OLM
    /// when given
    fn installation(&self, channel: Option<&str>, index_image: Option<&str>) -> Installation {
        let env = &self.environment;
        match env.install_method {
            InstallMethod::File => Installation::File(FileInstallation::new(
                env.operator_install_dir.clone(),
                env.operator_image.clone(),
            )),
            InstallMethod::Olm => Installation::Olm(OlmInstallation::new(
                &env.olm_package,
                channel.unwrap_or(&env.olm_channel),
                index_image
                    .map(str::to_string)
                    .or_else(|| env.olm_index_image.clone()),
            )),
        }
    }

    /// Deploy an operator watching only its own namespace
    pub async fn deploy_cluster_operator(&mut self, namespace: &str) -> Result<Option<ClusterOperator>> {
        let installation = self.installation(None, None);
        self.deploy_operator(namespace, true, Vec::new(), installation)
            .await
    }

    /// Deploy an operator watching `watched` (every namespace when empty)
    pub async fn deploy_cluster_operator_clustered(
        &mut self,
        namespace: &str,
        watched: Vec<String>,
    ) -> Result<Option<ClusterOperator>> {
        let installation = self.installation(None, None);
        self.deploy_operator(namespace, false, watched, installation)
            .await
    }

    /// Deploy an operator through OLM from the given channel and optional index image.
    ///
    /// Only honoured when the environment selects OLM installs.
    pub async fn deploy_cluster_operator_olm(
        &mut self,
        namespace: &str,
        watched: Vec<String>,
        channel: &str,
        index_image: Option<&str>,
    ) -> Result<Option<ClusterOperator>> {
        if !self.environment.is_olm_installation() {
            warn!(
                "[{}] Not an OLM installation, skipping OLM operator deployment",
                namespace
            );
            return Ok(None);
        }
        let installation = self.installation(Some(channel), index_image);
        let namespaced = watched.is_empty();
        self.deploy_operator(namespace, namespaced, watched, installation)
            .await
    }

    async fn deploy_operator(
        &mut self,
        namespace: &str,
        namespaced: bool,
        watched: Vec<String>,
        installation: Installation,
    ) -> Result<Option<ClusterOperator>> {
        if !self.environment.operator_managed {
            warn!("[{}] Cluster operator is not managed by the tests, not deploying", namespace);
            return Ok(None);
        }
        if self.deployed.operator(namespace).is_some() {
            warn!("[{}] Cluster operator already deployed", namespace);
        }

        let mut operator = ClusterOperator::new(namespace, namespaced, watched, installation);
        let deployed = operator.deploy(&self.kube, true).await;
        // Tracked even on failure so partially applied manifests are torn down
        self.deployed.track_operator(operator.clone());
        deployed?;
        Ok(Some(operator))
    }

    pub async fn undeploy_cluster_operator(&mut self, operator: &ClusterOperator) -> Result<()> {
        if !self.environment.operator_managed {
            warn!(
                "[{}] Cluster operator is not managed by the tests, not undeploying",
                operator.namespace()
            );
            return Ok(());
        }
        let mut operator = self
            .deployed
            .untrack_operator(operator.namespace())
            .unwrap_or_else(|| operator.clone());
        operator.undeploy(&self.kube, true).await
    }

    /// Install the Artemis CRDs from the operator install directory
    pub async fn deploy_operator_crds(&self) -> Result<()> {
        if !self.environment.operator_managed || self.environment.is_olm_installation() {
            info!("CRDs are not managed by the tests, skipping");
            return Ok(());
        }
        file::deploy_crds(&self.kube, &self.environment.operator_install_dir).await?;
        self.kube.wait_for_artemis_crds().await
    }

    pub async fn undeploy_operator_crds(&self) -> Result<()> {
        if !self.environment.operator_managed || self.environment.is_olm_installation() {
            info!("CRDs are not managed by the tests, skipping");
            return Ok(());
        }
        file::undeploy_crds(&self.kube, &self.environment.operator_install_dir).await
    }
}
