// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Installing and removing the ArtemisCloud cluster operator.
//!
//! Two install methods exist: applying the operator manifests from a directory
//! ([`FileInstallation`]) or subscribing through the Operator Lifecycle Manager
//! ([`OlmInstallation`]). Both end with the operator deployment ready in its namespace.

pub mod file;
pub mod olm;

pub use file::FileInstallation;
pub use olm::OlmInstallation;

use crate::error::Result;
use crate::kubernetes::KubeClient;
use tracing::info;

#[derive(Debug, Clone)]
pub enum Installation {
    File(FileInstallation),
    Olm(OlmInstallation),
}

/// A cluster operator deployed into one namespace, watching itself or a set of namespaces
#[derive(Debug, Clone)]
pub struct ClusterOperator {
    namespace: String,
    namespaced: bool,
    watched_namespaces: Vec<String>,
    installation: Installation,
}

impl ClusterOperator {
    pub fn new(
        namespace: &str,
        namespaced: bool,
        watched_namespaces: Vec<String>,
        installation: Installation,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            namespaced,
            watched_namespaces,
            installation,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_namespaced(&self) -> bool {
        self.namespaced
    }

    pub fn watched_namespaces(&self) -> &[String] {
        &self.watched_namespaces
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    pub fn deployment_name(&self) -> &str {
        match &self.installation {
            Installation::File(file) => file.deployment_name(),
            Installation::Olm(_) => crate::constants::operator::DEPLOYMENT_NAME,
        }
    }

    /// Value of `WATCH_NAMESPACE` for this operator
    pub fn watch_namespace(&self) -> String {
        watch_namespace_value(&self.namespace, self.namespaced, &self.watched_namespaces)
    }

    pub async fn deploy(&mut self, kube: &KubeClient, wait: bool) -> Result<()> {
        info!(
            "[{}] Deploying cluster operator (watching '{}')",
            self.namespace,
            self.watch_namespace()
        );
        let watch = self.watch_namespace();
        match &mut self.installation {
            Installation::File(file) => {
                file.deploy(kube, &self.namespace, self.namespaced, &watch)
                    .await?
            }
            Installation::Olm(olm) => {
                olm.deploy(kube, &self.namespace, self.namespaced, &self.watched_namespaces)
                    .await?
            }
        }

        if wait {
            kube.wait_for_deployment_ready(&self.namespace, self.deployment_name())
                .await?;
        }
        info!("[{}] Cluster operator deployed", self.namespace);
        Ok(())
    }

    pub async fn undeploy(&mut self, kube: &KubeClient, wait: bool) -> Result<()> {
        info!("[{}] Undeploying cluster operator", self.namespace);
        match &mut self.installation {
            Installation::File(file) => file.undeploy(kube, &self.namespace).await?,
            Installation::Olm(olm) => olm.undeploy(kube, &self.namespace).await?,
        }

        if wait {
            kube.wait_for_deployment_deleted(&self.namespace, self.deployment_name())
                .await?;
        }
        info!("[{}] Cluster operator undeployed", self.namespace);
        Ok(())
    }
}

/// Own namespace when namespaced, the watched list otherwise, `*` for every namespace
pub fn watch_namespace_value(namespace: &str, namespaced: bool, watched: &[String]) -> String {
    if namespaced {
        namespace.to_string()
    } else if watched.is_empty() {
        "*".to_string()
    } else {
        watched.join(",")
    }
}
