// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ResourceManager, TrackedRef};
use crate::error::Result;
use crate::kubernetes::{delete_if_exists, load_yaml_file, upsert, ConflictPolicy};
use crate::types::ActiveMQArtemisSecurity;
use kube::{Api, ResourceExt};
use std::path::Path;
use tracing::info;

impl ResourceManager {
    fn securities(&self, namespace: &str) -> Api<ActiveMQArtemisSecurity> {
        Api::namespaced(self.kube.client().clone(), namespace)
    }

    pub async fn create_artemis_security(
        &mut self,
        namespace: &str,
        mut security: ActiveMQArtemisSecurity,
    ) -> Result<ActiveMQArtemisSecurity> {
        security.metadata.namespace = Some(namespace.to_string());
        let security =
            upsert(&self.securities(namespace), &security, ConflictPolicy::Replace).await?;
        info!(
            "[{}] Created ActiveMQArtemisSecurity {}",
            namespace,
            security.name_any()
        );
        self.deployed.track_security(TrackedRef::of(namespace, &security));
        Ok(security)
    }

    pub async fn create_artemis_security_from_file(
        &mut self,
        namespace: &str,
        path: &Path,
    ) -> Result<ActiveMQArtemisSecurity> {
        let security: ActiveMQArtemisSecurity = load_yaml_file(path)?;
        self.create_artemis_security(namespace, security).await
    }

    pub async fn delete_artemis_security(
        &mut self,
        namespace: &str,
        security: &ActiveMQArtemisSecurity,
    ) -> Result<()> {
        delete_if_exists(&self.securities(namespace), &security.name_any()).await?;
        info!(
            "[{}] Deleted ActiveMQArtemisSecurity {}",
            namespace,
            security.name_any()
        );
        self.deployed.untrack_security(&TrackedRef::of(namespace, security));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tests::manager;
    use crate::test_utils::MockService;

    const SECURITIES: &str =
        "/apis/broker.amq.io/v1beta1/namespaces/smoke-tests-abc123/activemqartemissecurities";

    #[tokio::test]
    async fn test_create_security_from_file_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("security.yaml");
        std::fs::write(
            &path,
            "apiVersion: broker.amq.io/v1beta1\nkind: ActiveMQArtemisSecurity\nmetadata:\n  name: ex-prop\nspec:\n  applyToCrNames: [artemis-broker]\n",
        )
        .unwrap();
        let created: ActiveMQArtemisSecurity = load_yaml_file(&path).unwrap();
        let mock = MockService::new()
            .on_get(&format!("{}/ex-prop", SECURITIES), 404, "")
            .on_post(SECURITIES, 201, &serde_json::to_string(&created).unwrap());
        let mut manager = manager(&mock);

        let security = manager
            .create_artemis_security_from_file("smoke-tests-abc123", &path)
            .await
            .unwrap();

        assert_eq!(security.name_any(), "ex-prop");
        assert_eq!(
            manager.deployed().securities,
            vec![TrackedRef::new("smoke-tests-abc123", "ex-prop")]
        );
        let post = mock.last_request("POST", SECURITIES).unwrap();
        assert!(post.body.contains("\"namespace\":\"smoke-tests-abc123\""));
    }
}
