// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ResourceManager, TrackedRef};
use crate::constants::durations::ADDRESS_SETTLE;
use crate::error::Result;
use crate::kubernetes::{delete_if_exists, load_yaml_file, upsert, ConflictPolicy};
use crate::types::{ActiveMQArtemisAddress, ActiveMQArtemisAddressSpec};
use kube::{Api, ResourceExt};
use std::path::Path;
use tracing::{info, instrument};

/// Address CR named `<address>-<queue>`, or `<address>` with an identically named queue
/// when `queue` is empty
pub fn address_resource(address: &str, queue: &str, routing_type: &str) -> ActiveMQArtemisAddress {
    let (name, queue) = if queue.is_empty() {
        (address.to_string(), address)
    } else {
        (format!("{}-{}", address, queue), queue)
    };
    ActiveMQArtemisAddress::new(
        &name,
        ActiveMQArtemisAddressSpec {
            address_name: address.to_string(),
            queue_name: Some(queue.to_string()),
            routing_type: Some(routing_type.to_string()),
            ..Default::default()
        },
    )
}

impl ResourceManager {
    fn addresses(&self, namespace: &str) -> Api<ActiveMQArtemisAddress> {
        Api::namespaced(self.kube.client().clone(), namespace)
    }

    pub async fn create_artemis_address(
        &mut self,
        namespace: &str,
        address: &str,
        queue: &str,
        routing_type: &str,
    ) -> Result<ActiveMQArtemisAddress> {
        self.apply_address(namespace, address_resource(address, queue, routing_type))
            .await
    }

    pub async fn create_artemis_address_from_file(
        &mut self,
        namespace: &str,
        path: &Path,
    ) -> Result<ActiveMQArtemisAddress> {
        let address: ActiveMQArtemisAddress = load_yaml_file(path)?;
        self.apply_address(namespace, address).await
    }

    #[instrument(skip(self, address), fields(address = %address.name_any()))]
    async fn apply_address(
        &mut self,
        namespace: &str,
        mut address: ActiveMQArtemisAddress,
    ) -> Result<ActiveMQArtemisAddress> {
        address.metadata.namespace = Some(namespace.to_string());
        let address = upsert(&self.addresses(namespace), &address, ConflictPolicy::Replace).await?;
        self.deployed.track_address(TrackedRef::of(namespace, &address));

        // the operator gives no signal once the broker has the address
        self.kube.pause(ADDRESS_SETTLE).await?;
        info!(
            "[{}] Created ActiveMQArtemisAddress {}",
            namespace,
            address.name_any()
        );
        Ok(address)
    }

    pub async fn delete_artemis_address(
        &mut self,
        namespace: &str,
        address: &ActiveMQArtemisAddress,
    ) -> Result<()> {
        delete_if_exists(&self.addresses(namespace), &address.name_any()).await?;
        self.deployed.untrack_address(&TrackedRef::of(namespace, address));
        info!(
            "[{}] Deleted ActiveMQArtemisAddress {}",
            namespace,
            address.name_any()
        );
        Ok(())
    }
}
