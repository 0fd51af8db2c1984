// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ResourceManager, TrackedRef};
use crate::constants::artemis::ALL_PORT_NAME;
use crate::constants::durations::{BROKER_READY_BASE, MINUTES_3, MINUTE_1, SECONDS_5};
use crate::error::{Result, SystemTestError};
use crate::kubernetes::{
    delete_if_exists, is_statefulset_ready, load_yaml, load_yaml_file, service_port, upsert,
    ConflictPolicy,
};
use crate::types::{Acceptor, ActiveMQArtemis, ActiveMQArtemisSpec, DeploymentPlan, Upgrades};
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, ResourceExt};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Readiness deadline for a broker of `size` replicas
pub fn broker_ready_timeout(size: i32) -> Duration {
    if size > 1 {
        BROKER_READY_BASE + MINUTE_1 * size as u32
    } else {
        BROKER_READY_BASE
    }
}

/// Acceptor exposing `protocols` (comma separated) on `port`
pub fn create_acceptor(name: &str, protocols: &str, port: i32) -> Acceptor {
    Acceptor {
        name: name.to_string(),
        protocols: Some(protocols.to_string()),
        port: Some(port),
        expose: Some(true),
        ..Default::default()
    }
}

fn broker_spec(size: i32, upgrade_enabled: bool, upgrade_minor: bool) -> ActiveMQArtemisSpec {
    ActiveMQArtemisSpec {
        deployment_plan: Some(DeploymentPlan {
            size: Some(size),
            persistence_enabled: Some(true),
            message_migration: Some(true),
            ..Default::default()
        }),
        upgrades: Some(Upgrades {
            enabled: Some(upgrade_enabled),
            minor: Some(upgrade_minor),
        }),
        ..Default::default()
    }
}

impl ResourceManager {
    fn brokers(&self, namespace: &str) -> Api<ActiveMQArtemis> {
        Api::namespaced(self.kube.client().clone(), namespace)
    }

    /// Deploy a persistent broker with message migration and wait for all replicas
    pub async fn create_artemis(
        &mut self,
        namespace: &str,
        name: &str,
        size: i32,
        upgrade_enabled: bool,
        upgrade_minor: bool,
    ) -> Result<ActiveMQArtemis> {
        let broker = ActiveMQArtemis::new(name, broker_spec(size, upgrade_enabled, upgrade_minor));
        self.create_artemis_with(namespace, broker, true, broker_ready_timeout(size))
            .await
    }

    pub async fn create_artemis_from_file(
        &mut self,
        namespace: &str,
        path: &Path,
        wait: bool,
    ) -> Result<ActiveMQArtemis> {
        let broker: ActiveMQArtemis = load_yaml_file(path)?;
        let timeout = broker_ready_timeout(broker.size());
        self.create_artemis_with(namespace, broker, wait, timeout)
            .await
    }

    pub async fn create_artemis_from_str(
        &mut self,
        namespace: &str,
        yaml: &str,
        wait: bool,
    ) -> Result<ActiveMQArtemis> {
        let broker: ActiveMQArtemis = load_yaml(yaml)?;
        let timeout = broker_ready_timeout(broker.size());
        self.create_artemis_with(namespace, broker, wait, timeout)
            .await
    }

    /// Create or replace `broker` in `namespace`, optionally waiting up to `timeout` for
    /// its stateful set to be ready, and track it
    #[instrument(skip(self, broker), fields(broker = %broker.name_any()))]
    pub async fn create_artemis_with(
        &mut self,
        namespace: &str,
        mut broker: ActiveMQArtemis,
        wait: bool,
        timeout: Duration,
    ) -> Result<ActiveMQArtemis> {
        broker.metadata.namespace = Some(namespace.to_string());
        let broker = upsert(&self.brokers(namespace), &broker, ConflictPolicy::Replace).await?;
        info!("[{}] Created ActiveMQArtemis {}", namespace, broker.name_any());
        self.deployed.track_broker(TrackedRef::of(namespace, &broker));

        if wait {
            self.wait_for_broker_deployment(namespace, &broker, false, timeout, None)
                .await?;
        }
        Ok(broker)
    }

    /// Wait for the broker stateful set to have all replicas ready.
    ///
    /// When `reload_existing` is set the operator first gets a moment to roll the broker,
    /// and a given `old_statefulset` must have been replaced.
    #[instrument(skip(self, broker, old_statefulset), fields(broker = %broker.name_any()))]
    pub async fn wait_for_broker_deployment(
        &self,
        namespace: &str,
        broker: &ActiveMQArtemis,
        reload_existing: bool,
        timeout: Duration,
        old_statefulset: Option<&StatefulSet>,
    ) -> Result<()> {
        info!(
            "[{}] Waiting {}s for creation of broker {}",
            namespace,
            timeout.as_secs(),
            broker.name_any()
        );
        if reload_existing {
            info!("[{}] Reloading existing broker {}", namespace, broker.name_any());
            self.kube.pause(SECONDS_5).await?;
        }

        let statefulset_name = broker.statefulset_name();
        let old_uid = old_statefulset
            .filter(|_| reload_existing)
            .and_then(|ss| ss.uid());
        let (kube, name, old_uid) = (&self.kube, statefulset_name.as_str(), old_uid.as_deref());
        kube.wait_for(
            &format!("stateful set {}/{} to be ready", namespace, name),
            SECONDS_5,
            timeout,
            || async move {
                let Some(ss) = kube.get_statefulset(namespace, name).await? else {
                    return Ok(false);
                };
                let replaced = match old_uid {
                    Some(old) => ss.uid().as_deref() != Some(old),
                    None => true,
                };
                Ok(replaced && is_statefulset_ready(&ss))
            },
        )
        .await
    }

    /// Delete the broker, optionally waiting for its stateful set and pods to disappear
    #[instrument(skip(self, broker), fields(broker = %broker.name_any()))]
    pub async fn delete_artemis(
        &mut self,
        namespace: &str,
        broker: &ActiveMQArtemis,
        wait: bool,
        timeout: Duration,
    ) -> Result<()> {
        let name = broker.name_any();
        delete_if_exists(&self.brokers(namespace), &name).await?;

        if wait {
            let statefulset_name = broker.statefulset_name();
            let (kube, ss_name, prefix) = (&self.kube, statefulset_name.as_str(), name.as_str());
            kube.wait_for(
                &format!("broker {}/{} stateful set and pods to be removed", namespace, name),
                SECONDS_5,
                timeout,
                || async move {
                    let statefulset = kube.get_statefulset(namespace, ss_name).await?;
                    let pods = kube.list_pods_by_prefix(namespace, prefix).await?;
                    Ok(statefulset.is_none() && pods.is_empty())
                },
            )
            .await?;
        }

        self.deployed.untrack_broker(&TrackedRef::of(namespace, broker));
        info!("[{}] Deleted ActiveMQArtemis {}", namespace, name);
        Ok(())
    }

    /// Replace the broker's acceptors and wait for its pod to come back with them
    #[instrument(skip(self, acceptors, broker), fields(broker = %broker.name_any()))]
    pub async fn add_acceptors(
        &mut self,
        namespace: &str,
        acceptors: Vec<Acceptor>,
        mut broker: ActiveMQArtemis,
    ) -> Result<ActiveMQArtemis> {
        let name = broker.name_any();
        let pod = self
            .kube
            .get_first_pod_by_prefix(namespace, &name)
            .await?
            .ok_or_else(|| SystemTestError::not_found("Pod", namespace, &name))?;
        let siblings = self.kube.sibling_uids(namespace, &name, &pod).await?;

        broker.spec.acceptors = acceptors;
        broker.metadata.namespace = Some(namespace.to_string());
        let broker = upsert(&self.brokers(namespace), &broker, ConflictPolicy::Replace).await?;
        info!(
            "[{}] Updated acceptors of {}: {}",
            namespace,
            name,
            broker
                .spec
                .acceptors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.kube
            .wait_for_pod_reload(namespace, &name, &pod, &siblings, MINUTES_3)
            .await?;
        self.deployed.track_broker(TrackedRef::of(namespace, &broker));
        Ok(broker)
    }

    /// Headless service exposing every acceptor of the broker
    pub async fn artemis_headless_service(
        &self,
        namespace: &str,
        broker: &ActiveMQArtemis,
    ) -> Result<Service> {
        let name = broker.headless_service_name();
        self.kube
            .get_service(namespace, &name)
            .await?
            .ok_or_else(|| SystemTestError::not_found("Service", namespace, &name))
    }

    /// Port of the broker's headless service called `port_name`, `all` when none is given
    pub async fn artemis_service_port(
        &self,
        namespace: &str,
        broker: &ActiveMQArtemis,
        port_name: Option<&str>,
    ) -> Result<i32> {
        let port_name = port_name.unwrap_or(ALL_PORT_NAME);
        let service = self.artemis_headless_service(namespace, broker).await?;
        service_port(&service, port_name).ok_or_else(|| {
            warn!(
                "[{}] Service {} has no port {}",
                namespace,
                service.name_any(),
                port_name
            );
            SystemTestError::not_found("ServicePort", namespace, port_name)
        })
    }
}
