// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle of the Artemis custom resources, operators and client containers a test
//! deploys.
//!
//! Everything created through a [`ResourceManager`] is recorded in its
//! [`DeployedResources`] and removed again by [`ResourceManager::undeploy_all`].

pub mod address;
pub mod broker;
pub mod clients;
pub mod operators;
pub mod security;
pub mod tracker;

pub use broker::{broker_ready_timeout, create_acceptor};
pub use tracker::{DeployedResources, TrackedRef};

use crate::config::Environment;
use crate::constants::durations::{MINUTES_3, SECONDS_2};
use crate::error::{Result, SystemTestError};
use crate::kubernetes::{delete_if_exists, KubeClient};
use crate::types::{ActiveMQArtemis, ActiveMQArtemisAddress, ActiveMQArtemisSecurity};
use futures::future::join_all;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{info, instrument, warn};

pub struct ResourceManager {
    kube: KubeClient,
    environment: Environment,
    deployed: DeployedResources,
}

impl ResourceManager {
    pub fn new(kube: KubeClient, environment: Environment) -> Self {
        Self {
            kube,
            environment,
            deployed: DeployedResources::default(),
        }
    }

    pub fn kube(&self) -> &KubeClient {
        &self.kube
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn deployed(&self) -> &DeployedResources {
        &self.deployed
    }

    /// Swap the cluster client, e.g. for one bound to another runtime
    pub fn replace_client(&mut self, kube: KubeClient) {
        self.kube = kube;
    }

    /// Create a namespace and track it for teardown
    pub async fn create_namespace(&mut self, name: &str) -> Result<Namespace> {
        self.deployed.track_namespace(name);
        self.kube.create_namespace(name).await
    }

    pub async fn delete_namespace(&mut self, name: &str) -> Result<()> {
        self.kube.delete_namespace(name).await?;
        self.deployed.untrack_namespace(name);
        Ok(())
    }

    /// Remove everything still tracked, in dependency order.
    ///
    /// Objects that are already gone are skipped. Other failures are logged and the sweep
    /// carries on; their number is reported as [`SystemTestError::TeardownIncomplete`].
    #[instrument(skip(self))]
    pub async fn undeploy_all(&mut self) -> Result<()> {
        let mut failures = 0;

        for clients in std::mem::take(&mut self.deployed.clients) {
            warn!("[{}] Undeploying orphaned clients container {}", clients.namespace, clients.name);
            failures += self.sweep::<Deployment>(&clients).await;
        }

        for mut operator in std::mem::take(&mut self.deployed.operators) {
            warn!("[{}] Undeploying orphaned cluster operator", operator.namespace());
            if let Err(e) = operator.undeploy(&self.kube, true).await {
                warn!("[{}] Failed to undeploy cluster operator: {}", operator.namespace(), e);
                failures += 1;
            }
        }

        for security in std::mem::take(&mut self.deployed.securities) {
            warn!("[{}] Undeploying orphaned ActiveMQArtemisSecurity {}", security.namespace, security.name);
            failures += self.sweep::<ActiveMQArtemisSecurity>(&security).await;
        }

        for address in std::mem::take(&mut self.deployed.addresses) {
            warn!("[{}] Undeploying orphaned ActiveMQArtemisAddress {}", address.namespace, address.name);
            failures += self.sweep::<ActiveMQArtemisAddress>(&address).await;
        }

        for broker in std::mem::take(&mut self.deployed.brokers) {
            warn!("[{}] Undeploying orphaned ActiveMQArtemis {}", broker.namespace, broker.name);
            failures += self.sweep::<ActiveMQArtemis>(&broker).await;
        }

        failures += self.sweep_namespaces().await;

        if failures > 0 {
            return Err(SystemTestError::TeardownIncomplete(failures));
        }
        info!("All deployed resources removed");
        Ok(())
    }

    /// Delete one tracked object, returning the number of failures (0 or 1)
    async fn sweep<K>(&self, reference: &TrackedRef) -> usize
    where
        K: Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.kube.client().clone(), &reference.namespace);
        match delete_if_exists(&api, &reference.name).await {
            Ok(_) => 0,
            Err(e) => {
                warn!(
                    "[{}] Failed to delete {}: {}",
                    reference.namespace, reference.name, e
                );
                1
            }
        }
    }

    /// Issue every namespace deletion first, then wait for all of them to disappear
    async fn sweep_namespaces(&mut self) -> usize {
        let namespaces = std::mem::take(&mut self.deployed.namespaces);
        let api: Api<Namespace> = Api::all(self.kube.client().clone());
        let mut failures = 0;

        let mut pending = Vec::new();
        for namespace in namespaces {
            warn!("Undeploying orphaned namespace {}", namespace);
            match delete_if_exists(&api, &namespace).await {
                Ok(true) => pending.push(namespace),
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to delete namespace {}: {}", namespace, e);
                    failures += 1;
                }
            }
        }

        let kube = &self.kube;
        let waits = pending.iter().map(|namespace| async move {
            let description = format!("namespace {} to be deleted", namespace);
            kube.wait_for(&description, SECONDS_2, MINUTES_3, || async move {
                kube.namespace_exists(namespace).await.map(|exists| !exists)
            })
            .await
        });
        for result in join_all(waits).await {
            if let Err(e) = result {
                warn!("{}", e);
                failures += 1;
            }
        }
        failures
    }
}
