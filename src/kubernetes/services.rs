// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::client::{filter_by_prefix, KubeClient};
use crate::error::{Result, SystemTestError};
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::{api::ListParams, Api};
use tracing::warn;

impl KubeClient {
    pub async fn get_service(&self, namespace: &str, name: &str) -> Result<Option<Service>> {
        let api: Api<Service> = Api::namespaced(self.client().clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    /// Service the operator created for an acceptor, named `<broker>-<acceptor>-<n>-svc`
    pub async fn get_service_broker_acceptor(
        &self,
        namespace: &str,
        broker: &str,
        acceptor: &str,
    ) -> Result<Service> {
        let api: Api<Service> = Api::namespaced(self.client().clone(), namespace);
        let prefix = format!("{}-{}", broker, acceptor);
        let services = filter_by_prefix(api.list(&ListParams::default()).await?.items, &prefix);
        if services.len() > 1 {
            warn!(
                "[{}] {} services match {}, using the first one",
                namespace,
                services.len(),
                prefix
            );
        }
        services
            .into_iter()
            .next()
            .ok_or_else(|| SystemTestError::not_found("Service", namespace, &prefix))
    }

    pub async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client().clone(), namespace);
        Ok(api.get_opt(name).await?)
    }
}

/// Port number of the service port called `port_name`
pub fn service_port(service: &Service, port_name: &str) -> Option<i32> {
    service
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .and_then(|ports| {
            ports
                .iter()
                .find(|p| p.name.as_deref() == Some(port_name))
                .map(|p| p.port)
        })
}
