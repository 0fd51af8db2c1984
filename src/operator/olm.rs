// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operator installation through the Operator Lifecycle Manager

use crate::constants::durations::{MINUTES_3, SECONDS_5};
use crate::constants::operator::{OLM_DEFAULT_SOURCE, OLM_DEFAULT_SOURCE_NAMESPACE};
use crate::error::Result;
use crate::kubernetes::apply::{apply_manifest, delete_manifest};
use crate::kubernetes::KubeClient;
use kube::api::{Api, ApiResource, DynamicObject};
use kube::core::GroupVersionKind;
use serde_json::json;
use tracing::{debug, info, instrument};

const OLM_GROUP: &str = "operators.coreos.com";
const CATALOG_SOURCE_NAME: &str = "artemis-systemtests-catalog";

fn olm_resource(version: &str, kind: &str) -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk(OLM_GROUP, version, kind))
}

#[derive(Debug, Clone)]
pub struct OlmInstallation {
    package: String,
    channel: String,
    index_image: Option<String>,
    installed_csv: Option<String>,
}

impl OlmInstallation {
    pub fn new(package: &str, channel: &str, index_image: Option<String>) -> Self {
        Self {
            package: package.to_string(),
            channel: channel.to_string(),
            index_image,
            installed_csv: None,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// ClusterServiceVersion installed by the subscription, once known
    pub fn installed_csv(&self) -> Option<&str> {
        self.installed_csv.as_deref()
    }

    fn source(&self, namespace: &str) -> (String, String) {
        match self.index_image {
            Some(_) => (CATALOG_SOURCE_NAME.to_string(), namespace.to_string()),
            None => (
                OLM_DEFAULT_SOURCE.to_string(),
                OLM_DEFAULT_SOURCE_NAMESPACE.to_string(),
            ),
        }
    }

    fn manifests(
        &self,
        namespace: &str,
        namespaced: bool,
        watched: &[String],
    ) -> Vec<DynamicObject> {
        let mut objects = vec![operator_group(namespace, namespaced, watched)];
        if let Some(image) = &self.index_image {
            objects.push(catalog_source(namespace, image));
        }
        let (source, source_namespace) = self.source(namespace);
        objects.push(subscription(
            namespace,
            &self.package,
            &self.channel,
            &source,
            &source_namespace,
        ));
        objects
    }

    #[instrument(skip(self, kube, watched))]
    pub(crate) async fn deploy(
        &mut self,
        kube: &KubeClient,
        namespace: &str,
        namespaced: bool,
        watched: &[String],
    ) -> Result<()> {
        for object in self.manifests(namespace, namespaced, watched) {
            apply_manifest(kube.client(), namespace, &object).await?;
        }
        info!(
            "[{}] Subscribed to {} on channel {}",
            namespace, self.package, self.channel
        );

        let subscriptions: Api<DynamicObject> = Api::namespaced_with(
            kube.client().clone(),
            namespace,
            &olm_resource("v1alpha1", "Subscription"),
        );
        let (api, package) = (&subscriptions, self.package.as_str());
        kube.wait_for(
            &format!("subscription {} to install a CSV", package),
            SECONDS_5,
            MINUTES_3,
            || async move {
                let subscription = api.get_opt(package).await?;
                Ok(subscription.as_ref().and_then(installed_csv_of).is_some())
            },
        )
        .await?;

        self.installed_csv = subscriptions
            .get_opt(&self.package)
            .await?
            .as_ref()
            .and_then(installed_csv_of);
        info!(
            "[{}] Installed CSV {}",
            namespace,
            self.installed_csv.as_deref().unwrap_or_default()
        );
        Ok(())
    }

    pub(crate) async fn undeploy(&mut self, kube: &KubeClient, namespace: &str) -> Result<()> {
        let (source, source_namespace) = self.source(namespace);
        delete_manifest(
            kube.client(),
            namespace,
            &subscription(namespace, &self.package, &self.channel, &source, &source_namespace),
        )
        .await?;

        if let Some(csv) = self.installed_csv.take() {
            debug!("[{}] Deleting CSV {}", namespace, csv);
            let csv_object = DynamicObject::new(
                &csv,
                &olm_resource("v1alpha1", "ClusterServiceVersion"),
            )
            .within(namespace);
            delete_manifest(kube.client(), namespace, &csv_object).await?;
        }

        if let Some(image) = &self.index_image {
            delete_manifest(kube.client(), namespace, &catalog_source(namespace, image)).await?;
        }
        delete_manifest(kube.client(), namespace, &operator_group(namespace, true, &[])).await?;
        Ok(())
    }
}

fn installed_csv_of(subscription: &DynamicObject) -> Option<String> {
    subscription
        .data
        .pointer("/status/installedCSV")
        .and_then(|v| v.as_str())
        .filter(|csv| !csv.is_empty())
        .map(str::to_string)
}

/// OperatorGroup targeting the operator namespace or the watched namespaces; an empty
/// target list means every namespace
pub fn operator_group(namespace: &str, namespaced: bool, watched: &[String]) -> DynamicObject {
    let targets: Vec<String> = if namespaced {
        vec![namespace.to_string()]
    } else {
        watched.to_vec()
    };
    let spec = if targets.is_empty() {
        json!({})
    } else {
        json!({ "targetNamespaces": targets })
    };
    DynamicObject::new(
        &format!("{}-operator-group", namespace),
        &olm_resource("v1", "OperatorGroup"),
    )
    .within(namespace)
    .data(json!({ "spec": spec }))
}

pub fn catalog_source(namespace: &str, index_image: &str) -> DynamicObject {
    DynamicObject::new(
        CATALOG_SOURCE_NAME,
        &olm_resource("v1alpha1", "CatalogSource"),
    )
    .within(namespace)
    .data(json!({
        "spec": {
            "sourceType": "grpc",
            "image": index_image,
            "displayName": "ArtemisCloud system tests"
        }
    }))
}

pub fn subscription(
    namespace: &str,
    package: &str,
    channel: &str,
    source: &str,
    source_namespace: &str,
) -> DynamicObject {
    DynamicObject::new(package, &olm_resource("v1alpha1", "Subscription"))
        .within(namespace)
        .data(json!({
            "spec": {
                "name": package,
                "channel": channel,
                "source": source,
                "sourceNamespace": source_namespace,
                "installPlanApproval": "Automatic"
            }
        }))
}
