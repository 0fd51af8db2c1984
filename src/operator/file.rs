// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operator installation from a directory of YAML manifests

use crate::constants::operator::{DEPLOYMENT_NAME, WATCH_NAMESPACE_ENV};
use crate::error::{Result, SystemTestError};
use crate::kubernetes::apply::{apply_manifest, delete_manifest, gvk_of, load_documents};
use crate::kubernetes::KubeClient;
use kube::api::DynamicObject;
use kube::ResourceExt;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const KIND_CRD: &str = "CustomResourceDefinition";
const KIND_CLUSTER_ROLE: &str = "ClusterRole";
const KIND_CLUSTER_ROLE_BINDING: &str = "ClusterRoleBinding";
const KIND_ROLE_BINDING: &str = "RoleBinding";
const KIND_DEPLOYMENT: &str = "Deployment";

#[derive(Debug, Clone)]
pub struct FileInstallation {
    install_dir: PathBuf,
    image: Option<String>,
    deployment_name: String,
    applied: Vec<DynamicObject>,
}

impl FileInstallation {
    pub fn new(install_dir: impl Into<PathBuf>, image: Option<String>) -> Self {
        Self {
            install_dir: install_dir.into(),
            image,
            deployment_name: DEPLOYMENT_NAME.to_string(),
            applied: Vec::new(),
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn deployment_name(&self) -> &str {
        &self.deployment_name
    }

    /// Objects applied by the last deploy, in apply order
    pub fn applied(&self) -> &[DynamicObject] {
        &self.applied
    }

    #[instrument(skip(self, kube), fields(dir = %self.install_dir.display()))]
    pub(crate) async fn deploy(
        &mut self,
        kube: &KubeClient,
        namespace: &str,
        namespaced: bool,
        watch_namespace: &str,
    ) -> Result<()> {
        let documents = read_manifests(&self.install_dir)?;
        let prepared = prepare_manifests(
            documents,
            namespace,
            namespaced,
            watch_namespace,
            self.image.as_deref(),
        )?;

        if let Some(deployment) = prepared
            .iter()
            .find(|o| kind_of(o).as_deref() == Some(KIND_DEPLOYMENT))
        {
            self.deployment_name = deployment.name_any();
        }

        for object in &prepared {
            apply_manifest(kube.client(), namespace, object).await?;
            self.applied.push(object.clone());
        }
        info!(
            "[{}] Applied {} operator manifests from {}",
            namespace,
            self.applied.len(),
            self.install_dir.display()
        );
        Ok(())
    }

    pub(crate) async fn undeploy(&mut self, kube: &KubeClient, namespace: &str) -> Result<()> {
        while let Some(object) = self.applied.pop() {
            if !delete_manifest(kube.client(), namespace, &object).await? {
                debug!("[{}] {} was already removed", namespace, object.name_any());
            }
        }
        Ok(())
    }
}

/// Apply the CustomResourceDefinitions found in the install directory
#[instrument(skip(kube))]
pub async fn deploy_crds(kube: &KubeClient, install_dir: &Path) -> Result<()> {
    for crd in crd_manifests(read_manifests(install_dir)?) {
        info!("Applying CRD {}", crd.name_any());
        apply_manifest(kube.client(), "", &crd).await?;
    }
    Ok(())
}

#[instrument(skip(kube))]
pub async fn undeploy_crds(kube: &KubeClient, install_dir: &Path) -> Result<()> {
    for crd in crd_manifests(read_manifests(install_dir)?) {
        if delete_manifest(kube.client(), "", &crd).await? {
            info!("Deleted CRD {}", crd.name_any());
        }
    }
    Ok(())
}

/// Every document of the `*.yaml` / `*.yml` files in `dir`, files taken in name order
pub fn read_manifests(dir: &Path) -> Result<Vec<DynamicObject>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(SystemTestError::OperatorError(format!(
            "No operator manifests found in {}",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    for file in files {
        debug!("Loading operator manifest {}", file.display());
        documents.extend(load_documents(&std::fs::read_to_string(&file)?)?);
    }
    Ok(documents)
}

pub fn crd_manifests(documents: Vec<DynamicObject>) -> Vec<DynamicObject> {
    documents
        .into_iter()
        .filter(|o| kind_of(o).as_deref() == Some(KIND_CRD))
        .collect()
}

/// Adapt the operator manifests to the target namespace and watch scope.
///
/// CRDs are dropped, and so are cluster roles when the operator is namespaced.
pub fn prepare_manifests(
    documents: Vec<DynamicObject>,
    namespace: &str,
    namespaced: bool,
    watch_namespace: &str,
    image: Option<&str>,
) -> Result<Vec<DynamicObject>> {
    let mut prepared = Vec::new();
    for mut object in documents {
        let kind = gvk_of(&object)?.kind;
        match kind.as_str() {
            KIND_CRD => continue,
            KIND_CLUSTER_ROLE | KIND_CLUSTER_ROLE_BINDING if namespaced => {
                debug!("Skipping {} {} for a namespaced operator", kind, object.name_any());
                continue;
            }
            KIND_CLUSTER_ROLE_BINDING | KIND_ROLE_BINDING => {
                repoint_subjects(&mut object.data, namespace);
            }
            KIND_DEPLOYMENT => {
                set_watch_namespace(&mut object.data, watch_namespace);
                if let Some(image) = image {
                    set_operator_image(&mut object.data, image);
                }
            }
            _ => {}
        }
        prepared.push(object);
    }
    Ok(prepared)
}

fn kind_of(object: &DynamicObject) -> Option<String> {
    object.types.as_ref().map(|t| t.kind.clone())
}

fn repoint_subjects(data: &mut Value, namespace: &str) {
    let Some(subjects) = data.get_mut("subjects").and_then(Value::as_array_mut) else {
        return;
    };
    for subject in subjects {
        if subject.get("kind").and_then(Value::as_str) == Some("ServiceAccount") {
            subject["namespace"] = json!(namespace);
        }
    }
}

fn containers_mut(data: &mut Value) -> Option<&mut Vec<Value>> {
    data.pointer_mut("/spec/template/spec/containers")
        .and_then(Value::as_array_mut)
}

fn set_watch_namespace(data: &mut Value, watch_namespace: &str) {
    let Some(containers) = containers_mut(data) else {
        warn!("Operator deployment has no containers to configure");
        return;
    };
    for container in containers {
        let env = container
            .as_object_mut()
            .map(|c| c.entry("env").or_insert_with(|| json!([])));
        let Some(env) = env.and_then(Value::as_array_mut) else {
            continue;
        };
        env.retain(|var| var.get("name").and_then(Value::as_str) != Some(WATCH_NAMESPACE_ENV));
        env.push(json!({ "name": WATCH_NAMESPACE_ENV, "value": watch_namespace }));
    }
}

fn set_operator_image(data: &mut Value, image: &str) {
    if let Some(container) = containers_mut(data).and_then(|c| c.first_mut()) {
        container["image"] = json!(image);
    }
}
