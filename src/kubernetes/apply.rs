// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Upsert, deletion and manifest loading helpers

use crate::constants::FIELD_MANAGER;
use crate::error::{Result, SystemTestError};
use kube::{
    api::{Api, DeleteParams, DynamicObject, Patch, PatchParams, PostParams},
    core::GroupVersionKind,
    discovery::{pinned_kind, Scope},
    Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, instrument};

/// What [`upsert`] does when the object already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Overwrite the live object (create-or-replace)
    #[default]
    Replace,
    /// Leave the live object alone and return it
    Keep,
    /// Refuse with [`SystemTestError::AlreadyExists`]
    Fail,
}

/// Create `object` if absent, otherwise resolve the conflict according to `policy`.
///
/// Applying the same object twice results in a single cluster object.
#[instrument(skip(api, object), fields(name = ?object.meta().name))]
pub async fn upsert<K>(api: &Api<K>, object: &K, policy: ConflictPolicy) -> Result<K>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug,
    K::DynamicType: Default,
{
    let kind = K::kind(&K::DynamicType::default()).to_string();
    let name = object.meta().name.clone().ok_or_else(|| {
        SystemTestError::ManifestError(format!("{} without metadata.name", kind))
    })?;

    let Some(existing) = api.get_opt(&name).await? else {
        debug!("Creating {} {}", kind, name);
        return Ok(api.create(&PostParams::default(), object).await?);
    };

    match policy {
        ConflictPolicy::Keep => {
            debug!("{} {} already exists, keeping it", kind, name);
            Ok(existing)
        }
        ConflictPolicy::Fail => Err(SystemTestError::AlreadyExists {
            kind,
            namespace: existing.namespace().unwrap_or_default(),
            name,
        }),
        ConflictPolicy::Replace => {
            debug!("Replacing {} {}", kind, name);
            let mut replacement = object.clone();
            replacement.meta_mut().resource_version = existing.resource_version();
            Ok(api
                .replace(&name, &PostParams::default(), &replacement)
                .await?)
        }
    }
}

/// Delete an object, returning `false` when it was already gone
pub async fn delete_if_exists<K>(api: &Api<K>, name: &str) -> Result<bool>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    match api.delete(name, &DeleteParams::background()).await {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("{} already deleted", name);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deserialize a single typed object from YAML
pub fn load_yaml<K: DeserializeOwned>(yaml: &str) -> Result<K> {
    Ok(serde_yaml::from_str(yaml)?)
}

pub fn load_yaml_file<K: DeserializeOwned>(path: &Path) -> Result<K> {
    let content = std::fs::read_to_string(path)?;
    load_yaml(&content)
}

/// Split a multi-document YAML stream into untyped objects, skipping empty documents
pub fn load_documents(yaml: &str) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(yaml) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        objects.push(serde_yaml::from_value(value)?);
    }
    Ok(objects)
}

pub fn gvk_of(object: &DynamicObject) -> Result<GroupVersionKind> {
    let types = object.types.as_ref().ok_or_else(|| {
        SystemTestError::ManifestError(format!("{} has no apiVersion/kind", object.name_any()))
    })?;
    GroupVersionKind::try_from(types).map_err(|e| SystemTestError::ManifestError(e.to_string()))
}

/// Resolve the API for an untyped object, returning whether it is namespaced
async fn dynamic_api(
    client: &Client,
    namespace: &str,
    gvk: &GroupVersionKind,
) -> Result<(Api<DynamicObject>, bool)> {
    let (resource, capabilities) = pinned_kind(client, gvk).await?;
    if capabilities.scope == Scope::Namespaced {
        Ok((
            Api::namespaced_with(client.clone(), namespace, &resource),
            true,
        ))
    } else {
        Ok((Api::all_with(client.clone(), &resource), false))
    }
}

/// Server-side apply an untyped manifest, placing namespaced objects in `namespace`
#[instrument(skip(client, object), fields(name = %object.name_any()))]
pub async fn apply_manifest(
    client: &Client,
    namespace: &str,
    object: &DynamicObject,
) -> Result<DynamicObject> {
    let gvk = gvk_of(object)?;
    let (api, namespaced) = dynamic_api(client, namespace, &gvk).await?;

    let mut object = object.clone();
    object.metadata.namespace = namespaced.then(|| namespace.to_string());
    object.metadata.resource_version = None;

    let name = object.name_any();
    debug!("[{}] Applying {} {}", namespace, gvk.kind, name);
    let params = PatchParams::apply(FIELD_MANAGER).force();
    Ok(api.patch(&name, &params, &Patch::Apply(&object)).await?)
}

/// Delete an untyped manifest, tolerating objects that are already gone
pub async fn delete_manifest(
    client: &Client,
    namespace: &str,
    object: &DynamicObject,
) -> Result<bool> {
    let gvk = gvk_of(object)?;
    let (api, _) = dynamic_api(client, namespace, &gvk).await?;
    delete_if_exists(&api, &object.name_any()).await
}
