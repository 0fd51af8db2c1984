// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{clients, operator};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// How the cluster operator gets installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMethod {
    /// Apply the operator manifests from a local directory
    File,
    /// Subscribe through the Operator Lifecycle Manager
    Olm,
}

/// Test environment loaded from environment variables
#[derive(Debug, Clone)]
pub struct Environment {
    /// Kubeconfig context, the current context when unset
    pub kube_context: Option<String>,
    /// Whether tests deploy and undeploy the cluster operator themselves
    pub operator_managed: bool,
    pub install_method: InstallMethod,
    pub operator_install_dir: PathBuf,
    pub operator_image: Option<String>,
    pub olm_channel: String,
    pub olm_package: String,
    pub olm_index_image: Option<String>,
    pub disable_random_namespaces: bool,
    /// Tracing filter directive, e.g. `debug` or `artemis_systemtests=trace`
    pub log_level: Option<String>,
    pub clients_image: String,
}

impl Environment {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| -> Result<bool> {
            match non_empty(key) {
                Some(value) => value
                    .trim()
                    .to_ascii_lowercase()
                    .parse::<bool>()
                    .with_context(|| format!("{} must be 'true' or 'false', got '{}'", key, value)),
                None => Ok(default),
            }
        };

        let install_method = if flag("OLM_INSTALLATION", false)? {
            InstallMethod::Olm
        } else {
            InstallMethod::File
        };

        Ok(Environment {
            kube_context: non_empty("KUBE_CONTEXT"),
            operator_managed: flag("CLUSTER_OPERATOR_MANAGED", true)?,
            install_method,
            operator_install_dir: non_empty("OPERATOR_INSTALL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artemis-operator/deploy")),
            operator_image: non_empty("OPERATOR_IMAGE"),
            olm_channel: non_empty("OLM_CHANNEL").unwrap_or_else(|| operator::OLM_CHANNEL.to_string()),
            olm_package: non_empty("OLM_PACKAGE").unwrap_or_else(|| operator::OLM_PACKAGE.to_string()),
            olm_index_image: non_empty("OLM_INDEX_IMAGE"),
            disable_random_namespaces: flag("DISABLE_RANDOM_NAMESPACES", false)?,
            log_level: non_empty("TEST_LOG_LEVEL"),
            clients_image: non_empty("CLIENTS_IMAGE")
                .unwrap_or_else(|| clients::DEFAULT_IMAGE.to_string()),
        })
    }

    pub fn is_olm_installation(&self) -> bool {
        self.install_method == InstallMethod::Olm
    }
}
