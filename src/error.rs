// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SystemTestError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to build Kubernetes client: {0}")]
    KubeconfigError(String),

    #[error("Timed out after {}s waiting for {description}", timeout.as_secs())]
    Timeout {
        description: String,
        timeout: Duration,
    },

    #[error("Wait for {0} was cancelled")]
    Cancelled(String),

    #[error("Invalid wait for {description}: {reason}")]
    InvalidWait { description: String, reason: String },

    #[error("{kind} '{name}' not found in namespace '{namespace}'")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("{kind} '{name}' already exists in namespace '{namespace}'")]
    AlreadyExists {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Invalid manifest: {0}")]
    ManifestError(String),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to convert JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Command in pod {pod} failed: {message}")]
    ExecError { pod: String, message: String },

    #[error("Cluster operator error: {0}")]
    OperatorError(String),

    #[error("Teardown left {0} resource(s) behind")]
    TeardownIncomplete(usize),
}

impl SystemTestError {
    pub fn not_found(kind: &str, namespace: &str, name: &str) -> Self {
        SystemTestError::NotFound {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// True when the error is a Kubernetes 404
    pub fn is_not_found(&self) -> bool {
        match self {
            SystemTestError::KubeError(kube::Error::Api(err)) => err.code == 404,
            SystemTestError::NotFound { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SystemTestError>;
