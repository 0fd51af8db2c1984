// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes façade: client creation, typed lookups, readiness waits and manifest handling.

pub mod apply;
pub mod client;
pub mod crd;
pub mod exec;
pub mod jobs;
pub mod namespaces;
pub mod nodes;
pub mod pods;
pub mod services;
pub mod workloads;

pub use apply::{
    apply_manifest, delete_if_exists, delete_manifest, load_documents, load_yaml, load_yaml_file,
    upsert, ConflictPolicy,
};
pub use client::{filter_by_prefix, KubeClient};
pub use exec::ExecOutput;
pub use namespaces::random_namespace_name;
pub use nodes::node_address;
pub use pods::{is_pod_ready, pod_ip};
pub use services::service_port;
pub use workloads::{deployment_selector, is_deployment_available, is_statefulset_ready};
