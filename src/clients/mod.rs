// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Messaging clients run as external programs inside cluster pods.
//!
//! - [`BundledClient`] - the `artemis producer`/`consumer` CLI shipped with the broker
//! - [`QpidClient`] - the `cli-qpid-sender`/`cli-qpid-receiver` AMQP clients from the
//!   `systemtests-clients` container
//!
//! Both record every payload they send and receive in a [`MessageLog`] so a test can
//! compare the two sides.

pub mod bundled;
pub mod qpid;

pub use bundled::{BundledClient, Protocol};
pub use qpid::QpidClient;

use crate::error::{Result, SystemTestError};
use crate::kubernetes::{ExecOutput, KubeClient};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[async_trait]
pub trait MessagingClient: Send {
    /// Send the configured number of messages, returning how many were sent
    async fn send_messages(&mut self) -> Result<usize>;

    /// Receive messages, or collect the output of a running subscriber
    async fn receive_messages(&mut self) -> Result<usize>;

    /// Start a consumer on the multicast form of the address before anything is sent
    async fn subscribe(&mut self) -> Result<()>;

    /// Whether the received payloads are exactly the sent ones
    fn compare_messages(&self) -> bool;
}

/// Where a client runs and what it talks to
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Namespace of the pod the client is executed in
    pub namespace: String,
    pub pod: String,
    pub container: Option<String>,
    /// Broker host and acceptor port
    pub host: String,
    pub port: String,
    pub address: String,
    pub queue: String,
    pub message_count: usize,
    pub credentials: Option<(String, String)>,
}

impl ClientOptions {
    pub fn new(
        pod: &Pod,
        host: &str,
        port: &str,
        address: &str,
        queue: &str,
        message_count: usize,
    ) -> Result<Self> {
        let name = pod.metadata.name.clone().ok_or_else(|| {
            SystemTestError::ManifestError("Pod without metadata.name".to_string())
        })?;
        Ok(Self {
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
            pod: name,
            container: None,
            host: host.to_string(),
            port: port.to_string(),
            address: address.to_string(),
            queue: queue.to_string(),
            message_count,
            credentials: None,
        })
    }

    pub fn with_container(mut self, container: &str) -> Self {
        self.container = Some(container.to_string());
        self
    }

    pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
        self.credentials = Some((user.to_string(), password.to_string()));
        self
    }
}

/// Payloads seen on both sides of an exchange
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    sent: Vec<String>,
    received: Vec<String>,
}

impl MessageLog {
    pub fn record_sent(&mut self, messages: Vec<String>) -> usize {
        let count = messages.len();
        self.sent.extend(messages);
        count
    }

    pub fn record_received(&mut self, messages: Vec<String>) -> usize {
        let count = messages.len();
        self.received.extend(messages);
        count
    }

    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn received(&self) -> &[String] {
        &self.received
    }

    /// Equal counts and the same payloads, in any order
    pub fn matches(&self) -> bool {
        if self.sent.len() != self.received.len() {
            warn!(
                "Sent {} messages but received {}",
                self.sent.len(),
                self.received.len()
            );
            return false;
        }
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for message in &self.sent {
            *counts.entry(message).or_default() += 1;
        }
        for message in &self.received {
            *counts.entry(message).or_default() -= 1;
        }
        let mismatched = counts.values().filter(|c| **c != 0).count();
        if mismatched > 0 {
            warn!("{} payloads differ between sent and received messages", mismatched);
        }
        mismatched == 0
    }
}

/// Runs client commands in the configured pod
#[derive(Clone)]
pub(crate) struct PodRunner {
    kube: KubeClient,
    namespace: String,
    pod: String,
    container: Option<String>,
}

impl PodRunner {
    pub(crate) fn new(kube: KubeClient, options: &ClientOptions) -> Self {
        Self {
            kube,
            namespace: options.namespace.clone(),
            pod: options.pod.clone(),
            container: options.container.clone(),
        }
    }

    pub(crate) async fn run(&self, command: Vec<String>) -> Result<ExecOutput> {
        let output = self
            .kube
            .exec_in_pod(&self.namespace, &self.pod, self.container.as_deref(), command)
            .await?;
        if !output.success {
            warn!(
                "[{}] Client in pod {} exited with an error: {}",
                self.namespace,
                self.pod,
                output.stderr.trim()
            );
        }
        Ok(output)
    }

    /// Run `command` in the background, e.g. a subscriber that must be listening before
    /// messages are sent
    pub(crate) fn spawn(&self, command: Vec<String>) -> JoinHandle<Result<ExecOutput>> {
        let runner = self.clone();
        debug!("[{}] Starting background client in pod {}", self.namespace, self.pod);
        tokio::spawn(async move { runner.run(command).await })
    }

    /// Give a spawned client time to attach, stopping early on cancellation
    pub(crate) async fn settle(&self, duration: Duration) -> Result<()> {
        self.kube.pause(duration).await
    }

    pub(crate) async fn join(&self, handle: JoinHandle<Result<ExecOutput>>) -> Result<ExecOutput> {
        handle.await.map_err(|e| SystemTestError::ExecError {
            pod: self.pod.clone(),
            message: format!("background client failed: {}", e),
        })?
    }
}
