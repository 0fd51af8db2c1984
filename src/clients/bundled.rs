// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ClientOptions, MessageLog, MessagingClient, PodRunner};
use crate::constants::artemis::ARTEMIS_CLI;
use crate::constants::durations::SUBSCRIBER_SETTLE;
use crate::error::Result;
use crate::kubernetes::{ExecOutput, KubeClient};
use async_trait::async_trait;
use std::fmt;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

const SENT_MARKER: &str = "Sent: ";
const RECEIVED_MARKER: &str = "Received ";
const RECEIVE_TIMEOUT_MS: &str = "10000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Core,
    Amqp,
    Openwire,
}

impl Protocol {
    fn url_scheme(self) -> &'static str {
        match self {
            Protocol::Amqp => "amqp",
            Protocol::Core | Protocol::Openwire => "tcp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Core => "core",
            Protocol::Amqp => "amqp",
            Protocol::Openwire => "openwire",
        };
        f.write_str(name)
    }
}

/// The `artemis` CLI bundled with the broker, executed inside the broker pod
pub struct BundledClient {
    protocol: Protocol,
    options: ClientOptions,
    runner: PodRunner,
    log: MessageLog,
    multicast: bool,
    subscriber: Option<JoinHandle<Result<ExecOutput>>>,
}

impl BundledClient {
    pub fn new(kube: KubeClient, protocol: Protocol, options: ClientOptions) -> Self {
        let runner = PodRunner::new(kube, &options);
        Self {
            protocol,
            options,
            runner,
            log: MessageLog::default(),
            multicast: false,
            subscriber: None,
        }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    fn destination(&self) -> String {
        if self.multicast {
            format!("topic://{}", self.options.address)
        } else {
            format!("queue://{}", self.options.queue)
        }
    }

    fn command(&self, action: &str) -> Vec<String> {
        let mut command: Vec<String> = vec![
            ARTEMIS_CLI.to_string(),
            action.to_string(),
            "--protocol".to_string(),
            self.protocol.to_string(),
            "--url".to_string(),
            format!(
                "{}://{}:{}",
                self.protocol.url_scheme(),
                self.options.host,
                self.options.port
            ),
            "--destination".to_string(),
            self.destination(),
            "--message-count".to_string(),
            self.options.message_count.to_string(),
            "--verbose".to_string(),
        ];
        if let Some((user, password)) = &self.options.credentials {
            command.extend([
                "--user".to_string(),
                user.clone(),
                "--password".to_string(),
                password.clone(),
            ]);
        }
        if action == "consumer" {
            command.extend([
                "--break-on-null".to_string(),
                "--receive-timeout".to_string(),
                RECEIVE_TIMEOUT_MS.to_string(),
            ]);
        }
        command
    }
}

#[async_trait]
impl MessagingClient for BundledClient {
    #[instrument(skip(self), fields(protocol = %self.protocol, pod = %self.options.pod))]
    async fn send_messages(&mut self) -> Result<usize> {
        let output = self.runner.run(self.command("producer")).await?;
        let sent = self.log.record_sent(parse_payloads(&output.stdout, SENT_MARKER));
        info!("[{}] Sent {} messages to {}", self.options.namespace, sent, self.destination());
        Ok(sent)
    }

    #[instrument(skip(self), fields(protocol = %self.protocol, pod = %self.options.pod))]
    async fn receive_messages(&mut self) -> Result<usize> {
        let output = match self.subscriber.take() {
            Some(handle) => self.runner.join(handle).await?,
            None => self.runner.run(self.command("consumer")).await?,
        };
        let received = self
            .log
            .record_received(parse_payloads(&output.stdout, RECEIVED_MARKER));
        info!("[{}] Received {} messages", self.options.namespace, received);
        Ok(received)
    }

    async fn subscribe(&mut self) -> Result<()> {
        self.multicast = true;
        self.subscriber = Some(self.runner.spawn(self.command("consumer")));
        self.runner.settle(SUBSCRIBER_SETTLE).await?;
        info!(
            "[{}] Subscribed to {}",
            self.options.namespace,
            self.destination()
        );
        Ok(())
    }

    fn compare_messages(&self) -> bool {
        self.log.matches()
    }
}

/// Payloads of the verbose CLI output lines containing `marker`
pub fn parse_payloads(output: &str, marker: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(marker).map(|(_, payload)| payload.trim_end()))
        .map(str::to_string)
        .collect()
}
