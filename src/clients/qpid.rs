// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ClientOptions, MessageLog, MessagingClient, PodRunner};
use crate::constants::clients::{QPID_RECEIVER, QPID_SENDER};
use crate::constants::durations::SUBSCRIBER_SETTLE;
use crate::error::Result;
use crate::kubernetes::{ExecOutput, KubeClient};
use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

const RECEIVE_TIMEOUT_SECS: &str = "10";

/// AMQP clients of the `systemtests-clients` container
pub struct QpidClient {
    options: ClientOptions,
    runner: PodRunner,
    log: MessageLog,
    multicast: bool,
    subscriber: Option<JoinHandle<Result<ExecOutput>>>,
}

impl QpidClient {
    pub fn new(kube: KubeClient, options: ClientOptions) -> Self {
        let runner = PodRunner::new(kube, &options);
        Self {
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

    fn address(&self) -> String {
        if self.multicast {
            format!("topic://{}", self.options.address)
        } else {
            self.options.queue.clone()
        }
    }

    fn command(&self, program: &str) -> Vec<String> {
        let mut command: Vec<String> = vec![
            program.to_string(),
            "--broker".to_string(),
            format!("{}:{}", self.options.host, self.options.port),
            "--address".to_string(),
            self.address(),
            "--count".to_string(),
            self.options.message_count.to_string(),
            "--log-msgs".to_string(),
            "json".to_string(),
        ];
        if let Some((user, password)) = &self.options.credentials {
            command.extend([
                "--conn-username".to_string(),
                user.clone(),
                "--conn-password".to_string(),
                password.clone(),
            ]);
        }
        if program == QPID_RECEIVER {
            command.extend(["--timeout".to_string(), RECEIVE_TIMEOUT_SECS.to_string()]);
        }
        command
    }
}

#[async_trait]
impl MessagingClient for QpidClient {
    #[instrument(skip(self), fields(pod = %self.options.pod))]
    async fn send_messages(&mut self) -> Result<usize> {
        let output = self.runner.run(self.command(QPID_SENDER)).await?;
        let sent = self.log.record_sent(parse_json_messages(&output.stdout));
        info!("[{}] Sent {} messages to {}", self.options.namespace, sent, self.address());
        Ok(sent)
    }

    #[instrument(skip(self), fields(pod = %self.options.pod))]
    async fn receive_messages(&mut self) -> Result<usize> {
        let output = match self.subscriber.take() {
            Some(handle) => self.runner.join(handle).await?,
            None => self.runner.run(self.command(QPID_RECEIVER)).await?,
        };
        let received = self.log.record_received(parse_json_messages(&output.stdout));
        info!("[{}] Received {} messages", self.options.namespace, received);
        Ok(received)
    }

    async fn subscribe(&mut self) -> Result<()> {
        self.multicast = true;
        self.subscriber = Some(self.runner.spawn(self.command(QPID_RECEIVER)));
        self.runner.settle(SUBSCRIBER_SETTLE).await?;
        info!("[{}] Subscribed to {}", self.options.namespace, self.address());
        Ok(())
    }

    fn compare_messages(&self) -> bool {
        self.log.matches()
    }
}

/// `content` of every JSON message logged one per line; other lines are skipped
pub fn parse_json_messages(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!("Skipping unparsable client line: {}", e);
                None
            }
        })
        .map(|message| match message.get("content") {
            Some(Value::String(content)) => content.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .collect()
}
