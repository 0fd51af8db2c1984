// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Running commands inside pods

use super::client::KubeClient;
use crate::error::{Result, SystemTestError};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::api::{Api, AttachParams};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, instrument, trace};

/// Captured result of a command run in a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl KubeClient {
    /// Run `command` in a container of the pod and collect its output.
    ///
    /// A non-zero exit code is reported through [`ExecOutput::success`], not as an error.
    #[instrument(skip(self, command), fields(command = %command.join(" ")))]
    pub async fn exec_in_pod(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
        command: Vec<String>,
    ) -> Result<ExecOutput> {
        let api: Api<Pod> = Api::namespaced(self.client().clone(), namespace);
        let mut params = AttachParams::default().stdout(true).stderr(true);
        if let Some(container) = container {
            params = params.container(container);
        }

        debug!("[{}] Executing in pod {}", namespace, pod);
        let mut attached = api.exec(pod, command, &params).await?;

        let stdout = attached.stdout();
        let stderr = attached.stderr();
        let status = attached.take_status();
        let (stdout, stderr) = tokio::join!(read_stream(stdout), read_stream(stderr));
        let status = match status {
            Some(status) => status.await,
            None => None,
        };
        attached.join().await.map_err(|e| SystemTestError::ExecError {
            pod: pod.to_string(),
            message: e.to_string(),
        })?;

        let output = ExecOutput {
            stdout: stdout?,
            stderr: stderr?,
            success: exit_succeeded(status.as_ref()),
        };
        trace!("[{}] {} stdout:\n{}", namespace, pod, output.stdout);
        Ok(output)
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> Result<String> {
    let mut out = String::new();
    if let Some(mut stream) = stream {
        stream.read_to_string(&mut out).await?;
    }
    Ok(out)
}

/// The API server reports `Success` for exit code 0 and `Failure` with the code otherwise
pub fn exit_succeeded(status: Option<&Status>) -> bool {
    status.and_then(|s| s.status.as_deref()) == Some("Success")
}
