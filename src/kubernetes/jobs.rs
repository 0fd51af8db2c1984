// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::client::{filter_by_prefix, KubeClient};
use crate::error::Result;
use k8s_openapi::api::batch::v1::{Job, JobStatus};
use kube::{api::ListParams, Api};

impl KubeClient {
    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client().clone(), namespace)
    }

    pub async fn list_jobs(&self, namespace: &str) -> Result<Vec<Job>> {
        Ok(self.jobs(namespace).list(&ListParams::default()).await?.items)
    }

    /// Whether any job name starts with `prefix`
    pub async fn job_exists(&self, namespace: &str, prefix: &str) -> Result<bool> {
        Ok(!filter_by_prefix(self.list_jobs(namespace).await?, prefix).is_empty())
    }

    pub async fn get_job(&self, namespace: &str, name: &str) -> Result<Option<Job>> {
        Ok(self.jobs(namespace).get_opt(name).await?)
    }

    pub async fn job_status(&self, namespace: &str, name: &str) -> Result<Option<JobStatus>> {
        Ok(self.get_job(namespace, name).await?.and_then(|job| job.status))
    }

    /// True when the job reports exactly `expected` succeeded pods
    pub async fn check_succeeded_job_status(
        &self,
        namespace: &str,
        name: &str,
        expected: i32,
    ) -> Result<bool> {
        let status = self.job_status(namespace, name).await?;
        Ok(status.and_then(|s| s.succeeded) == Some(expected))
    }

    /// True when the job reports exactly `expected` failed pods
    pub async fn check_failed_job_status(
        &self,
        namespace: &str,
        name: &str,
        expected: i32,
    ) -> Result<bool> {
        let status = self.job_status(namespace, name).await?;
        Ok(status.and_then(|s| s.failed) == Some(expected))
    }
}
