// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use super::client::KubeClient;
use crate::constants::artemis::{GROUP, KIND_ADDRESS, KIND_BROKER, KIND_SECURITY, VERSION};
use crate::constants::durations::{MINUTES_3, SECONDS_5};
use crate::error::Result;
use kube::discovery::Discovery;
use tracing::{info, instrument, warn};

const ARTEMIS_KINDS: [&str; 3] = [KIND_BROKER, KIND_ADDRESS, KIND_SECURITY];

impl KubeClient {
    /// Wait for every Artemis custom resource kind to be served by the API server
    #[instrument(skip(self))]
    pub async fn wait_for_artemis_crds(&self) -> Result<()> {
        self.wait_for(
            &format!("{}/{} CRDs", GROUP, VERSION),
            SECONDS_5,
            MINUTES_3,
            || async move {
                match self.missing_artemis_kinds().await {
                    Ok(missing) if missing.is_empty() => Ok(true),
                    Ok(missing) => {
                        info!("Artemis CRDs not yet available: {}", missing.join(", "));
                        Ok(false)
                    }
                    Err(e) => {
                        warn!("Error checking for Artemis CRDs: {}", e);
                        Ok(false)
                    }
                }
            },
        )
        .await?;
        info!("Artemis CRDs ({}/{}) are available", GROUP, VERSION);
        Ok(())
    }

    /// Artemis kinds not currently discoverable
    pub async fn missing_artemis_kinds(&self) -> Result<Vec<&'static str>> {
        let discovery = Discovery::new(self.client().clone())
            .filter(&[GROUP])
            .run()
            .await?;

        let served: Vec<String> = discovery
            .groups()
            .filter(|group| group.name() == GROUP)
            .flat_map(|group| group.versioned_resources(VERSION))
            .map(|(resource, _)| resource.kind)
            .collect();

        Ok(missing_kinds(&served))
    }
}

fn missing_kinds(served: &[String]) -> Vec<&'static str> {
    ARTEMIS_KINDS
        .into_iter()
        .filter(|kind| !served.iter().any(|s| s == kind))
        .collect()
}
