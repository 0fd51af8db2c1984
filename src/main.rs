// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use artemis_systemtests::config::Environment;
use artemis_systemtests::constants::labels::{MANAGED_BY, MANAGED_BY_VALUE};
use artemis_systemtests::kubernetes::KubeClient;
use artemis_systemtests::logging;

/// Housekeeping for the ArtemisCloud system tests
#[derive(Parser, Debug)]
#[command(name = "artemis-systemtests", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Delete namespaces left behind by crashed test runs
    Sweep {
        /// Label selector of the namespaces to delete
        #[arg(long, default_value_t = format!("{}={}", MANAGED_BY, MANAGED_BY_VALUE))]
        selector: String,

        /// Only list the namespaces that would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Wait until the Artemis CRDs are served by the cluster
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let environment = Environment::from_env()?;
    logging::init(&environment);

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let kube = KubeClient::connect(&environment)
        .await
        .context("Failed to connect to the Kubernetes cluster")?
        .with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending waits");
            cancel.cancel();
        }
    });

    match cli.command {
        Commands::Sweep { selector, dry_run } => sweep(&kube, &selector, dry_run).await,
        Commands::Check => {
            kube.wait_for_artemis_crds().await?;
            info!("Artemis CRDs are available");
            Ok(())
        }
    }
}

async fn sweep(kube: &KubeClient, selector: &str, dry_run: bool) -> Result<()> {
    let namespaces = kube.list_namespaces_by_label(selector).await?;
    info!("Found {} namespaces matching {}", namespaces.len(), selector);

    let mut failed = Vec::new();
    for namespace in namespaces {
        let name = namespace.name_any();
        if dry_run {
            info!("Would delete namespace {}", name);
            continue;
        }
        if let Err(e) = kube.delete_namespace(&name).await {
            warn!("Failed to delete namespace {}: {}", name, e);
            failed.push(name);
        }
    }

    if !failed.is_empty() {
        bail!("Failed to delete namespaces: {}", failed.join(", "));
    }
    Ok(())
}
