// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

mod smoke;

use artemis_systemtests::config::Environment;
use artemis_systemtests::kubernetes::{random_namespace_name, KubeClient};
use artemis_systemtests::logging;
use artemis_systemtests::resources::ResourceManager;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

/// Path of a YAML file under `tests/fixtures`
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A test namespace with the cluster operator running in it.
///
/// Everything deployed through the context is removed on [`TestContext::teardown`], or
/// when the context is dropped, including after a panic.
pub struct TestContext {
    namespace: String,
    manager: Option<ResourceManager>,
}

impl TestContext {
    pub async fn setup(prefix: &str) -> Self {
        let environment = Environment::from_env().expect("invalid test environment");
        logging::init_for_tests(&environment);

        let kube = KubeClient::connect(&environment)
            .await
            .expect("failed to connect to the cluster");
        let namespace = random_namespace_name(prefix, environment.disable_random_namespaces);
        let mut context = Self {
            namespace: namespace.clone(),
            manager: Some(ResourceManager::new(kube, environment)),
        };

        context
            .deploy_operator_crds()
            .await
            .expect("failed to deploy the Artemis CRDs");
        context
            .create_namespace(&namespace)
            .await
            .expect("failed to create the test namespace");
        context
            .deploy_cluster_operator(&namespace)
            .await
            .expect("failed to deploy the cluster operator");
        context
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn teardown(mut self) {
        if let Some(mut manager) = self.manager.take() {
            manager
                .undeploy_all()
                .await
                .expect("teardown left resources behind");
        }
    }
}

impl Deref for TestContext {
    type Target = ResourceManager;

    fn deref(&self) -> &ResourceManager {
        self.manager.as_ref().expect("test context already torn down")
    }
}

impl DerefMut for TestContext {
    fn deref_mut(&mut self) -> &mut ResourceManager {
        self.manager.as_mut().expect("test context already torn down")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let Some(mut manager) = self.manager.take() else {
            return;
        };

        // the existing client belongs to the test runtime, which is blocked here
        let _ = std::thread::spawn(move || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to create tokio runtime")
                .block_on(async move {
                    let kube = KubeClient::connect(manager.environment())
                        .await
                        .expect("failed to reconnect for teardown");
                    manager.replace_client(kube);
                    if let Err(e) = manager.undeploy_all().await {
                        eprintln!("Teardown after failed test incomplete: {}", e);
                    }
                });
        })
        .join();
    }
}
