// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "artemis-systemtests";

/// Kubernetes label keys and values used by the harness
pub mod labels {
    /// Marks every namespace created by the harness so orphans can be swept
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    pub const MANAGED_BY_VALUE: &str = "artemis-systemtests";
    pub const APP: &str = "app";
    pub const NODE_ROLE_WORKER: &str = "node-role.kubernetes.io/worker";
    pub const NODE_ROLE_MASTER: &str = "node-role.kubernetes.io/master";
}

/// Poll intervals and timeouts
pub mod durations {
    use std::time::Duration;

    pub const SECONDS_2: Duration = Duration::from_secs(2);
    pub const SECONDS_5: Duration = Duration::from_secs(5);
    pub const MINUTE_1: Duration = Duration::from_secs(60);
    pub const MINUTES_3: Duration = Duration::from_secs(180);

    /// Base wait for a broker stateful set to become ready
    pub const BROKER_READY_BASE: Duration = Duration::from_secs(90);
    /// Time the broker needs to pick up a freshly applied address
    pub const ADDRESS_SETTLE: Duration = SECONDS_5;
    /// Time a background subscriber is given to attach before anything is sent
    pub const SUBSCRIBER_SETTLE: Duration = SECONDS_5;
}

/// Artemis custom resource identifiers
pub mod artemis {
    pub const GROUP: &str = "broker.amq.io";
    pub const VERSION: &str = "v1beta1";
    pub const KIND_BROKER: &str = "ActiveMQArtemis";
    pub const KIND_ADDRESS: &str = "ActiveMQArtemisAddress";
    pub const KIND_SECURITY: &str = "ActiveMQArtemisSecurity";

    pub const ROUTING_TYPE_ANYCAST: &str = "anycast";
    pub const ROUTING_TYPE_MULTICAST: &str = "multicast";

    pub const STATEFULSET_SUFFIX: &str = "-ss";
    pub const HEADLESS_SERVICE_SUFFIX: &str = "-hdls-svc";
    /// Port name exposing every protocol on the headless service
    pub const ALL_PORT_NAME: &str = "all";
    pub const ARTEMIS_CLI: &str = "/home/jboss/amq-broker/bin/artemis";
}

/// Cluster operator settings
pub mod operator {
    pub const DEPLOYMENT_NAME: &str = "activemq-artemis-controller-manager";
    pub const WATCH_NAMESPACE_ENV: &str = "WATCH_NAMESPACE";
    pub const OLM_PACKAGE: &str = "activemq-artemis-operator";
    pub const OLM_CHANNEL: &str = "upgrade";
    pub const OLM_DEFAULT_SOURCE: &str = "community-operators";
    pub const OLM_DEFAULT_SOURCE_NAMESPACE: &str = "openshift-marketplace";
}

/// Messaging clients container
pub mod clients {
    pub const DEPLOYMENT_NAME: &str = "systemtests-clients";
    pub const DEFAULT_IMAGE: &str = "quay.io/rhmessagingqe/cli-java:latest";
    pub const SECRETS_MOUNT_DIR: &str = "/etc";
    pub const QPID_SENDER: &str = "cli-qpid-sender";
    pub const QPID_RECEIVER: &str = "cli-qpid-receiver";
    pub const AMQP_PORT: &str = "5672";
}
