// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bookkeeping of everything a test deployed, so teardown can remove it.

use crate::operator::ClusterOperator;
use kube::ResourceExt;

/// Namespace and name of a deployed object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedRef {
    pub namespace: String,
    pub name: String,
}

impl TrackedRef {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Reference an object, using `namespace` when the object does not carry one
    pub fn of<K: ResourceExt>(namespace: &str, object: &K) -> Self {
        Self {
            namespace: object.namespace().unwrap_or_else(|| namespace.to_string()),
            name: object.name_any(),
        }
    }
}

/// Resources deployed through a [`ResourceManager`](super::ResourceManager), kept in
/// creation order
#[derive(Debug, Default)]
pub struct DeployedResources {
    pub namespaces: Vec<String>,
    pub brokers: Vec<TrackedRef>,
    pub addresses: Vec<TrackedRef>,
    pub securities: Vec<TrackedRef>,
    pub clients: Vec<TrackedRef>,
    pub operators: Vec<ClusterOperator>,
}

fn track(list: &mut Vec<TrackedRef>, reference: TrackedRef) {
    if !list.contains(&reference) {
        list.push(reference);
    }
}

fn untrack(list: &mut Vec<TrackedRef>, reference: &TrackedRef) {
    list.retain(|r| r != reference);
}

impl DeployedResources {
    pub fn track_namespace(&mut self, name: &str) {
        if !self.namespaces.iter().any(|n| n == name) {
            self.namespaces.push(name.to_string());
        }
    }

    pub fn untrack_namespace(&mut self, name: &str) {
        self.namespaces.retain(|n| n != name);
    }

    pub fn track_broker(&mut self, reference: TrackedRef) {
        track(&mut self.brokers, reference);
    }

    pub fn untrack_broker(&mut self, reference: &TrackedRef) {
        untrack(&mut self.brokers, reference);
    }

    pub fn track_address(&mut self, reference: TrackedRef) {
        track(&mut self.addresses, reference);
    }

    pub fn untrack_address(&mut self, reference: &TrackedRef) {
        untrack(&mut self.addresses, reference);
    }

    pub fn track_security(&mut self, reference: TrackedRef) {
        track(&mut self.securities, reference);
    }

    pub fn untrack_security(&mut self, reference: &TrackedRef) {
        untrack(&mut self.securities, reference);
    }

    pub fn track_clients(&mut self, reference: TrackedRef) {
        track(&mut self.clients, reference);
    }

    pub fn untrack_clients(&mut self, reference: &TrackedRef) {
        untrack(&mut self.clients, reference);
    }

    /// Operators are identified by the namespace they run in
    pub fn track_operator(&mut self, operator: ClusterOperator) {
        self.untrack_operator(operator.namespace());
        self.operators.push(operator);
    }

    pub fn untrack_operator(&mut self, namespace: &str) -> Option<ClusterOperator> {
        let index = self
            .operators
            .iter()
            .position(|o| o.namespace() == namespace)?;
        Some(self.operators.remove(index))
    }

    pub fn operator(&self, namespace: &str) -> Option<&ClusterOperator> {
        self.operators.iter().find(|o| o.namespace() == namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
            && self.brokers.is_empty()
            && self.addresses.is_empty()
            && self.securities.is_empty()
            && self.clients.is_empty()
            && self.operators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActiveMQArtemis, ActiveMQArtemisSpec};

    #[test]
    fn test_track_is_idempotent() {
        let mut deployed = DeployedResources::default();

        deployed.track_broker(TrackedRef::new("ns", "broker"));
        deployed.track_broker(TrackedRef::new("ns", "broker"));
        deployed.track_broker(TrackedRef::new("other", "broker"));

        assert_eq!(deployed.brokers.len(), 2);

        deployed.untrack_broker(&TrackedRef::new("ns", "broker"));
        assert_eq!(deployed.brokers, vec![TrackedRef::new("other", "broker")]);
    }

    #[test]
    fn test_tracked_ref_prefers_object_namespace() {
        let mut broker = ActiveMQArtemis::new("broker", ActiveMQArtemisSpec::default());
        assert_eq!(TrackedRef::of("fallback", &broker).namespace, "fallback");

        broker.metadata.namespace = Some("actual".to_string());
        assert_eq!(TrackedRef::of("fallback", &broker), TrackedRef::new("actual", "broker"));
    }

    #[test]
    fn test_namespaces() {
        let mut deployed = DeployedResources::default();
        assert!(deployed.is_empty());

        deployed.track_namespace("smoke-tests-abc123");
        deployed.track_namespace("smoke-tests-abc123");
        assert_eq!(deployed.namespaces.len(), 1);
        assert!(!deployed.is_empty());

        deployed.untrack_namespace("smoke-tests-abc123");
        assert!(deployed.is_empty());
    }
}
