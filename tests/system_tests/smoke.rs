// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{fixture, TestContext};
use artemis_systemtests::clients::{
    BundledClient, ClientOptions, MessagingClient, Protocol, QpidClient,
};
use artemis_systemtests::constants::clients::{AMQP_PORT, DEPLOYMENT_NAME};
use artemis_systemtests::kubernetes::{pod_ip, service_port};
use artemis_systemtests::resources::{broker_ready_timeout, create_acceptor};
use artemis_systemtests::types::{ActiveMQArtemis, ActiveMQArtemisAddress};
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

const MESSAGES: usize = 100;
const AMQP_ACCEPTOR: &str = "amqp-owire-acceptor";

async fn broker_with_address(ctx: &mut TestContext) -> (ActiveMQArtemis, ActiveMQArtemisAddress, Pod) {
    let namespace = ctx.namespace().to_string();
    let broker = ctx
        .create_artemis_from_file(&namespace, &fixture("artemis_single.yaml"), true)
        .await
        .expect("broker did not become ready");
    let address = ctx
        .create_artemis_address_from_file(&namespace, &fixture("address_queue.yaml"))
        .await
        .expect("failed to create the address");
    let pod = ctx
        .kube()
        .get_first_pod_by_prefix(&namespace, &broker.name_any())
        .await
        .expect("failed to list broker pods")
        .expect("no broker pod");
    (broker, address, pod)
}

async fn assert_exchange(client: &mut dyn MessagingClient) {
    let sent = client.send_messages().await.expect("send failed");
    let received = client.receive_messages().await.expect("receive failed");

    assert_eq!(sent, MESSAGES);
    assert_eq!(received, sent);
    assert!(client.compare_messages());
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with the Artemis operator manifests"]
async fn default_single_broker_deployment() {
    let mut ctx = TestContext::setup("smoke-tests").await;
    let namespace = ctx.namespace().to_string();

    let broker = ctx
        .create_artemis_from_file(&namespace, &fixture("artemis_single.yaml"), true)
        .await
        .expect("broker did not become ready");
    let pods = ctx
        .kube()
        .list_pods_by_prefix(&namespace, &broker.name_any())
        .await
        .unwrap();
    assert_eq!(pods.len(), 1);

    ctx.delete_artemis(&namespace, &broker, true, broker_ready_timeout(1))
        .await
        .unwrap();
    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with the Artemis operator manifests"]
async fn send_receive_core_messages() {
    let mut ctx = TestContext::setup("smoke-tests").await;
    let namespace = ctx.namespace().to_string();
    let (broker, address, pod) = broker_with_address(&mut ctx).await;
    let port = ctx
        .artemis_service_port(&namespace, &broker, None)
        .await
        .unwrap();

    let options = ClientOptions::new(
        &pod,
        pod_ip(&pod).unwrap(),
        &port.to_string(),
        address.address_name(),
        address.queue_name(),
        MESSAGES,
    )
    .unwrap();
    let mut client = BundledClient::new(ctx.kube().clone(), Protocol::Core, options);
    assert_exchange(&mut client).await;

    ctx.delete_artemis_address(&namespace, &address).await.unwrap();
    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with the Artemis operator manifests"]
async fn send_receive_amqp_messages_through_new_acceptor() {
    let mut ctx = TestContext::setup("smoke-tests").await;
    let namespace = ctx.namespace().to_string();
    let broker = ctx
        .create_artemis_from_file(&namespace, &fixture("artemis_single.yaml"), true)
        .await
        .unwrap();
    let broker = ctx
        .add_acceptors(
            &namespace,
            vec![create_acceptor(AMQP_ACCEPTOR, "amqp,openwire", 5672)],
            broker,
        )
        .await
        .expect("broker pod did not reload with the new acceptor");
    let address = ctx
        .create_artemis_address_from_file(&namespace, &fixture("address_queue.yaml"))
        .await
        .unwrap();

    let pod = ctx
        .kube()
        .get_first_pod_by_prefix(&namespace, &broker.name_any())
        .await
        .unwrap()
        .unwrap();
    let service = ctx
        .kube()
        .get_service_broker_acceptor(&namespace, &broker.name_any(), AMQP_ACCEPTOR)
        .await
        .unwrap();
    let port = service
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .and_then(|ports| ports.first())
        .map(|p| p.port)
        .expect("acceptor service has no port");

    let options = ClientOptions::new(
        &pod,
        pod_ip(&pod).unwrap(),
        &port.to_string(),
        address.address_name(),
        address.queue_name(),
        MESSAGES,
    )
    .unwrap();
    let mut client = BundledClient::new(ctx.kube().clone(), Protocol::Amqp, options);
    assert_exchange(&mut client).await;

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with the Artemis operator manifests"]
async fn subscriber_receives_published_messages() {
    let mut ctx = TestContext::setup("smoke-tests").await;
    let namespace = ctx.namespace().to_string();
    let (broker, address, pod) = broker_with_address(&mut ctx).await;
    let service = ctx.artemis_headless_service(&namespace, &broker).await.unwrap();
    let port = service_port(&service, "all").expect("no 'all' port");

    let options = ClientOptions::new(
        &pod,
        pod_ip(&pod).unwrap(),
        &port.to_string(),
        address.address_name(),
        address.queue_name(),
        MESSAGES,
    )
    .unwrap();
    let mut client = BundledClient::new(ctx.kube().clone(), Protocol::Core, options);
    client.subscribe().await.unwrap();
    assert_exchange(&mut client).await;

    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with the Artemis operator manifests"]
async fn send_receive_with_clients_container() {
    let mut ctx = TestContext::setup("smoke-tests").await;
    let namespace = ctx.namespace().to_string();
    let clients_pod = ctx
        .deploy_clients_container(&namespace)
        .await
        .expect("clients container did not start");
    let broker = ctx
        .create_artemis_from_file(&namespace, &fixture("artemis_single.yaml"), true)
        .await
        .unwrap();
    let broker = ctx
        .add_acceptors(
            &namespace,
            vec![create_acceptor(AMQP_ACCEPTOR, "amqp,openwire", 5672)],
            broker,
        )
        .await
        .unwrap();
    let address = ctx
        .create_artemis_address_from_file(&namespace, &fixture("address_queue.yaml"))
        .await
        .unwrap();
    let broker_pod = ctx
        .kube()
        .get_first_pod_by_prefix(&namespace, &broker.name_any())
        .await
        .unwrap()
        .unwrap();
    let options = ClientOptions::new(
        &clients_pod,
        pod_ip(&broker_pod).unwrap(),
        AMQP_PORT,
        address.address_name(),
        address.queue_name(),
        MESSAGES,
    )
    .unwrap()
    .with_container(DEPLOYMENT_NAME);

    let mut client = QpidClient::new(ctx.kube().clone(), options.clone());
    assert_exchange(&mut client).await;

    let mut subscriber = QpidClient::new(ctx.kube().clone(), options);
    subscriber.subscribe().await.unwrap();
    assert_exchange(&mut subscriber).await;

    ctx.undeploy_clients_container(&namespace).await.unwrap();
    ctx.teardown().await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with the Artemis operator manifests"]
async fn send_receive_openwire_messages() {
    let mut ctx = TestContext::setup("smoke-tests").await;
    let namespace = ctx.namespace().to_string();
    let (broker, address, pod) = broker_with_address(&mut ctx).await;
    let port = ctx
        .artemis_service_port(&namespace, &broker, None)
        .await
        .unwrap();

    let options = ClientOptions::new(
        &pod,
        pod_ip(&pod).unwrap(),
        &port.to_string(),
        address.address_name(),
        address.queue_name(),
        MESSAGES,
    )
    .unwrap();
    let mut client = BundledClient::new(ctx.kube().clone(), Protocol::Openwire, options);
    assert_exchange(&mut client).await;

    ctx.teardown().await;
}
