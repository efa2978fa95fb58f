// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use picket_core::target::HostProtocolBuilder;
use picket_core::{Cadence, EngineConfig, JobBuilder, MemoryCredentials};
use std::collections::HashMap;
use std::sync::Arc;

fn resources_with_kubeconfig() -> Resources {
    let creds = MemoryCredentials::new();
    creds.insert(
        "cluster-1",
        Purpose::Kubeconfig,
        "prod-context",
        BASE64.encode(b"apiVersion: v1\nkind: Config\n"),
    );
    Resources::new(Arc::new(creds), EngineConfig::default())
}

fn kubectl_config() -> picket_core::HostProtocol {
    HostProtocolBuilder::default()
        .protocol(Protocol::Kubectl)
        .cred_id("cluster-1")
        .build()
}

fn kubectl_poll(what: &str) -> Poll {
    Poll {
        name: "pods".to_string(),
        protocol: Protocol::Kubectl,
        what: what.to_string(),
        operation: None,
        cadence: Cadence::new(vec![60]),
        timeout_secs: 0,
        resp_name: None,
        body_name: None,
        always: false,
    }
}

#[test]
fn init_materializes_kubeconfig() {
    let mut collector = KubectlCollector::new();
    collector.init(&kubectl_config(), &resources_with_kubeconfig()).unwrap();

    let path = collector.kubeconfig.as_ref().unwrap().path().to_path_buf();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("kind: Config"));
    assert_eq!(collector.context, "prod-context");
}

#[test]
fn init_rejects_bad_base64() {
    let creds = MemoryCredentials::new();
    creds.insert("cluster-1", Purpose::Kubeconfig, "ctx", "not-base64!!!");
    let resources = Resources::new(Arc::new(creds), EngineConfig::default());

    let mut collector = KubectlCollector::new();
    let err = collector.init(&kubectl_config(), &resources).unwrap_err();
    assert!(matches!(err, CollectError::Config(_)));
}

#[test]
fn script_line_substitutes_arguments() {
    let mut collector = KubectlCollector::new();
    collector.init(&kubectl_config(), &resources_with_kubeconfig()).unwrap();

    let arguments: HashMap<String, String> =
        [("namespace".to_string(), "kube-system".to_string())].into_iter().collect();
    let job = JobBuilder::default().arguments(arguments).build();
    let line = collector.script_line(&kubectl_poll("get pods -n $namespace"), &job).unwrap();

    assert!(line.starts_with("kubectl --kubeconfig="));
    assert!(line.contains("--context=prod-context"));
    assert!(line.ends_with("get pods -n kube-system \n"));
}

#[tokio::test]
async fn disconnect_releases_kubeconfig() {
    let mut collector = KubectlCollector::new();
    collector.init(&kubectl_config(), &resources_with_kubeconfig()).unwrap();
    let path = collector.kubeconfig.as_ref().unwrap().path().to_path_buf();

    collector.disconnect().await;

    assert!(!path.exists());
}
