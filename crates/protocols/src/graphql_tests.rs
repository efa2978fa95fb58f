// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use picket_core::target::HostProtocolBuilder;
use picket_core::{Cadence, EngineConfig, JobBuilder, MemoryCredentials};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn graph_resources() -> Resources {
    let creds = MemoryCredentials::new();
    creds.insert("api", Purpose::Graph, "reader", "s3cret");
    Resources::new(Arc::new(creds), EngineConfig::default())
}

fn graph_config(addr: &SocketAddr) -> HostProtocol {
    HostProtocolBuilder::default()
        .protocol(Protocol::GraphQl)
        .addr(addr.ip().to_string())
        .port(addr.port())
        .timeout_secs(5)
        .cred_id("api")
        .http_prefix("http")
        .build()
}

fn graph_poll(query: &str) -> Poll {
    Poll {
        name: "inventory".to_string(),
        protocol: Protocol::GraphQl,
        what: query.to_string(),
        operation: None,
        cadence: Cadence::new(vec![60]),
        timeout_secs: 5,
        resp_name: None,
        body_name: None,
        always: false,
    }
}

/// One-request HTTP stub: captures the raw request bytes and answers with
/// the given status line and body.
async fn one_shot_server(
    status: &'static str,
    body: &'static str,
) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&raw).to_string()
    });
    (addr, handle)
}

/// Headers received and the body matches its content-length.
fn request_complete(raw: &[u8]) -> bool {
    let Some(split) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&raw[..split]).to_ascii_lowercase();
    let body_len = headers
        .lines()
        .find_map(|line| {
            line.strip_prefix("content-length:").and_then(|v| v.trim().parse::<usize>().ok())
        })
        .unwrap_or(0);
    raw.len() >= split + 4 + body_len
}

#[test]
fn query_envelope_is_bare_query_field() {
    let envelope = QueryEnvelope { query: "query { devices { id } }" };
    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        serde_json::json!({"query": "query { devices { id } }"})
    );
}

#[test]
fn endpoint_appends_graphql_path() {
    let config = HostProtocolBuilder::default()
        .protocol(Protocol::GraphQl)
        .addr("10.0.0.5")
        .port(443)
        .cred_id("api")
        .build();
    let mut collector = GraphQlCollector::new();
    collector.init(&config, &graph_resources()).unwrap();

    assert_eq!(collector.endpoint, "https://10.0.0.5:443/graphql");
}

#[tokio::test]
async fn exec_posts_envelope_with_basic_auth() {
    let (addr, server) = one_shot_server("200 OK", "{\"data\":{\"devices\":[]}}").await;
    let mut collector = GraphQlCollector::new();
    collector.init(&graph_config(&addr), &graph_resources()).unwrap();

    let mut job = JobBuilder::default().name("inventory").build();
    collector.exec(&graph_poll("query { devices { id } }"), &mut job).await;

    assert_eq!(job.error, "");
    assert_eq!(job.result, Some(b"{\"data\":{\"devices\":[]}}".to_vec()));
    assert!(collector.online());

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /graphql HTTP/1.1"), "request line: {raw}");
    let auth = format!("authorization: Basic {}", BASE64.encode("reader:s3cret"));
    assert!(raw.contains(&auth), "missing basic auth in: {raw}");

    let split = raw.find("\r\n\r\n").unwrap();
    let body: serde_json::Value = serde_json::from_str(&raw[split + 4..]).unwrap();
    assert_eq!(body, serde_json::json!({"query": "query { devices { id } }"}));
}

#[tokio::test]
async fn non_2xx_is_protocol_error() {
    let (addr, server) = one_shot_server("500 Internal Server Error", "boom").await;
    let mut collector = GraphQlCollector::new();
    collector.init(&graph_config(&addr), &graph_resources()).unwrap();

    let mut job = JobBuilder::default().build();
    collector.exec(&graph_poll("query { up }"), &mut job).await;

    assert!(job.error.contains("status 500"), "error was: {}", job.error);
    assert!(job.error.contains("boom"));
    assert_eq!(job.error_count, 1);
    assert!(job.result.is_none());
    assert!(!collector.online());
    server.await.unwrap();
}

#[tokio::test]
async fn success_resets_error_streak() {
    let (addr, _server) = one_shot_server("200 OK", "{}").await;
    let mut collector = GraphQlCollector::new();
    collector.init(&graph_config(&addr), &graph_resources()).unwrap();

    let mut job = JobBuilder::default().error_count(3).build();
    collector.exec(&graph_poll("query { up }"), &mut job).await;

    assert_eq!(job.error, "");
    assert_eq!(job.error_count, 0);
}

#[tokio::test]
async fn connect_requires_init() {
    let mut collector = GraphQlCollector::new();
    assert!(matches!(collector.connect().await, Err(CollectError::NotConnected)));
}

#[test]
fn missing_credential_fails_init() {
    let config = HostProtocolBuilder::default()
        .protocol(Protocol::GraphQl)
        .cred_id("absent")
        .build();
    let mut collector = GraphQlCollector::new();
    let err = collector.init(&config, &graph_resources()).unwrap_err();
    assert!(matches!(err, CollectError::Credential(_)));
}
