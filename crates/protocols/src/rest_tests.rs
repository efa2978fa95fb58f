// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use picket_core::target::HostProtocolBuilder;
use yare::parameterized;

#[test]
fn parses_method_path_body() {
    let call = parse_what("POST::/restconf/data::{\"depth\": 2}").unwrap();
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/restconf/data");
    assert_eq!(call.body, Some(serde_json::json!({"depth": 2})));
}

#[test]
fn body_is_optional() {
    let call = parse_what("GET::/restconf/data/interfaces").unwrap();
    assert_eq!(call.method, Method::GET);
    assert!(call.body.is_none());
}

#[parameterized(
    lowercase = { "get::/x" },
    patch = { "PATCH::/x" },
    delete = { "DELETE::/x" },
)]
fn accepted_methods(what: &str) {
    assert!(parse_what(what).is_ok());
}

#[test]
fn unknown_method_is_config_error() {
    let err = parse_what("HEAD::/x").unwrap_err();
    assert!(matches!(err, CollectError::Config(_)));
}

#[test]
fn missing_path_is_config_error() {
    let err = parse_what("GET").unwrap_err();
    assert!(matches!(err, CollectError::Config(_)));
}

#[test]
fn malformed_body_is_config_error() {
    let err = parse_what("POST::/x::{not json").unwrap_err();
    assert!(matches!(err, CollectError::Config(_)));
}

#[test]
fn base_url_defaults_to_https() {
    let config = HostProtocolBuilder::default()
        .protocol(picket_core::Protocol::Restconf)
        .addr("10.0.0.5")
        .port(443)
        .build();
    assert_eq!(base_url(&config), "https://10.0.0.5:443");
}

#[test]
fn base_url_honors_full_prefix() {
    let config = HostProtocolBuilder::default()
        .addr("10.0.0.5")
        .port(8080)
        .http_prefix("http://")
        .build();
    assert_eq!(base_url(&config), "http://10.0.0.5:8080");
}

#[test]
fn base_url_honors_bare_scheme() {
    let config =
        HostProtocolBuilder::default().addr("h").port(80).http_prefix("http").build();
    assert_eq!(base_url(&config), "http://h:80");
}
