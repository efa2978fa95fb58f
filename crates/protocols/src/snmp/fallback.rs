// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI fallback over `snmpwalk`/`snmpget`.
//!
//! When a native operation exceeds its deadline, the collector shells out
//! to the net-snmp tools, which cope with some agents the native stack
//! times out on. The child runs under a `timeout + 5s` wall clock and is
//! killed on expiry.

use super::oid;
use super::transport::SnmpValue;
use crate::error::CollectError;
use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackOp {
    Walk,
    Get,
}

/// Run the CLI tool and parse its `-On -Oq` output into a walk map.
pub async fn run(
    op: FallbackOp,
    host: &str,
    port: u16,
    community: &str,
    timeout_secs: u64,
    root: &str,
) -> Result<BTreeMap<String, SnmpValue>, CollectError> {
    let bin = match op {
        FallbackOp::Walk => "snmpwalk",
        FallbackOp::Get => "snmpget",
    };
    let target = format!("{host}:{port}");
    let timeout_arg = timeout_secs.to_string();
    let wall_clock = timeout_secs + 5;

    let mut command = Command::new(bin);
    command
        .args(["-v", "2c", "-c", community, "-t", &timeout_arg, "-r", "3", "-On", "-Oq"])
        .arg(&target)
        .arg(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command
        .spawn()
        .map_err(|e| CollectError::Io(format!("snmp fallback {target} {root}: spawn {bin}: {e}")))?;

    // Dropping the future on expiry kills the child via kill_on_drop.
    let output = tokio::time::timeout(Duration::from_secs(wall_clock), child.wait_with_output())
        .await
        .map_err(|_| CollectError::Timeout {
            what: format!("snmp fallback {target} {root}"),
            secs: wall_clock,
        })?
        .map_err(|e| CollectError::Io(format!("snmp fallback {target} {root}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CollectError::Protocol(format!(
            "snmp fallback {target} {root}: {bin} failed: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let map = parse_output(&stdout);
    if map.is_empty() {
        return Err(CollectError::Protocol(format!(
            "snmp fallback {target} {root}: no PDUs returned"
        )));
    }
    Ok(map)
}

/// Parse `OID VALUE` lines. Lines that do not begin with an OID are
/// continuation noise and are skipped.
pub(crate) fn parse_output(stdout: &str) -> BTreeMap<String, SnmpValue> {
    let mut map = BTreeMap::new();
    for line in stdout.lines() {
        let line = line.trim_end();
        if !line.starts_with('.') && !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let Some((key, rest)) = line.split_once(' ') else {
            continue;
        };
        map.insert(oid::normalize(key), parse_value(rest.trim_start()));
    }
    map
}

/// Strip the net-snmp type prefix and decode into a typed value.
pub(crate) fn parse_value(text: &str) -> SnmpValue {
    if let Some(rest) = text.strip_prefix("STRING:") {
        let rest = rest.trim();
        return SnmpValue::Str(rest.trim_matches('"').as_bytes().to_vec());
    }
    if let Some(rest) = text.strip_prefix("INTEGER:") {
        return match rest.trim().parse() {
            Ok(v) => SnmpValue::Int(v),
            Err(_) => SnmpValue::Str(rest.trim().as_bytes().to_vec()),
        };
    }
    for prefix in ["Counter32:", "Counter64:", "Gauge32:"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            return match rest.trim().parse() {
                Ok(v) => SnmpValue::Counter(v),
                Err(_) => SnmpValue::Str(rest.trim().as_bytes().to_vec()),
            };
        }
    }
    if let Some(rest) = text.strip_prefix("TimeTicks:") {
        // "TimeTicks: (12345) 0:02:03.45" — the parenthesized tick count
        let ticks = rest
            .trim()
            .strip_prefix('(')
            .and_then(|r| r.split_once(')'))
            .and_then(|(n, _)| n.parse().ok());
        return match ticks {
            Some(v) => SnmpValue::Ticks(v),
            None => SnmpValue::Str(rest.trim().as_bytes().to_vec()),
        };
    }
    if let Some(rest) = text.strip_prefix("OID:") {
        return SnmpValue::Oid(oid::normalize(rest.trim()));
    }
    if let Some(rest) = text.strip_prefix("IpAddress:") {
        return SnmpValue::Ip(rest.trim().to_string());
    }
    if let Some(rest) = text.strip_prefix("Hex-STRING:") {
        let bytes: Vec<u8> = rest
            .split_whitespace()
            .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
            .collect();
        return SnmpValue::Bytes(bytes);
    }
    SnmpValue::Str(text.trim_matches('"').as_bytes().to_vec())
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
