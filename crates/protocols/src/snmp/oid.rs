// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OID string normalization and subtree checks.

/// Canonical dotted-decimal form: a leading dot is ensured and the `iso.`
/// prefix is rewritten to `.1.`.
pub fn normalize(oid: &str) -> String {
    let oid = oid.trim();
    if let Some(rest) = oid.strip_prefix("iso.") {
        return format!(".1.{rest}");
    }
    if oid.starts_with('.') {
        oid.to_string()
    } else {
        format!(".{oid}")
    }
}

/// True when `oid` lies under `root`. Both must be normalized.
pub fn in_subtree(root: &str, oid: &str) -> bool {
    oid == root || (oid.starts_with(root) && oid.as_bytes().get(root.len()) == Some(&b'.'))
}

#[cfg(test)]
#[path = "oid_tests.rs"]
mod tests;
