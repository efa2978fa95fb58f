// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential-store contract.
//!
//! The store itself lives outside the engine; collectors resolve an opaque
//! `cred_id` into a user/secret pair scoped by purpose.

use crate::error::CoreError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// What a credential is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Snmp,
    Ssh,
    Kubeconfig,
    Rest,
    Graph,
}

crate::simple_display! {
    Purpose {
        Snmp => "snmp",
        Ssh => "ssh",
        Kubeconfig => "kubeconfig",
        Rest => "rest",
        Graph => "graph",
    }
}

/// Resolved credential material.
///
/// Interpretation is per-protocol: SNMP uses `secret` as the community,
/// kubectl uses `user` as the context and `secret` as a base64 kubeconfig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub secret: String,
}

/// Contract the environment provides for credential resolution.
pub trait CredentialStore: Send + Sync + 'static {
    fn credential(&self, cred_id: &str, purpose: Purpose) -> Result<Credential, CoreError>;
}

/// In-memory credential store for tests and simulators.
#[derive(Clone, Default)]
pub struct MemoryCredentials {
    entries: Arc<RwLock<HashMap<(String, Purpose), Credential>>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        cred_id: impl Into<String>,
        purpose: Purpose,
        user: impl Into<String>,
        secret: impl Into<String>,
    ) {
        self.entries.write().insert(
            (cred_id.into(), purpose),
            Credential { user: user.into(), secret: secret.into() },
        );
    }
}

impl CredentialStore for MemoryCredentials {
    fn credential(&self, cred_id: &str, purpose: Purpose) -> Result<Credential, CoreError> {
        self.entries
            .read()
            .get(&(cred_id.to_string(), purpose))
            .cloned()
            .ok_or_else(|| CoreError::CredentialNotFound {
                cred_id: cred_id.to_string(),
                purpose: purpose.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_scoped_by_purpose() {
        let store = MemoryCredentials::new();
        store.insert("sim", Purpose::Snmp, "", "public");

        let cred = store.credential("sim", Purpose::Snmp).unwrap();
        assert_eq!(cred.secret, "public");

        let err = store.credential("sim", Purpose::Ssh).unwrap_err();
        assert!(matches!(err, CoreError::CredentialNotFound { .. }));
    }
}
