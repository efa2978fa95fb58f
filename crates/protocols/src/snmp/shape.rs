// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reshaping a walk map into rows and columns.
//!
//! Conceptually, a table OID ends `...COL.ROW`: the second-to-last
//! component selects the column, the last the row instance.

use super::transport::SnmpValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpRow {
    pub data: BTreeMap<i64, Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnmpTable {
    /// Column index → column label (the string form of the index unless a
    /// name was registered earlier).
    pub columns: BTreeMap<i64, String>,
    pub rows: BTreeMap<i64, SnmpRow>,
}

/// Shape a walk result into a table.
///
/// Keys whose row component does not parse land in row `-1`; consumers
/// skip that row.
pub fn shape_table(map: BTreeMap<String, SnmpValue>) -> SnmpTable {
    let mut table = SnmpTable::default();
    for (key, value) in map {
        let (col, row) = split_indices(&key);
        table.columns.entry(col).or_insert_with(|| col.to_string());
        table.rows.entry(row).or_default().data.insert(col, value.into_bytes());
    }
    table
}

/// Split `...a.b.COL.ROW` at the last two dot-separated components.
fn split_indices(oid: &str) -> (i64, i64) {
    let mut parts = oid.rsplitn(3, '.');
    let row = parts.next().and_then(|p| p.parse().ok()).unwrap_or(-1);
    let col = parts.next().and_then(|p| p.parse().ok()).unwrap_or(-1);
    (col, row)
}

#[cfg(test)]
#[path = "shape_tests.rs"]
mod tests;
