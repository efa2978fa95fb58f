// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    bare = { "1.3", ".1.3" },
    dotted = { ".1.3", ".1.3" },
    iso = { "iso.3.6.1", ".1.3.6.1" },
    padded = { "  1.3.6 ", ".1.3.6" },
)]
fn normalize_forms(input: &str, expected: &str) {
    assert_eq!(normalize(input), expected);
}

proptest! {
    /// Normalization is idempotent over arbitrary dotted-decimal input.
    #[test]
    fn normalize_idempotent(oid in "(iso\\.|\\.)?[0-9]{1,3}(\\.[0-9]{1,3}){0,8}") {
        let once = normalize(&oid);
        prop_assert_eq!(normalize(&once), once);
    }
}

#[test]
fn subtree_membership() {
    assert!(in_subtree(".1.3.6", ".1.3.6"));
    assert!(in_subtree(".1.3.6", ".1.3.6.1.2"));
    assert!(!in_subtree(".1.3.6", ".1.3.7"));
    // prefix match without a component boundary is not membership
    assert!(!in_subtree(".1.3.6", ".1.3.61"));
}
