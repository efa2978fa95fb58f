// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use picket_core::JobBuilder;
use proptest::prelude::*;
use std::collections::HashMap;

fn job_with_args(pairs: &[(&str, &str)]) -> picket_core::Job {
    let arguments: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    JobBuilder::default().arguments(arguments).build()
}

#[test]
fn substitutes_all_tokens() {
    let job = job_with_args(&[("namespace", "kube-system"), ("label", "app=nginx")]);
    let out = substitute_args("get pods -n $namespace -l $label", &job);
    assert_eq!(out, "get pods -n kube-system -l app=nginx ");
}

#[test]
fn empty_arguments_returns_input() {
    let job = JobBuilder::default().build();
    let what = "get pods -n $namespace";
    assert_eq!(substitute_args(what, &job), what);
}

#[test]
fn missing_argument_returns_input() {
    let job = job_with_args(&[("namespace", "kube-system")]);
    let what = "get pods -n $namespace -l $label";
    assert_eq!(substitute_args(what, &job), what);
}

#[test]
fn no_tokens_still_gains_trailing_space() {
    let job = job_with_args(&[("unused", "x")]);
    assert_eq!(substitute_args("show version", &job), "show version ");
}

#[test]
fn bare_dollar_is_a_missing_argument() {
    let job = job_with_args(&[("a", "1")]);
    let what = "echo $";
    assert_eq!(substitute_args(what, &job), what);
}

#[test]
fn consecutive_spaces_preserved() {
    let job = job_with_args(&[("a", "1")]);
    assert_eq!(substitute_args("x  $a", &job), "x  1 ");
}

proptest! {
    /// Without arguments the function is the identity, whatever the input.
    #[test]
    fn identity_without_arguments(what in "[ -~]{0,40}") {
        let job = JobBuilder::default().build();
        prop_assert_eq!(substitute_args(&what, &job), what);
    }
}
