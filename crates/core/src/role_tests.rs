// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn rank_orders_fixed_roles() {
    assert!(Role::new("lead").rank() < Role::new("builder-a").rank());
    assert!(Role::new("builder-a").rank() < Role::new("reviewer").rank());
}

#[test]
fn rank_unknown_role_sorts_last() {
    assert_eq!(Role::new("scribe").rank(), usize::MAX);
}

#[test]
fn sort_roles_keeps_fixed_order_first_then_discovery_order_for_custom_roles() {
    let roles = vec![
        Role::new("scribe"),
        Role::new("tester"),
        Role::new("lead"),
        Role::new("archivist"),
        Role::new("builder-a"),
    ];
    let sorted = sort_roles(roles);
    let names: Vec<&str> = sorted.iter().map(Role::as_str).collect();
    assert_eq!(names, vec!["lead", "builder-a", "tester", "scribe", "archivist"]);
}

#[test]
fn is_lead() {
    assert!(Role::lead().is_lead());
    assert!(!Role::new("tester").is_lead());
}

#[test]
fn display_matches_as_str() {
    let r = Role::new("builder-b");
    assert_eq!(r.to_string(), "builder-b");
}
