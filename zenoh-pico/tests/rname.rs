//
// Copyright (c) 2017, 2020 ADLINK Technology Inc.
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ADLINK zenoh team, <zenoh@adlink-labs.tech>
//
use zenoh_pico::core::rname::intersect;
use zenoh_pico::core::ResKey;

#[test]
fn rname_exact() {
    assert!(intersect("/", "/"));
    assert!(intersect("/demo", "/demo"));
    assert!(intersect("/demo/", "/demo"));
    assert!(intersect("/demo", "/demo/"));
    assert!(intersect("/demo/a/b", "/demo/a/b"));
    assert!(!intersect("/demo/a", "/a"));
    assert!(!intersect("/demo/a", "/demo/b"));
    assert!(!intersect("/demo", "/demo/a"));
}

#[test]
fn rname_chunk_wildcard() {
    assert!(intersect("/*", "/demo"));
    assert!(intersect("/*", "/demo/"));
    assert!(intersect("/*/", "/demo"));
    assert!(!intersect("/*", "/"));
    assert!(!intersect("/*", "demo"));
    assert!(!intersect("/*", "/demo/a"));
    assert!(intersect("/de*", "/demo"));
    assert!(intersect("/de*o", "/demo"));
    assert!(intersect("/de*", "/de"));
    assert!(!intersect("/de/*", "/de"));
    assert!(intersect("/a/*/c/*/e", "/a/b/c/d/e"));
    assert!(!intersect("/a/*/c/*/e", "/a/c/e"));
    assert!(!intersect("/a/*/c/*/e", "/a/b/c/d/x/e"));
    assert!(!intersect("/ab*cd", "/abxxcxxd"));
    assert!(intersect("/ab*cd", "/abxxcxxcd"));
    assert!(!intersect("/ab*cd", "/abxxcxxcdx"));
}

#[test]
fn rname_multi_wildcard() {
    assert!(intersect("/**", "/demo"));
    assert!(intersect("/**", "/a/b/c"));
    assert!(intersect("/**/", "/a/b/c"));
    assert!(intersect("/**/", "/"));
    assert!(intersect("/demo/**", "/demo"));
    assert!(intersect("/**/xyz", "/a/b/xyz/d/e/f/xyz"));
    assert!(!intersect("/**/xyz*xyz", "/a/b/xyz/d/e/f/xyz"));
    assert!(intersect("/a/**/c/**/e", "/a/b/b/b/c/d/d/d/e"));
    assert!(intersect("/a/**/c/**/e", "/a/c/e"));
    assert!(intersect("/a/**/c/*/e/*", "/a/b/b/b/c/d/d/c/d/e/f"));
    assert!(!intersect("/a/**/c/*/e/*", "/a/b/b/b/c/d/d/c/d/d/e/f"));
}

#[test]
fn rname_both_wild() {
    assert!(intersect("/x/*", "/x/abc*"));
    assert!(intersect("/x/*abc", "/x/abc*"));
    assert!(intersect("/x/a*de", "/x/abc*de"));
    assert!(intersect("/x/a*d*e", "/x/a*c*e"));
    assert!(!intersect("/x/c*", "/x/abc*"));
    assert!(!intersect("/x/*d", "/x/*e"));
    // The relation is symmetric
    assert!(intersect("/demo/**", "/*/a"));
    assert!(intersect("/*/a", "/demo/**"));
}

#[test]
fn rname_utf8() {
    assert!(intersect("/é*", "/été"));
    assert!(intersect("/*é", "/été"));
    assert!(!intersect("/é*", "/ete"));
}

#[test]
fn rname_reskey() {
    let sub = ResKey::from("/demo/**");
    assert_eq!(Some(true), sub.intersects(&ResKey::from("/demo/a/b")));
    assert_eq!(Some(false), sub.intersects(&ResKey::from("/test/a")));
    // The name of a declared resource is not known here
    assert_eq!(None, sub.intersects(&ResKey::RId(3)));
    assert_eq!(
        None,
        ResKey::RIdWithSuffix(3, "/a".to_string()).intersects(&sub)
    );
}
