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
#[macro_use]
extern crate lazy_static;

use std::sync::Mutex;
use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::{zcheck, zconfigurable, zerror, zerror2, zlock};

zconfigurable! {
    static ref ZU_TEST_CONSTANT: usize = 1024;
}

fn write_all(ok: &[bool]) -> bool {
    for o in ok {
        zcheck!(*o);
    }
    true
}

fn fail(missing: usize) -> ZResult<()> {
    zerror!(ZErrorKind::BufferUnderflow { missing })
}

#[test]
fn zcheck_short_circuits() {
    assert!(write_all(&[true, true, true]));
    assert!(!write_all(&[true, false, true]));
}

#[test]
fn zerror_builds_kind() {
    let err = fail(4).unwrap_err();
    assert_eq!(err.get_kind(), &ZErrorKind::BufferUnderflow { missing: 4 });
    assert!(err.to_string().contains("macros.rs"));
}

fn parse(s: &str) -> ZResult<u16> {
    s.parse::<u16>().map_err(|e| {
        zerror2!(
            ZErrorKind::InvalidMessage {
                descr: format!("Invalid number: {}", s)
            },
            e
        )
    })
}

#[test]
fn zerror2_keeps_source() {
    assert_eq!(parse("7447").unwrap(), 7447);
    let err = parse("70000").unwrap_err();
    match err.get_kind() {
        ZErrorKind::InvalidMessage { descr } => assert!(descr.contains("70000")),
        k => panic!("unexpected error kind: {:?}", k),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn zconfigurable_default() {
    assert_eq!(*ZU_TEST_CONSTANT, 1024);
}

#[test]
fn zlock_guard() {
    let m = Mutex::new(0u8);
    *zlock!(m) += 1;
    assert_eq!(*zlock!(m), 1);
}
