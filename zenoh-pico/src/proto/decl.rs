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
use super::msg::{zmsg, Header};
use crate::core::*;

pub mod id {
    // Declarations
    pub const RESOURCE: u8 = 0x01;
    pub const PUBLISHER: u8 = 0x02;
    pub const SUBSCRIBER: u8 = 0x03;
    pub const QUERYABLE: u8 = 0x04;

    pub const FORGET_RESOURCE: u8 = 0x11;
    pub const FORGET_PUBLISHER: u8 = 0x12;
    pub const FORGET_SUBSCRIBER: u8 = 0x13;
    pub const FORGET_QUERYABLE: u8 = 0x14;

    // SubModes
    pub const MODE_PUSH: u8 = 0x00;
    pub const MODE_PULL: u8 = 0x01;
    pub const PERIOD: u8 = 0x80;
}

pub mod flag {
    pub const Q: u8 = 1 << 6; // 0x40 QueryableInfo  if Q==1 then the queryable info is present
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|X|X| RESOURCE|
    /// +---------------+
    /// ~      RID      ~
    /// +---------------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ```
    Resource { rid: ZInt, key: ResKey },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |X|X|X|  F_RES  |
    /// +---------------+
    /// ~      RID      ~
    /// +---------------+
    /// ```
    ForgetResource { rid: ZInt },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|X|X|   PUB   |
    /// +---------------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ```
    Publisher { key: ResKey },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|X|X|  F_PUB  |
    /// +---------------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ```
    ForgetPublisher { key: ResKey },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|S|R|   SUB   |  R for Reliable
    /// +---------------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// |P|X|X|X|X|X|SM | if S==1. Otherwise: SubMode=Push
    /// +---------------+
    /// ~    Period     ~ if P==1. Otherwise: None
    /// +---------------+
    /// ```
    Subscriber { key: ResKey, info: SubInfo },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|X|X|  F_SUB  |
    /// +---------------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ```
    ForgetSubscriber { key: ResKey },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|Q|X|  QABLE  |
    /// +---------------+
    /// ~     ResKey    ~ if K==1 then the key has a name
    /// +---------------+
    /// ~     Kind      ~
    /// +---------------+
    /// ~   QablInfo    ~ if Q==1
    /// +---------------+
    /// ```
    Queryable {
        key: ResKey,
        kind: ZInt,
        info: Option<QueryableInfo>,
    },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|X|X| F_QABLE |
    /// +---------------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ```
    ForgetQueryable { key: ResKey },
}

impl SubInfo {
    // The submode byte is present unless the subscription is a plain push
    pub fn has_mode(&self) -> bool {
        self.mode != SubMode::Push || self.period.is_some()
    }
}

#[inline(always)]
fn key_flag(key: &ResKey) -> u8 {
    if key.has_name() {
        zmsg::flag::K
    } else {
        0
    }
}

impl Header for Declaration {
    fn header(&self) -> u8 {
        match self {
            Declaration::Resource { key, .. } => id::RESOURCE | key_flag(key),
            Declaration::ForgetResource { .. } => id::FORGET_RESOURCE,
            Declaration::Publisher { key } => id::PUBLISHER | key_flag(key),
            Declaration::ForgetPublisher { key } => id::FORGET_PUBLISHER | key_flag(key),
            Declaration::Subscriber { key, info } => {
                let mut header = id::SUBSCRIBER | key_flag(key);
                if info.reliability == Reliability::Reliable {
                    header |= zmsg::flag::R;
                }
                if info.has_mode() {
                    header |= zmsg::flag::S;
                }
                header
            }
            Declaration::ForgetSubscriber { key } => id::FORGET_SUBSCRIBER | key_flag(key),
            Declaration::Queryable { key, info, .. } => {
                let mut header = id::QUERYABLE | key_flag(key);
                if info.is_some() {
                    header |= flag::Q;
                }
                header
            }
            Declaration::ForgetQueryable { key } => id::FORGET_QUERYABLE | key_flag(key),
        }
    }
}
