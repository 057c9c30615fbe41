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
use super::decl::Declaration;
use crate::core::*;
use crate::io::RBuf;

/*************************************/
/*               IDS                 */
/*************************************/
// Inner Message IDs
pub mod imsg {
    use super::ZInt;

    pub mod id {
        // Transport Messages
        pub const JOIN: u8 = 0x00;
        pub const SCOUT: u8 = 0x01;
        pub const HELLO: u8 = 0x02;
        pub const INIT: u8 = 0x03;
        pub const OPEN: u8 = 0x04;
        pub const CLOSE: u8 = 0x05;
        pub const SYNC: u8 = 0x06;
        pub const ACK_NACK: u8 = 0x07;
        pub const KEEP_ALIVE: u8 = 0x08;
        pub const PING_PONG: u8 = 0x09;
        pub const FRAME: u8 = 0x0a;

        // Zenoh Messages
        pub const DECLARE: u8 = 0x0b;
        pub const DATA: u8 = 0x0c;
        pub const QUERY: u8 = 0x0d;
        pub const PULL: u8 = 0x0e;
        pub const UNIT: u8 = 0x0f;

        // Message decorators
        pub const REPLY_CONTEXT: u8 = 0x1e;
        pub const ATTACHMENT: u8 = 0x1f;
    }

    // Header mask
    pub const HEADER_BITS: u8 = 5;
    pub const HEADER_MASK: u8 = !(0xff << HEADER_BITS);

    #[inline(always)]
    pub fn mid(header: u8) -> u8 {
        header & HEADER_MASK
    }

    #[inline(always)]
    pub fn flags(header: u8) -> u8 {
        header & !HEADER_MASK
    }

    #[inline(always)]
    pub fn has_flag(byte: u8, flag: u8) -> bool {
        byte & flag != 0
    }

    #[inline(always)]
    pub fn has_option(options: ZInt, flag: ZInt) -> bool {
        options & flag != 0
    }
}

pub trait Header {
    fn header(&self) -> u8;
}

/*************************************/
/*            DECORATORS             */
/*************************************/
/// # Attachment decorator
///
/// NOTE: 16 bits (2 bytes) may be prepended to the serialized message indicating the total length
///       in bytes of the message, resulting in the maximum length of a message being 65_535 bytes.
///       This is necessary in those stream-oriented transports (e.g., TCP) that do not preserve
///       the boundary of the serialized messages. The length is encoded as little-endian.
///       In any case, the length of a message must not exceed 65_535 bytes.
///
/// The Attachment can decorate any message (i.e., TransportMessage and ZenohMessage) and it allows to
/// append to the message any additional information. Since the information contained in the
/// Attachement is relevant only to the layer that provided them (e.g., Transport, Zenoh, User) it
/// is the duty of that layer to serialize and de-serialize the attachment whenever deemed necessary.
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// | ENC |  ATTCH  |
/// +-+-+-+---------+
/// ~   Attachment  ~
/// +---------------+
///
/// ENC values:
/// - 0x00 => Zenoh Properties
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub encoding: u8,
    pub buffer: RBuf,
}

impl Attachment {
    pub fn make(encoding: u8, buffer: RBuf) -> Attachment {
        Attachment {
            encoding: imsg::flags(encoding),
            buffer,
        }
    }
}

impl Header for Attachment {
    #[inline(always)]
    fn header(&self) -> u8 {
        imsg::id::ATTACHMENT | self.encoding
    }
}

/// # ReplyContext decorator
///
/// The **ReplyContext** is a message decorator for either:
///   - the **Data** messages that result from a query
///   - or a **Unit** message in case the message is a REPLY_FINAL.
///  The **replier-id** (eval or storage id) is represented as a byte-array.
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|X|F|  R_CTX  |
/// +-+-+-+---------+
/// ~      qid      ~
/// +---------------+
/// ~ replier_kind  ~ if F==0
/// +---------------+
/// ~   replier_id  ~ if F==0
/// +---------------+
///
/// - if F==1 then the message is a REPLY_FINAL
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReplierInfo {
    pub kind: ZInt,
    pub id: PeerId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplyContext {
    pub qid: ZInt,
    pub replier: Option<ReplierInfo>,
}

impl ReplyContext {
    // Note: a ReplyContext without replier is a REPLY_FINAL
    pub fn make(qid: ZInt, replier: Option<ReplierInfo>) -> ReplyContext {
        ReplyContext { qid, replier }
    }

    #[inline(always)]
    pub fn is_final(&self) -> bool {
        self.replier.is_none()
    }
}

impl Header for ReplyContext {
    #[inline(always)]
    fn header(&self) -> u8 {
        let mut header = imsg::id::REPLY_CONTEXT;
        if self.is_final() {
            header |= zmsg::flag::F;
        }
        header
    }
}

/*************************************/
/*         ZENOH MESSAGES            */
/*************************************/
pub mod zmsg {
    use super::imsg;
    use crate::core::{CongestionControl, Reliability, ZInt};

    // Zenoh message IDs -- Re-export of some of the Inner Message IDs
    pub mod id {
        use super::imsg;

        // Messages
        pub const DECLARE: u8 = imsg::id::DECLARE;
        pub const DATA: u8 = imsg::id::DATA;
        pub const QUERY: u8 = imsg::id::QUERY;
        pub const PULL: u8 = imsg::id::PULL;
        pub const UNIT: u8 = imsg::id::UNIT;

        // Message decorators
        pub const REPLY_CONTEXT: u8 = imsg::id::REPLY_CONTEXT;
        pub const ATTACHMENT: u8 = imsg::id::ATTACHMENT;
    }

    // Zenoh message flags
    pub mod flag {
        pub const D: u8 = 1 << 5; // 0x20 Drop          if D==1 then the message can be dropped
        pub const F: u8 = 1 << 5; // 0x20 Final         if F==1 then this is the final message (e.g., ReplyContext, Pull)
        pub const I: u8 = 1 << 6; // 0x40 DataInfo      if I==1 then DataInfo is present
        pub const K: u8 = 1 << 7; // 0x80 ResourceKey   if K==1 then the resource key has a name
        pub const N: u8 = 1 << 6; // 0x40 MaxSamples    if N==1 then the MaxSamples is indicated
        pub const R: u8 = 1 << 5; // 0x20 Reliable      if R==1 then it concerns the reliable channel, best-effort otherwise
        pub const S: u8 = 1 << 6; // 0x40 SubMode       if S==1 then the declaration SubMode is indicated
        pub const T: u8 = 1 << 5; // 0x20 QueryTarget   if T==1 then the query target is present

        pub const X: u8 = 0; // Unused flags are set to zero
    }

    // Options used for DataInfo
    pub mod data {
        use super::ZInt;

        pub mod info {
            use super::ZInt;

            pub const KIND: ZInt = 1 << 1; // 0x02
            pub const ENCODING: ZInt = 1 << 2; // 0x04
            pub const TIMESTAMP: ZInt = 1 << 3; // 0x08
            // 0x10: Reserved
            // 0x20: Reserved
            // 0x40: Reserved
            pub const SRCID: ZInt = 1 << 7; // 0x80
            pub const SRCSN: ZInt = 1 << 8; // 0x100
            pub const RTRID: ZInt = 1 << 9; // 0x200
            pub const RTRSN: ZInt = 1 << 10; // 0x400
        }

        pub const ALL: ZInt = info::KIND
            | info::ENCODING
            | info::TIMESTAMP
            | info::SRCID
            | info::SRCSN
            | info::RTRID
            | info::RTRSN;
    }

    // Query target kinds
    pub mod query {
        pub mod target {
            use super::super::ZInt;

            pub const BEST_MATCHING: ZInt = 0;
            pub const COMPLETE: ZInt = 1;
            pub const ALL: ZInt = 2;
            pub const NONE: ZInt = 3;
        }

        pub mod consolidation {
            use super::super::ZInt;

            pub const NONE: ZInt = 0;
            pub const LAZY: ZInt = 1;
            pub const FULL: ZInt = 2;
        }
    }

    // Default reliability for each Zenoh Message
    pub mod default_reliability {
        use super::Reliability;

        pub const DECLARE: Reliability = Reliability::Reliable;
        pub const DATA: Reliability = Reliability::BestEffort;
        pub const QUERY: Reliability = Reliability::Reliable;
        pub const PULL: Reliability = Reliability::Reliable;
        pub const REPLY: Reliability = Reliability::Reliable;
        pub const UNIT: Reliability = Reliability::BestEffort;
    }

    // Default congestion control for each Zenoh Message
    pub mod default_congestion_control {
        use super::CongestionControl;

        pub const DECLARE: CongestionControl = CongestionControl::Block;
        pub const DATA: CongestionControl = CongestionControl::Drop;
        pub const QUERY: CongestionControl = CongestionControl::Block;
        pub const PULL: CongestionControl = CongestionControl::Block;
        pub const REPLY: CongestionControl = CongestionControl::Block;
        pub const UNIT: CongestionControl = CongestionControl::Block;
    }
}

/// # DataInfo
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// ~    options    ~
/// +---------------+
/// ~      kind     ~ if options & (1 << 1)
/// +---------------+
/// ~   encoding    ~ if options & (1 << 2)
/// +---------------+
/// ~   timestamp   ~ if options & (1 << 3)
/// +---------------+
/// ~   source_id   ~ if options & (1 << 7)
/// +---------------+
/// ~   source_sn   ~ if options & (1 << 8)
/// +---------------+
/// ~first_router_id~ if options & (1 << 9)
/// +---------------+
/// ~first_router_sn~ if options & (1 << 10)
/// +---------------+
/// ```
///
/// The options are never stored: they are derived from the fields that are present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataInfo {
    pub kind: Option<ZInt>,
    pub encoding: Option<Encoding>,
    pub timestamp: Option<Timestamp>,
    pub source_id: Option<PeerId>,
    pub source_sn: Option<ZInt>,
    pub first_router_id: Option<PeerId>,
    pub first_router_sn: Option<ZInt>,
}

impl DataInfo {
    pub fn new() -> DataInfo {
        DataInfo::default()
    }

    pub fn options(&self) -> ZInt {
        let mut options = 0;
        if self.kind.is_some() {
            options |= zmsg::data::info::KIND;
        }
        if self.encoding.is_some() {
            options |= zmsg::data::info::ENCODING;
        }
        if self.timestamp.is_some() {
            options |= zmsg::data::info::TIMESTAMP;
        }
        if self.source_id.is_some() {
            options |= zmsg::data::info::SRCID;
        }
        if self.source_sn.is_some() {
            options |= zmsg::data::info::SRCSN;
        }
        if self.first_router_id.is_some() {
            options |= zmsg::data::info::RTRID;
        }
        if self.first_router_sn.is_some() {
            options |= zmsg::data::info::RTRSN;
        }
        options
    }
}

// Zenoh messages at zenoh level
#[derive(Debug, Clone, PartialEq)]
pub enum ZenohBody {
    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |X|X|X| DECLARE |
    /// +-+-+-+---------+
    /// ~ [Declaration] ~
    /// +---------------+
    /// ```
    Declare { declarations: Vec<Declaration> },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|I|D|  DATA   |
    /// +-+-+-+---------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ~    DataInfo   ~ if I==1
    /// +---------------+
    /// ~    Payload    ~
    /// +---------------+
    ///
    /// - if D==1 then the message can be dropped for congestion control reasons.
    /// ```
    Data {
        key: ResKey,
        data_info: Option<DataInfo>,
        payload: RBuf,
    },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |X|X|D|  UNIT   |
    /// +-+-+-+---------+
    ///
    /// - if D==1 then the message can be dropped for congestion control reasons.
    /// ```
    Unit,

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|N|F|  PULL   |
    /// +-+-+-+---------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ~    pullid     ~
    /// +---------------+
    /// ~  max_samples  ~ if N==1
    /// +---------------+
    /// ```
    Pull {
        key: ResKey,
        pull_id: ZInt,
        max_samples: Option<ZInt>,
        is_final: bool,
    },

    /// ```text
    ///  7 6 5 4 3 2 1 0
    /// +-+-+-+-+-+-+-+-+
    /// |K|X|T|  QUERY  |
    /// +-+-+-+---------+
    /// ~    ResKey     ~ if K==1 then the key has a name
    /// +---------------+
    /// ~   predicate   ~
    /// +---------------+
    /// ~      qid      ~
    /// +---------------+
    /// ~     target    ~ if T==1
    /// +---------------+
    /// ~ consolidation ~
    /// +---------------+
    /// ```
    Query {
        key: ResKey,
        predicate: String,
        qid: ZInt,
        target: Option<QueryTarget>,
        consolidation: QueryConsolidation,
    },
}

#[derive(Clone, PartialEq)]
pub struct ZenohMessage {
    pub body: ZenohBody,
    pub reliability: Reliability,
    pub congestion_control: CongestionControl,
    pub reply_context: Option<ReplyContext>,
    pub attachment: Option<Attachment>,
}

impl std::fmt::Debug for ZenohMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {:?} {:?} {:?} {:?}",
            self.body,
            self.reliability,
            self.congestion_control,
            self.reply_context,
            self.attachment
        )
    }
}

impl std::fmt::Display for ZenohMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl Header for ZenohMessage {
    fn header(&self) -> u8 {
        match &self.body {
            ZenohBody::Declare { .. } => zmsg::id::DECLARE,
            ZenohBody::Data { key, data_info, .. } => {
                let mut header = zmsg::id::DATA;
                if self.congestion_control == CongestionControl::Drop {
                    header |= zmsg::flag::D;
                }
                if data_info.is_some() {
                    header |= zmsg::flag::I;
                }
                if key.has_name() {
                    header |= zmsg::flag::K;
                }
                header
            }
            ZenohBody::Unit => {
                let mut header = zmsg::id::UNIT;
                if self.congestion_control == CongestionControl::Drop {
                    header |= zmsg::flag::D;
                }
                header
            }
            ZenohBody::Pull {
                key,
                max_samples,
                is_final,
                ..
            } => {
                let mut header = zmsg::id::PULL;
                if *is_final {
                    header |= zmsg::flag::F;
                }
                if max_samples.is_some() {
                    header |= zmsg::flag::N;
                }
                if key.has_name() {
                    header |= zmsg::flag::K;
                }
                header
            }
            ZenohBody::Query { key, target, .. } => {
                let mut header = zmsg::id::QUERY;
                if target.is_some() {
                    header |= zmsg::flag::T;
                }
                if key.has_name() {
                    header |= zmsg::flag::K;
                }
                header
            }
        }
    }
}

impl ZenohMessage {
    pub fn make_declare(
        declarations: Vec<Declaration>,
        attachment: Option<Attachment>,
    ) -> ZenohMessage {
        ZenohMessage {
            body: ZenohBody::Declare { declarations },
            reliability: zmsg::default_reliability::DECLARE,
            congestion_control: zmsg::default_congestion_control::DECLARE,
            reply_context: None,
            attachment,
        }
    }

    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub fn make_data(
        key: ResKey,
        payload: RBuf,
        reliability: Reliability,
        congestion_control: CongestionControl,
        data_info: Option<DataInfo>,
        reply_context: Option<ReplyContext>,
        attachment: Option<Attachment>,
    ) -> ZenohMessage {
        ZenohMessage {
            body: ZenohBody::Data {
                key,
                data_info,
                payload,
            },
            reliability,
            congestion_control,
            reply_context,
            attachment,
        }
    }

    pub fn make_unit(
        reliability: Reliability,
        congestion_control: CongestionControl,
        reply_context: Option<ReplyContext>,
        attachment: Option<Attachment>,
    ) -> ZenohMessage {
        ZenohMessage {
            body: ZenohBody::Unit,
            reliability,
            congestion_control,
            reply_context,
            attachment,
        }
    }

    pub fn make_pull(
        is_final: bool,
        key: ResKey,
        pull_id: ZInt,
        max_samples: Option<ZInt>,
        attachment: Option<Attachment>,
    ) -> ZenohMessage {
        ZenohMessage {
            body: ZenohBody::Pull {
                key,
                pull_id,
                max_samples,
                is_final,
            },
            reliability: zmsg::default_reliability::PULL,
            congestion_control: zmsg::default_congestion_control::PULL,
            reply_context: None,
            attachment,
        }
    }

    #[inline(always)]
    pub fn make_query(
        key: ResKey,
        predicate: String,
        qid: ZInt,
        target: Option<QueryTarget>,
        consolidation: QueryConsolidation,
        attachment: Option<Attachment>,
    ) -> ZenohMessage {
        ZenohMessage {
            body: ZenohBody::Query {
                key,
                predicate,
                qid,
                target,
                consolidation,
            },
            reliability: zmsg::default_reliability::QUERY,
            congestion_control: zmsg::default_congestion_control::QUERY,
            reply_context: None,
            attachment,
        }
    }

    // -- Message Predicates
    #[inline]
    pub fn is_reliable(&self) -> bool {
        self.reliability == Reliability::Reliable
    }

    #[inline]
    pub fn is_droppable(&self) -> bool {
        !self.is_reliable() || self.congestion_control == CongestionControl::Drop
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_context.is_some()
    }
}

/*************************************/
/*       TRANSPORT MESSAGES          */
/*************************************/
pub mod tmsg {
    use super::imsg;
    use crate::core::ZInt;

    // Transport message IDs -- Re-export of some of the Inner Message IDs
    pub mod id {
        use super::imsg;

        // Messages
        pub const JOIN: u8 = imsg::id::JOIN;
        pub const SCOUT: u8 = imsg::id::SCOUT;
        pub const HELLO: u8 = imsg::id::HELLO;
        pub const INIT: u8 = imsg::id::INIT;
        pub const OPEN: u8 = imsg::id::OPEN;
        pub const CLOSE: u8 = imsg::id::CLOSE;
        pub const SYNC: u8 = imsg::id::SYNC;
        pub const ACK_NACK: u8 = imsg::id::ACK_NACK;
        pub const KEEP_ALIVE: u8 = imsg::id::KEEP_ALIVE;
        pub const PING_PONG: u8 = imsg::id::PING_PONG;
        pub const FRAME: u8 = imsg::id::FRAME;

        // Message decorators
        pub const ATTACHMENT: u8 = imsg::id::ATTACHMENT;
    }

    // Transport message flags
    pub mod flag {
        pub const A: u8 = 1 << 5; // 0x20 Ack           if A==1 then the message is an acknowledgment
        pub const C: u8 = 1 << 6; // 0x40 Count         if C==1 then number of unacknowledged messages is present
        pub const E: u8 = 1 << 7; // 0x80 End           if E==1 then it is the last FRAME fragment
        pub const F: u8 = 1 << 6; // 0x40 Fragment      if F==1 then the FRAME is a fragment
        pub const I: u8 = 1 << 5; // 0x20 PeerID        if I==1 then the PeerID is requested or present
        pub const K: u8 = 1 << 6; // 0x40 CloseLink     if K==1 then close the transport link only
        pub const L: u8 = 1 << 7; // 0x80 Locators      if L==1 then Locators are present
        pub const M: u8 = 1 << 5; // 0x20 Mask          if M==1 then a Mask is present
        pub const O: u8 = 1 << 7; // 0x80 Options       if O==1 then Options are present
        pub const P: u8 = 1 << 5; // 0x20 PingOrPong    if P==1 then the message is Ping, otherwise is Pong
        pub const R: u8 = 1 << 5; // 0x20 Reliable      if R==1 then it concerns the reliable channel, best-effort otherwise
        pub const S: u8 = 1 << 6; // 0x40 SN Resolution if S==1 then the SN Resolution is present
        pub const T1: u8 = 1 << 5; // 0x20 TimeRes      if T==1 then the time resolution is in seconds (JOIN)
        pub const T2: u8 = 1 << 6; // 0x40 TimeRes      if T==1 then the time resolution is in seconds (OPEN)
        pub const W: u8 = 1 << 6; // 0x40 WhatAmI       if W==1 then WhatAmI is indicated

        pub const X: u8 = 0; // Unused flags are set to zero
    }

    pub mod init_options {
        use super::ZInt;

        pub const QOS: ZInt = 1 << 0; // 0x01
    }

    pub mod join_options {
        use super::ZInt;

        pub const QOS: ZInt = 1 << 0; // 0x01
    }

    // Reason for the Close message
    pub mod close_reason {
        pub const GENERIC: u8 = 0x00;
        pub const UNSUPPORTED: u8 = 0x01;
        pub const INVALID: u8 = 0x02;
        pub const MAX_SESSIONS: u8 = 0x03;
        pub const MAX_LINKS: u8 = 0x04;
        pub const EXPIRED: u8 = 0x05;
    }

    pub fn close_reason_to_str(reason: u8) -> &'static str {
        match reason {
            close_reason::GENERIC => "GENERIC",
            close_reason::UNSUPPORTED => "UNSUPPORTED",
            close_reason::INVALID => "INVALID",
            close_reason::MAX_SESSIONS => "MAX_SESSIONS",
            close_reason::MAX_LINKS => "MAX_LINKS",
            close_reason::EXPIRED => "EXPIRED",
            _ => "UNKNOWN",
        }
    }

    pub mod conduit {
        pub const PRIORITIES: usize = 8;
    }
}

/// # Scout message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|W|I|  SCOUT  |
/// +-+-+-+---------+
/// ~      what     ~ if W==1 -- Otherwise implicitly scouting for Routers
/// +---------------+
///
/// - if I==1 then the sender is asking for hello replies that contain a peer_id.
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Scout {
    pub what: Option<WhatAmI>,
    pub pid_request: bool,
}

impl Header for Scout {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::SCOUT;
        if self.pid_request {
            header |= tmsg::flag::I;
        }
        if self.what.is_some() {
            header |= tmsg::flag::W;
        }
        header
    }
}

/// # Hello message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |L|W|I|  HELLO  |
/// +-+-+-+---------+
/// ~    peer-id    ~ if I==1
/// +---------------+
/// ~    whatami    ~ if W==1 -- Otherwise it is from a Router
/// +---------------+
/// ~   [Locators]  ~ if L==1 -- Otherwise src-address is the locator
/// +---------------+
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Hello {
    pub pid: Option<PeerId>,
    pub whatami: Option<WhatAmI>,
    pub locators: Option<Vec<String>>,
}

impl Header for Hello {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::HELLO;
        if self.pid.is_some() {
            header |= tmsg::flag::I;
        }
        if self.whatami.is_some() {
            header |= tmsg::flag::W;
        }
        if self.locators.is_some() {
            header |= tmsg::flag::L;
        }
        header
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ConduitSn {
    pub reliable: ZInt,
    pub best_effort: ZInt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConduitSnList {
    Plain(ConduitSn),
    QoS(Box<[ConduitSn; tmsg::conduit::PRIORITIES]>),
}

/// # Join message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |O|S|T|   JOIN  |
/// +-+-+-+-+-------+
/// ~             |Q~ if O==1
/// +---------------+
/// | v_maj | v_min | -- Protocol Version VMaj.VMin
/// +-------+-------+
/// ~    whatami    ~ -- Router, Peer or a combination of them
/// +---------------+
/// ~    peer_id    ~ -- PID of the sender of the JOIN message
/// +---------------+
/// ~     lease     ~ -- Lease period of the sender of the JOIN message(*)
/// +---------------+
/// ~ sn_resolution ~ if S==1(*) -- Otherwise 2^28 is assumed(**)
/// +---------------+
/// ~   [next_sn]   ~ (***)
/// +---------------+
///
/// - if Q==1 then the sender supports QoS.
///
/// (*)   if T==1 then the lease period is expressed in seconds, otherwise in milliseconds
/// (**)  if S==0 then 2^28 is assumed.
/// (***) if Q==1 then 8 sequence numbers are present: one for each priority.
///       if Q==0 then only one sequence number is present.
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub version: u8,
    pub whatami: WhatAmI,
    pub pid: PeerId,
    pub lease: ZInt,
    pub sn_resolution: Option<ZInt>,
    pub next_sns: ConduitSnList,
}

impl Join {
    pub fn is_qos(&self) -> bool {
        matches!(self.next_sns, ConduitSnList::QoS(_))
    }

    pub fn options(&self) -> ZInt {
        let mut options = 0;
        if self.is_qos() {
            options |= tmsg::join_options::QOS;
        }
        options
    }
}

impl Header for Join {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::JOIN;
        if self.lease % 1_000 == 0 {
            header |= tmsg::flag::T1;
        }
        if self.sn_resolution.is_some() {
            header |= tmsg::flag::S;
        }
        if self.options() != 0 {
            header |= tmsg::flag::O;
        }
        header
    }
}

/// # Init message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |O|S|A|   INIT  |
/// +-+-+-+-+-------+
/// ~             |Q~ if O==1
/// +---------------+
/// | v_maj | v_min | if A==0 -- Protocol Version VMaj.VMin
/// +-------+-------+
/// ~    whatami    ~ -- Client, Router, Peer or a combination of them
/// +---------------+
/// ~    peer_id    ~ -- PID of the sender of the INIT message
/// +---------------+
/// ~ sn_resolution ~ if S==1(*) -- Otherwise 2^28 is assumed(**)
/// +---------------+
/// ~     cookie    ~ if A==1
/// +---------------+
///
/// (*) if A==0 and S==0 then 2^28 is assumed.
///     if A==1 and S==0 then the agreed resolution is the one communicated by the initiator.
///
/// - if Q==1 then the initiator/responder support QoS.
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InitSyn {
    pub version: u8,
    pub whatami: WhatAmI,
    pub pid: PeerId,
    pub sn_resolution: Option<ZInt>,
    pub is_qos: bool,
}

impl InitSyn {
    pub fn options(&self) -> ZInt {
        let mut options = 0;
        if self.is_qos {
            options |= tmsg::init_options::QOS;
        }
        options
    }
}

impl Header for InitSyn {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::INIT;
        if self.sn_resolution.is_some() {
            header |= tmsg::flag::S;
        }
        if self.options() != 0 {
            header |= tmsg::flag::O;
        }
        header
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitAck {
    pub whatami: WhatAmI,
    pub pid: PeerId,
    pub sn_resolution: Option<ZInt>,
    pub is_qos: bool,
    pub cookie: RBuf,
}

impl InitAck {
    pub fn options(&self) -> ZInt {
        let mut options = 0;
        if self.is_qos {
            options |= tmsg::init_options::QOS;
        }
        options
    }
}

impl Header for InitAck {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::INIT | tmsg::flag::A;
        if self.sn_resolution.is_some() {
            header |= tmsg::flag::S;
        }
        if self.options() != 0 {
            header |= tmsg::flag::O;
        }
        header
    }
}

/// # Open message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|T|A|   OPEN  |
/// +-+-+-+---------+
/// ~    lease      ~ -- Lease period of the sender of the OPEN message(*)
/// +---------------+
/// ~  initial_sn   ~ -- Initial SN proposed by the sender of the OPEN(**)
/// +---------------+
/// ~    cookie     ~ if A==0(***)
/// +---------------+
///
/// (*)   if T==1 then the lease period is expressed in seconds, otherwise in milliseconds
/// (**)  the initial sequence number MUST be compatible with the sequence number resolution agreed in the
///       InitSyn/InitAck message exchange
/// (***) the cookie MUST be the same received in the INIT message with A==1 from the corresponding peer
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OpenSyn {
    pub lease: ZInt,
    pub initial_sn: ZInt,
    pub cookie: RBuf,
}

impl Header for OpenSyn {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::OPEN;
        if self.lease % 1_000 == 0 {
            header |= tmsg::flag::T2;
        }
        header
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAck {
    pub lease: ZInt,
    pub initial_sn: ZInt,
}

impl Header for OpenAck {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::OPEN | tmsg::flag::A;
        if self.lease % 1_000 == 0 {
            header |= tmsg::flag::T2;
        }
        header
    }
}

/// # Close message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|K|I|  CLOSE  |
/// +-+-+-+---------+
/// ~    peer_id    ~  if I==1 -- PID of the target peer.
/// +---------------+
/// |     reason    |
/// +---------------+
///
/// - if K==0 then close the whole zenoh transport.
/// - if K==1 then close the transport link the CLOSE message was sent on (e.g., TCP socket) but
///           keep the whole transport open.
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Close {
    pub pid: Option<PeerId>,
    pub reason: u8,
    pub link_only: bool,
}

impl Header for Close {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::CLOSE;
        if self.pid.is_some() {
            header |= tmsg::flag::I;
        }
        if self.link_only {
            header |= tmsg::flag::K;
        }
        header
    }
}

/// # Sync message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|C|R|  SYNC   |
/// +-+-+-+---------+
/// ~      sn       ~ -- Sequence number of the next message to be transmitted on this channel.
/// +---------------+
/// ~     count     ~ if R==1 && C==1 -- Number of unacknowledged messages.
/// +---------------+
///
/// - if R==1 then the SYNC concerns the reliable channel, otherwise the best-effort channel.
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sync {
    pub reliability: Reliability,
    pub sn: ZInt,
    pub count: Option<ZInt>,
}

impl Sync {
    /// The count carried on the wire: it is ignored on the best-effort channel.
    #[inline]
    pub fn wire_count(&self) -> Option<ZInt> {
        match self.reliability {
            Reliability::Reliable => self.count,
            Reliability::BestEffort => None,
        }
    }
}

impl Header for Sync {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::SYNC;
        if let Reliability::Reliable = self.reliability {
            header |= tmsg::flag::R;
        }
        if self.wire_count().is_some() {
            header |= tmsg::flag::C;
        }
        header
    }
}

/// # AckNack message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|X|M| ACKNACK |
/// +-+-+-+---------+
/// ~     sn        ~
/// +---------------+
/// ~     mask      ~ if M==1
/// +---------------+
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AckNack {
    pub sn: ZInt,
    pub mask: Option<ZInt>,
}

impl Header for AckNack {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::ACK_NACK;
        if self.mask.is_some() {
            header |= tmsg::flag::M;
        }
        header
    }
}

/// # KeepAlive message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|X|I| K_ALIVE |
/// +-+-+-+---------+
/// ~    peer_id    ~ if I==1 -- Peer ID of the KEEP_ALIVE sender.
/// +---------------+
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KeepAlive {
    pub pid: Option<PeerId>,
}

impl Header for KeepAlive {
    fn header(&self) -> u8 {
        let mut header = tmsg::id::KEEP_ALIVE;
        if self.pid.is_some() {
            header |= tmsg::flag::I;
        }
        header
    }
}

/// # PingPong message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |X|X|P|  P_PONG |
/// +-+-+-+---------+
/// ~     hash      ~
/// +---------------+
///
/// - if P==1 then the message is Ping, otherwise is Pong.
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Ping {
    pub hash: ZInt,
}

impl Header for Ping {
    fn header(&self) -> u8 {
        tmsg::id::PING_PONG | tmsg::flag::P
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pong {
    pub hash: ZInt,
}

impl Header for Pong {
    fn header(&self) -> u8 {
        tmsg::id::PING_PONG
    }
}

/// # Frame message
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-+-+-+-+-+-+-+-+
/// |E|F|R|  FRAME  |
/// +-+-+-+---------+
/// ~      SN       ~
/// +---------------+
/// ~  FramePayload ~ -- if F==1 then the payload is a fragment of a single Zenoh Message, a list of complete Zenoh Messages otherwise.
/// +---------------+
///
/// - if R==1 then the FRAME is sent on the reliable channel, best-effort otherwise.
/// - if F==1 then the FRAME is a fragment.
/// - if E==1 then the FRAME is the last fragment. E==1 is valid iff F==1.
///
/// NOTE: Only one bit would be sufficient to signal fragmentation in a IP-like fashion as follows:
///         - if F==1 then this FRAME is a fragment and more fragment will follow;
///         - if F==0 then the message is the last fragment if SN-1 had F==1,
///           otherwise it's a non-fragmented message.
///       However, this would require to always perform a two-steps de-serialization: first
///       de-serialize the FRAME and then the Payload. This is due to the fact the F==0 is ambigous
///       w.r.t. detecting if the FRAME is a fragment or not before SN re-ordering has occured.
///       By using the F bit to only signal whether the FRAME is fragmented or not, it allows to
///       de-serialize the payload in one single pass when F==0 since no re-ordering needs to take
///       place at this stage. Then, the F bit is used to detect the last fragment during re-ordering.
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    Fragment { buffer: RBuf, is_final: bool },
    Messages { messages: Vec<ZenohMessage> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub reliability: Reliability,
    pub sn: ZInt,
    pub payload: FramePayload,
}

impl Frame {
    pub fn make_header(reliability: Reliability, is_fragment: Option<bool>) -> u8 {
        let mut header = tmsg::id::FRAME;
        if let Reliability::Reliable = reliability {
            header |= tmsg::flag::R;
        }
        if let Some(is_final) = is_fragment {
            header |= tmsg::flag::F;
            if is_final {
                header |= tmsg::flag::E;
            }
        }
        header
    }
}

impl Header for Frame {
    fn header(&self) -> u8 {
        let is_fragment = match &self.payload {
            FramePayload::Fragment { is_final, .. } => Some(*is_final),
            FramePayload::Messages { .. } => None,
        };
        Frame::make_header(self.reliability, is_fragment)
    }
}

// Transport messages
#[derive(Debug, Clone, PartialEq)]
pub enum TransportBody {
    Scout(Scout),
    Hello(Hello),
    Join(Join),
    InitSyn(InitSyn),
    InitAck(InitAck),
    OpenSyn(OpenSyn),
    OpenAck(OpenAck),
    Close(Close),
    Sync(Sync),
    AckNack(AckNack),
    KeepAlive(KeepAlive),
    Ping(Ping),
    Pong(Pong),
    Frame(Frame),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportMessage {
    pub body: TransportBody,
    pub attachment: Option<Attachment>,
}

impl Header for TransportMessage {
    fn header(&self) -> u8 {
        match &self.body {
            TransportBody::Scout(scout) => scout.header(),
            TransportBody::Hello(hello) => hello.header(),
            TransportBody::Join(join) => join.header(),
            TransportBody::InitSyn(init_syn) => init_syn.header(),
            TransportBody::InitAck(init_ack) => init_ack.header(),
            TransportBody::OpenSyn(open_syn) => open_syn.header(),
            TransportBody::OpenAck(open_ack) => open_ack.header(),
            TransportBody::Close(close) => close.header(),
            TransportBody::Sync(sync) => sync.header(),
            TransportBody::AckNack(ack_nack) => ack_nack.header(),
            TransportBody::KeepAlive(keep_alive) => keep_alive.header(),
            TransportBody::Ping(ping) => ping.header(),
            TransportBody::Pong(pong) => pong.header(),
            TransportBody::Frame(frame) => frame.header(),
        }
    }
}

impl TransportMessage {
    pub fn make_scout(
        what: Option<WhatAmI>,
        pid_request: bool,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::Scout(Scout { what, pid_request }),
            attachment,
        }
    }

    pub fn make_hello(
        pid: Option<PeerId>,
        whatami: Option<WhatAmI>,
        locators: Option<Vec<String>>,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::Hello(Hello {
                pid,
                whatami,
                locators,
            }),
            attachment,
        }
    }

    pub fn make_join(
        version: u8,
        whatami: WhatAmI,
        pid: PeerId,
        lease: ZInt,
        sn_resolution: Option<ZInt>,
        next_sns: ConduitSnList,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::Join(Join {
                version,
                whatami,
                pid,
                lease,
                sn_resolution,
                next_sns,
            }),
            attachment,
        }
    }

    pub fn make_init_syn(
        version: u8,
        whatami: WhatAmI,
        pid: PeerId,
        sn_resolution: Option<ZInt>,
        is_qos: bool,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::InitSyn(InitSyn {
                version,
                whatami,
                pid,
                sn_resolution,
                is_qos,
            }),
            attachment,
        }
    }

    pub fn make_init_ack(
        whatami: WhatAmI,
        pid: PeerId,
        sn_resolution: Option<ZInt>,
        is_qos: bool,
        cookie: RBuf,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::InitAck(InitAck {
                whatami,
                pid,
                sn_resolution,
                is_qos,
                cookie,
            }),
            attachment,
        }
    }

    pub fn make_open_syn(
        lease: ZInt,
        initial_sn: ZInt,
        cookie: RBuf,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::OpenSyn(OpenSyn {
                lease,
                initial_sn,
                cookie,
            }),
            attachment,
        }
    }

    pub fn make_open_ack(
        lease: ZInt,
        initial_sn: ZInt,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::OpenAck(OpenAck { lease, initial_sn }),
            attachment,
        }
    }

    pub fn make_close(
        pid: Option<PeerId>,
        reason: u8,
        link_only: bool,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::Close(Close {
                pid,
                reason,
                link_only,
            }),
            attachment,
        }
    }

    pub fn make_sync(
        reliability: Reliability,
        sn: ZInt,
        count: Option<ZInt>,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        // The count is meaningful only on the reliable channel
        let count = match reliability {
            Reliability::Reliable => count,
            Reliability::BestEffort => None,
        };
        TransportMessage {
            body: TransportBody::Sync(Sync {
                reliability,
                sn,
                count,
            }),
            attachment,
        }
    }

    pub fn make_ack_nack(
        sn: ZInt,
        mask: Option<ZInt>,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::AckNack(AckNack { sn, mask }),
            attachment,
        }
    }

    pub fn make_keep_alive(
        pid: Option<PeerId>,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::KeepAlive(KeepAlive { pid }),
            attachment,
        }
    }

    pub fn make_ping(hash: ZInt, attachment: Option<Attachment>) -> TransportMessage {
        TransportMessage {
            body: TransportBody::Ping(Ping { hash }),
            attachment,
        }
    }

    pub fn make_pong(hash: ZInt, attachment: Option<Attachment>) -> TransportMessage {
        TransportMessage {
            body: TransportBody::Pong(Pong { hash }),
            attachment,
        }
    }

    pub fn make_frame(
        reliability: Reliability,
        sn: ZInt,
        payload: FramePayload,
        attachment: Option<Attachment>,
    ) -> TransportMessage {
        TransportMessage {
            body: TransportBody::Frame(Frame {
                reliability,
                sn,
                payload,
            }),
            attachment,
        }
    }
}
