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
use crate::core::*;
use crate::io::{RBuf, WBuf};

use super::decl::Declaration;
use super::msg::*;

use zenoh_util::zcheck;

// NOTE: the writers below do not mark/revert the buffer on failure: a failed
//       write may leave a partially serialized message in the WBuf. It is up
//       to the caller to mark() the buffer before writing and revert() it
//       in case of failure.
impl WBuf {
    pub fn write_frame_header(
        &mut self,
        reliability: Reliability,
        sn: ZInt,
        is_fragment: Option<bool>,
        attachment: Option<&Attachment>,
    ) -> bool {
        if let Some(attachment) = attachment {
            zcheck!(self.write_deco_attachment(attachment));
        }

        let header = Frame::make_header(reliability, is_fragment);

        self.write(header) && self.write_zint(sn)
    }

    pub fn write_transport_message(&mut self, msg: &TransportMessage) -> bool {
        if let Some(attachment) = &msg.attachment {
            zcheck!(self.write_deco_attachment(attachment));
        };

        zcheck!(self.write(msg.header()));
        match &msg.body {
            TransportBody::Frame(Frame { sn, payload, .. }) => {
                zcheck!(self.write_zint(*sn));
                match payload {
                    FramePayload::Fragment { buffer, .. } => {
                        zcheck!(self.write_fragment(buffer));
                    }
                    FramePayload::Messages { messages } => {
                        for m in messages {
                            zcheck!(self.write_zenoh_message(m));
                        }
                    }
                }
            }

            TransportBody::Scout(Scout { what, .. }) => {
                if let Some(w) = *what {
                    zcheck!(self.write_zint(w));
                }
            }

            TransportBody::Hello(Hello {
                pid,
                whatami,
                locators,
            }) => {
                if let Some(pid) = pid {
                    zcheck!(self.write_peerid(pid));
                }
                if let Some(w) = *whatami {
                    zcheck!(self.write_zint(w));
                }
                if let Some(locs) = locators {
                    zcheck!(self.write_string_array(locs));
                }
            }

            TransportBody::Join(join) => {
                let options = join.options();
                if options != 0 {
                    zcheck!(self.write_zint(options));
                }
                zcheck!(self.write(join.version));
                zcheck!(self.write_zint(join.whatami));
                zcheck!(self.write_peerid(&join.pid));
                zcheck!(self.write_lease(join.lease));
                if let Some(snr) = join.sn_resolution {
                    zcheck!(self.write_zint(snr));
                }
                match &join.next_sns {
                    ConduitSnList::Plain(sn) => {
                        zcheck!(self.write_conduit_sn(sn));
                    }
                    ConduitSnList::QoS(sns) => {
                        for sn in sns.iter() {
                            zcheck!(self.write_conduit_sn(sn));
                        }
                    }
                }
            }

            TransportBody::InitSyn(init_syn) => {
                let options = init_syn.options();
                if options != 0 {
                    zcheck!(self.write_zint(options));
                }
                zcheck!(self.write(init_syn.version));
                zcheck!(self.write_zint(init_syn.whatami));
                zcheck!(self.write_peerid(&init_syn.pid));
                if let Some(snr) = init_syn.sn_resolution {
                    zcheck!(self.write_zint(snr));
                }
            }

            TransportBody::InitAck(init_ack) => {
                let options = init_ack.options();
                if options != 0 {
                    zcheck!(self.write_zint(options));
                }
                zcheck!(self.write_zint(init_ack.whatami));
                zcheck!(self.write_peerid(&init_ack.pid));
                if let Some(snr) = init_ack.sn_resolution {
                    zcheck!(self.write_zint(snr));
                }
                zcheck!(self.write_rbuf(&init_ack.cookie));
            }

            TransportBody::OpenSyn(OpenSyn {
                lease,
                initial_sn,
                cookie,
            }) => {
                zcheck!(self.write_lease(*lease));
                zcheck!(self.write_zint(*initial_sn));
                zcheck!(self.write_rbuf(cookie));
            }

            TransportBody::OpenAck(OpenAck { lease, initial_sn }) => {
                zcheck!(self.write_lease(*lease));
                zcheck!(self.write_zint(*initial_sn));
            }

            TransportBody::Close(Close { pid, reason, .. }) => {
                if let Some(p) = pid {
                    zcheck!(self.write_peerid(p));
                }
                zcheck!(self.write(*reason));
            }

            TransportBody::Sync(sync) => {
                zcheck!(self.write_zint(sync.sn));
                if let Some(c) = sync.wire_count() {
                    zcheck!(self.write_zint(c));
                }
            }

            TransportBody::AckNack(AckNack { sn, mask }) => {
                zcheck!(self.write_zint(*sn));
                if let Some(m) = *mask {
                    zcheck!(self.write_zint(m));
                }
            }

            TransportBody::KeepAlive(KeepAlive { pid }) => {
                if let Some(p) = pid {
                    zcheck!(self.write_peerid(p));
                }
            }

            TransportBody::Ping(Ping { hash }) | TransportBody::Pong(Pong { hash }) => {
                zcheck!(self.write_zint(*hash));
            }
        }

        true
    }

    // The lease is expressed in seconds whenever possible, the header
    // carrying the corresponding T flag
    fn write_lease(&mut self, lease: ZInt) -> bool {
        if lease % 1_000 == 0 {
            self.write_zint(lease / 1_000)
        } else {
            self.write_zint(lease)
        }
    }

    fn write_conduit_sn(&mut self, sn: &ConduitSn) -> bool {
        self.write_zint(sn.reliable) && self.write_zint(sn.best_effort)
    }

    pub fn write_zenoh_message(&mut self, msg: &ZenohMessage) -> bool {
        if let Some(attachment) = &msg.attachment {
            zcheck!(self.write_deco_attachment(attachment));
        }
        if let Some(reply_context) = &msg.reply_context {
            zcheck!(self.write_deco_reply_context(reply_context));
        }

        zcheck!(self.write(msg.header()));
        match &msg.body {
            ZenohBody::Data {
                key,
                data_info,
                payload,
            } => {
                zcheck!(self.write_reskey(key));
                if let Some(data_info) = data_info {
                    zcheck!(self.write_data_info(data_info));
                }
                zcheck!(self.write_rbuf(payload));
            }

            ZenohBody::Declare { declarations } => {
                zcheck!(self.write_declarations(declarations));
            }

            ZenohBody::Unit => {}

            ZenohBody::Pull {
                key,
                pull_id,
                max_samples,
                ..
            } => {
                zcheck!(self.write_reskey(key));
                zcheck!(self.write_zint(*pull_id));
                if let Some(n) = max_samples {
                    zcheck!(self.write_zint(*n));
                }
            }

            ZenohBody::Query {
                key,
                predicate,
                qid,
                target,
                consolidation,
            } => {
                zcheck!(self.write_reskey(key));
                zcheck!(self.write_string(predicate));
                zcheck!(self.write_zint(*qid));
                if let Some(t) = target {
                    zcheck!(self.write_query_target(t));
                }
                zcheck!(self.write_consolidation(consolidation));
            }
        }

        true
    }

    pub fn write_deco_attachment(&mut self, attachment: &Attachment) -> bool {
        zcheck!(self.write(attachment.header()));
        self.write_rbuf(&attachment.buffer)
    }

    pub fn write_deco_reply_context(&mut self, reply_context: &ReplyContext) -> bool {
        zcheck!(self.write(reply_context.header()));
        zcheck!(self.write_zint(reply_context.qid));
        if let Some(replier) = &reply_context.replier {
            zcheck!(self.write_zint(replier.kind));
            zcheck!(self.write_peerid(&replier.id));
        }
        true
    }

    pub fn write_data_info(&mut self, info: &DataInfo) -> bool {
        zcheck!(self.write_zint(info.options()));
        if let Some(kind) = info.kind {
            zcheck!(self.write_zint(kind));
        }
        if let Some(enc) = &info.encoding {
            zcheck!(self.write_encoding(enc));
        }
        if let Some(ts) = &info.timestamp {
            zcheck!(self.write_timestamp(ts));
        }
        if let Some(pid) = &info.source_id {
            zcheck!(self.write_peerid(pid));
        }
        if let Some(sn) = info.source_sn {
            zcheck!(self.write_zint(sn));
        }
        if let Some(pid) = &info.first_router_id {
            zcheck!(self.write_peerid(pid));
        }
        if let Some(sn) = info.first_router_sn {
            zcheck!(self.write_zint(sn));
        }
        true
    }

    pub fn write_encoding(&mut self, encoding: &Encoding) -> bool {
        self.write_zint(encoding.prefix) && self.write_string(&encoding.suffix)
    }

    pub fn write_declarations(&mut self, declarations: &[Declaration]) -> bool {
        zcheck!(self.write_usize_as_zint(declarations.len()));
        for l in declarations {
            zcheck!(self.write_declaration(l));
        }
        true
    }

    pub fn write_declaration(&mut self, declaration: &Declaration) -> bool {
        zcheck!(self.write(declaration.header()));
        match declaration {
            Declaration::Resource { rid, key } => {
                self.write_zint(*rid) && self.write_reskey(key)
            }

            Declaration::ForgetResource { rid } => self.write_zint(*rid),

            Declaration::Subscriber { key, info } => {
                zcheck!(self.write_reskey(key));
                if info.has_mode() {
                    zcheck!(self.write_submode(&info.mode, &info.period));
                }
                true
            }

            Declaration::Queryable { key, kind, info } => {
                zcheck!(self.write_reskey(key));
                zcheck!(self.write_zint(*kind));
                if let Some(info) = info {
                    zcheck!(self.write_zint(info.complete));
                    zcheck!(self.write_zint(info.distance));
                }
                true
            }

            Declaration::Publisher { key }
            | Declaration::ForgetPublisher { key }
            | Declaration::ForgetSubscriber { key }
            | Declaration::ForgetQueryable { key } => self.write_reskey(key),
        }
    }

    fn write_submode(&mut self, mode: &SubMode, period: &Option<Period>) -> bool {
        use super::decl::id::*;

        let mut byte = match mode {
            SubMode::Push => MODE_PUSH,
            SubMode::Pull => MODE_PULL,
        };
        if period.is_some() {
            byte |= PERIOD;
        }
        zcheck!(self.write(byte));
        if let Some(p) = period {
            self.write_zint(p.origin) && self.write_zint(p.period) && self.write_zint(p.duration)
        } else {
            true
        }
    }

    pub fn write_reskey(&mut self, key: &ResKey) -> bool {
        match key {
            ResKey::RId(rid) => self.write_zint(*rid),
            ResKey::RName(name) => self.write_zint(NO_RESOURCE_ID) && self.write_string(name),
            ResKey::RIdWithSuffix(rid, suffix) => {
                self.write_zint(*rid) && self.write_string(suffix)
            }
        }
    }

    fn write_query_target(&mut self, target: &QueryTarget) -> bool {
        self.write_zint(target.kind) && self.write_target(&target.target)
    }

    fn write_target(&mut self, target: &Target) -> bool {
        use super::zmsg::query::target::*;

        match target {
            Target::BestMatching => self.write_zint(BEST_MATCHING),
            Target::Complete { n } => self.write_zint(COMPLETE) && self.write_zint(*n),
            Target::All => self.write_zint(ALL),
            Target::None => self.write_zint(NONE),
        }
    }

    fn write_consolidation(&mut self, consolidation: &QueryConsolidation) -> bool {
        fn consolidation_mode(mode: ConsolidationMode) -> ZInt {
            use super::zmsg::query::consolidation::*;

            match mode {
                ConsolidationMode::None => NONE,
                ConsolidationMode::Lazy => LAZY,
                ConsolidationMode::Full => FULL,
            }
        }

        self.write_zint(
            (consolidation_mode(consolidation.first_routers) << 4)
                | (consolidation_mode(consolidation.last_router) << 2)
                | consolidation_mode(consolidation.reception),
        )
    }

    pub fn write_timestamp(&mut self, tstamp: &Timestamp) -> bool {
        self.write_zint(tstamp.time) && self.write_peerid(&tstamp.id)
    }

    pub fn write_peerid(&mut self, pid: &PeerId) -> bool {
        self.write_bytes_array(pid.as_slice())
    }

    // Writes a fragment of a serialized message: the raw bytes, without length
    pub fn write_fragment(&mut self, fragment: &RBuf) -> bool {
        self.write_bytes(fragment.as_slice())
    }
}
