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
use crate::io::RBuf;

use super::decl::{self, Declaration};
use super::msg::*;

use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::zerror;

impl RBuf {
    // Reads all the transport messages contained in the buffer.
    // A failure on any of them invalidates the whole batch.
    pub fn read_transport_messages(&mut self) -> ZResult<Vec<TransportMessage>> {
        let mut messages: Vec<TransportMessage> = Vec::with_capacity(1);
        while self.can_read() {
            messages.push(self.read_transport_message()?);
        }
        Ok(messages)
    }

    pub fn read_transport_message(&mut self) -> ZResult<TransportMessage> {
        use super::tmsg::id::*;

        let mut attachment = None;

        // Read the message
        let body = loop {
            // Read the header
            let header = self.read()?;

            // Read the body
            match imsg::mid(header) {
                // Frame as first for optimization reasons
                FRAME => break TransportBody::Frame(self.read_frame(header)?),

                // Decorator
                ATTACHMENT => {
                    attachment = Some(self.read_deco_attachment(header)?);
                    continue;
                }

                // Messages
                SCOUT => {
                    let pid_request = imsg::has_flag(header, tmsg::flag::I);
                    let what = if imsg::has_flag(header, tmsg::flag::W) {
                        Some(self.read_zint()?)
                    } else {
                        None
                    };

                    break TransportBody::Scout(Scout { what, pid_request });
                }

                HELLO => {
                    let pid = if imsg::has_flag(header, tmsg::flag::I) {
                        Some(self.read_peerid()?)
                    } else {
                        None
                    };
                    let whatami = if imsg::has_flag(header, tmsg::flag::W) {
                        Some(self.read_zint()?)
                    } else {
                        None
                    };
                    let locators = if imsg::has_flag(header, tmsg::flag::L) {
                        Some(self.read_string_array()?)
                    } else {
                        None
                    };

                    break TransportBody::Hello(Hello {
                        pid,
                        whatami,
                        locators,
                    });
                }

                JOIN => break TransportBody::Join(self.read_join(header)?),

                INIT => {
                    let options = if imsg::has_flag(header, tmsg::flag::O) {
                        self.read_zint()?
                    } else {
                        0
                    };
                    let is_qos = imsg::has_option(options, tmsg::init_options::QOS);

                    if imsg::has_flag(header, tmsg::flag::A) {
                        let whatami = self.read_zint()?;
                        let pid = self.read_peerid()?;
                        let sn_resolution = if imsg::has_flag(header, tmsg::flag::S) {
                            Some(self.read_zint()?)
                        } else {
                            None
                        };
                        let cookie = self.read_rbuf()?;

                        break TransportBody::InitAck(InitAck {
                            whatami,
                            pid,
                            sn_resolution,
                            is_qos,
                            cookie,
                        });
                    } else {
                        let version = self.read()?;
                        let whatami = self.read_zint()?;
                        let pid = self.read_peerid()?;
                        let sn_resolution = if imsg::has_flag(header, tmsg::flag::S) {
                            Some(self.read_zint()?)
                        } else {
                            None
                        };

                        break TransportBody::InitSyn(InitSyn {
                            version,
                            whatami,
                            pid,
                            sn_resolution,
                            is_qos,
                        });
                    }
                }

                OPEN => {
                    let lease = self.read_lease(imsg::has_flag(header, tmsg::flag::T2))?;
                    let initial_sn = self.read_zint()?;

                    if imsg::has_flag(header, tmsg::flag::A) {
                        break TransportBody::OpenAck(OpenAck { lease, initial_sn });
                    } else {
                        let cookie = self.read_rbuf()?;
                        break TransportBody::OpenSyn(OpenSyn {
                            lease,
                            initial_sn,
                            cookie,
                        });
                    }
                }

                CLOSE => {
                    let link_only = imsg::has_flag(header, tmsg::flag::K);
                    let pid = if imsg::has_flag(header, tmsg::flag::I) {
                        Some(self.read_peerid()?)
                    } else {
                        None
                    };
                    let reason = self.read()?;

                    break TransportBody::Close(Close {
                        pid,
                        reason,
                        link_only,
                    });
                }

                SYNC => {
                    let reliability = if imsg::has_flag(header, tmsg::flag::R) {
                        Reliability::Reliable
                    } else {
                        Reliability::BestEffort
                    };
                    let sn = self.read_zint()?;
                    let count = if imsg::has_flag(header, tmsg::flag::R)
                        && imsg::has_flag(header, tmsg::flag::C)
                    {
                        Some(self.read_zint()?)
                    } else {
                        None
                    };

                    break TransportBody::Sync(Sync {
                        reliability,
                        sn,
                        count,
                    });
                }

                ACK_NACK => {
                    let sn = self.read_zint()?;
                    let mask = if imsg::has_flag(header, tmsg::flag::M) {
                        Some(self.read_zint()?)
                    } else {
                        None
                    };

                    break TransportBody::AckNack(AckNack { sn, mask });
                }

                KEEP_ALIVE => {
                    let pid = if imsg::has_flag(header, tmsg::flag::I) {
                        Some(self.read_peerid()?)
                    } else {
                        None
                    };

                    break TransportBody::KeepAlive(KeepAlive { pid });
                }

                PING_PONG => {
                    let hash = self.read_zint()?;

                    if imsg::has_flag(header, tmsg::flag::P) {
                        break TransportBody::Ping(Ping { hash });
                    } else {
                        break TransportBody::Pong(Pong { hash });
                    }
                }

                unknown => {
                    return zerror!(ZErrorKind::InvalidMessage {
                        descr: format!("Transport message with unknown ID: {}", unknown)
                    });
                }
            }
        };

        Ok(TransportMessage { body, attachment })
    }

    fn read_frame(&mut self, header: u8) -> ZResult<Frame> {
        let reliability = if imsg::has_flag(header, tmsg::flag::R) {
            Reliability::Reliable
        } else {
            Reliability::BestEffort
        };
        let sn = self.read_zint()?;

        let payload = if imsg::has_flag(header, tmsg::flag::F) {
            // A fragmented frame is not supposed to be followed by
            // any other frame in the same batch. Read all the bytes.
            let buffer = self.drain_into_rbuf();
            let is_final = imsg::has_flag(header, tmsg::flag::E);

            FramePayload::Fragment { buffer, is_final }
        } else {
            let mut messages: Vec<ZenohMessage> = Vec::with_capacity(1);
            while self.can_read() {
                let pos = self.get_pos();
                match self.read_zenoh_message(reliability) {
                    Ok(msg) => messages.push(msg),
                    Err(_) => {
                        // Not a zenoh message: it is the beginning of the next
                        // transport message in the batch
                        self.set_pos(pos)?;
                        break;
                    }
                }
            }

            FramePayload::Messages { messages }
        };

        Ok(Frame {
            reliability,
            sn,
            payload,
        })
    }

    fn read_join(&mut self, header: u8) -> ZResult<Join> {
        let options = if imsg::has_flag(header, tmsg::flag::O) {
            self.read_zint()?
        } else {
            0
        };
        let version = self.read()?;
        let whatami = self.read_zint()?;
        let pid = self.read_peerid()?;
        let lease = self.read_lease(imsg::has_flag(header, tmsg::flag::T1))?;
        let sn_resolution = if imsg::has_flag(header, tmsg::flag::S) {
            Some(self.read_zint()?)
        } else {
            None
        };
        let next_sns = if imsg::has_option(options, tmsg::join_options::QOS) {
            let mut sns = Box::new([ConduitSn::default(); tmsg::conduit::PRIORITIES]);
            for sn in sns.iter_mut() {
                *sn = self.read_conduit_sn()?;
            }
            ConduitSnList::QoS(sns)
        } else {
            ConduitSnList::Plain(self.read_conduit_sn()?)
        };

        Ok(Join {
            version,
            whatami,
            pid,
            lease,
            sn_resolution,
            next_sns,
        })
    }

    fn read_conduit_sn(&mut self) -> ZResult<ConduitSn> {
        let reliable = self.read_zint()?;
        let best_effort = self.read_zint()?;
        Ok(ConduitSn {
            reliable,
            best_effort,
        })
    }

    // The lease is always returned in milliseconds
    fn read_lease(&mut self, in_seconds: bool) -> ZResult<ZInt> {
        let lease = self.read_zint()?;
        if in_seconds {
            match lease.checked_mul(1_000) {
                Some(l) => Ok(l),
                None => zerror!(ZErrorKind::InvalidMessage {
                    descr: format!("Lease of {} seconds is out of bound", lease)
                }),
            }
        } else {
            Ok(lease)
        }
    }

    pub fn read_zenoh_message(&mut self, reliability: Reliability) -> ZResult<ZenohMessage> {
        use super::zmsg::id::*;

        // Message decorators
        let mut reply_context = None;
        let mut attachment = None;

        // Read the message
        let (body, congestion_control) = loop {
            // Read the header
            let header = self.read()?;

            // Read the body
            match imsg::mid(header) {
                // Message data as first for optimization reasons
                DATA => {
                    let congestion_control = if imsg::has_flag(header, zmsg::flag::D) {
                        CongestionControl::Drop
                    } else {
                        CongestionControl::Block
                    };
                    let key = self.read_reskey(imsg::has_flag(header, zmsg::flag::K))?;
                    let data_info = if imsg::has_flag(header, zmsg::flag::I) {
                        Some(self.read_data_info()?)
                    } else {
                        None
                    };
                    let payload = self.read_rbuf()?;

                    let body = ZenohBody::Data {
                        key,
                        data_info,
                        payload,
                    };
                    break (body, congestion_control);
                }

                // Decorators
                REPLY_CONTEXT => {
                    reply_context = Some(self.read_deco_reply_context(header)?);
                    continue;
                }

                ATTACHMENT => {
                    attachment = Some(self.read_deco_attachment(header)?);
                    continue;
                }

                // Messages
                DECLARE => {
                    let declarations = self.read_declarations()?;

                    let body = ZenohBody::Declare { declarations };
                    let congestion_control = zmsg::default_congestion_control::DECLARE;
                    break (body, congestion_control);
                }

                UNIT => {
                    let congestion_control = if imsg::has_flag(header, zmsg::flag::D) {
                        CongestionControl::Drop
                    } else {
                        CongestionControl::Block
                    };
                    break (ZenohBody::Unit, congestion_control);
                }

                PULL => {
                    let is_final = imsg::has_flag(header, zmsg::flag::F);
                    let key = self.read_reskey(imsg::has_flag(header, zmsg::flag::K))?;
                    let pull_id = self.read_zint()?;
                    let max_samples = if imsg::has_flag(header, zmsg::flag::N) {
                        Some(self.read_zint()?)
                    } else {
                        None
                    };

                    let body = ZenohBody::Pull {
                        key,
                        pull_id,
                        max_samples,
                        is_final,
                    };
                    let congestion_control = zmsg::default_congestion_control::PULL;
                    break (body, congestion_control);
                }

                QUERY => {
                    let key = self.read_reskey(imsg::has_flag(header, zmsg::flag::K))?;
                    let predicate = self.read_string()?;
                    let qid = self.read_zint()?;
                    let target = if imsg::has_flag(header, zmsg::flag::T) {
                        Some(self.read_query_target()?)
                    } else {
                        None
                    };
                    let consolidation = self.read_consolidation()?;

                    let body = ZenohBody::Query {
                        key,
                        predicate,
                        qid,
                        target,
                        consolidation,
                    };
                    let congestion_control = zmsg::default_congestion_control::QUERY;
                    break (body, congestion_control);
                }

                unknown => {
                    return zerror!(ZErrorKind::InvalidMessage {
                        descr: format!("Zenoh message with unknown ID: {}", unknown)
                    });
                }
            }
        };

        Ok(ZenohMessage {
            body,
            reliability,
            congestion_control,
            reply_context,
            attachment,
        })
    }

    pub fn read_deco_attachment(&mut self, header: u8) -> ZResult<Attachment> {
        let encoding = imsg::flags(header);
        let buffer = self.read_rbuf()?;
        Ok(Attachment { encoding, buffer })
    }

    pub fn read_deco_reply_context(&mut self, header: u8) -> ZResult<ReplyContext> {
        let qid = self.read_zint()?;
        let replier = if imsg::has_flag(header, zmsg::flag::F) {
            None
        } else {
            let kind = self.read_zint()?;
            let id = self.read_peerid()?;
            Some(ReplierInfo { kind, id })
        };
        Ok(ReplyContext { qid, replier })
    }

    pub fn read_data_info(&mut self) -> ZResult<DataInfo> {
        let options = self.read_zint()?;
        let kind = if imsg::has_option(options, zmsg::data::info::KIND) {
            Some(self.read_zint()?)
        } else {
            None
        };
        let encoding = if imsg::has_option(options, zmsg::data::info::ENCODING) {
            Some(self.read_encoding()?)
        } else {
            None
        };
        let timestamp = if imsg::has_option(options, zmsg::data::info::TIMESTAMP) {
            Some(self.read_timestamp()?)
        } else {
            None
        };
        let source_id = if imsg::has_option(options, zmsg::data::info::SRCID) {
            Some(self.read_peerid()?)
        } else {
            None
        };
        let source_sn = if imsg::has_option(options, zmsg::data::info::SRCSN) {
            Some(self.read_zint()?)
        } else {
            None
        };
        let first_router_id = if imsg::has_option(options, zmsg::data::info::RTRID) {
            Some(self.read_peerid()?)
        } else {
            None
        };
        let first_router_sn = if imsg::has_option(options, zmsg::data::info::RTRSN) {
            Some(self.read_zint()?)
        } else {
            None
        };

        Ok(DataInfo {
            kind,
            encoding,
            timestamp,
            source_id,
            source_sn,
            first_router_id,
            first_router_sn,
        })
    }

    pub fn read_encoding(&mut self) -> ZResult<Encoding> {
        let prefix = self.read_zint()?;
        let suffix = self.read_string()?;
        Ok(Encoding { prefix, suffix })
    }

    pub fn read_declarations(&mut self) -> ZResult<Vec<Declaration>> {
        let len = self.read_zint_as_usize()?;
        // Each declaration takes at least one byte on the wire
        if len > self.readable() {
            return zerror!(ZErrorKind::BufferUnderflow {
                missing: len - self.readable()
            });
        }
        let mut vec: Vec<Declaration> = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(self.read_declaration()?);
        }
        Ok(vec)
    }

    pub fn read_declaration(&mut self) -> ZResult<Declaration> {
        use super::decl::id::*;
        use super::decl::Declaration::*;

        macro_rules! read_key_decl {
            ($buf:ident, $header:ident, $type:ident) => {{
                Ok($type {
                    key: $buf.read_reskey(imsg::has_flag($header, zmsg::flag::K))?,
                })
            }};
        }

        let header = self.read()?;
        match imsg::mid(header) {
            RESOURCE => {
                let rid = self.read_zint()?;
                let key = self.read_reskey(imsg::has_flag(header, zmsg::flag::K))?;
                Ok(Resource { rid, key })
            }

            FORGET_RESOURCE => {
                let rid = self.read_zint()?;
                Ok(ForgetResource { rid })
            }

            SUBSCRIBER => {
                let reliability = if imsg::has_flag(header, zmsg::flag::R) {
                    Reliability::Reliable
                } else {
                    Reliability::BestEffort
                };
                let key = self.read_reskey(imsg::has_flag(header, zmsg::flag::K))?;
                let (mode, period) = if imsg::has_flag(header, zmsg::flag::S) {
                    self.read_submode()?
                } else {
                    (SubMode::Push, None)
                };
                Ok(Subscriber {
                    key,
                    info: SubInfo {
                        reliability,
                        mode,
                        period,
                    },
                })
            }

            QUERYABLE => {
                let key = self.read_reskey(imsg::has_flag(header, zmsg::flag::K))?;
                let kind = self.read_zint()?;
                let info = if imsg::has_flag(header, decl::flag::Q) {
                    let complete = self.read_zint()?;
                    let distance = self.read_zint()?;
                    Some(QueryableInfo { complete, distance })
                } else {
                    None
                };
                Ok(Queryable { key, kind, info })
            }

            FORGET_SUBSCRIBER => read_key_decl!(self, header, ForgetSubscriber),
            PUBLISHER => read_key_decl!(self, header, Publisher),
            FORGET_PUBLISHER => read_key_decl!(self, header, ForgetPublisher),
            FORGET_QUERYABLE => read_key_decl!(self, header, ForgetQueryable),

            id => zerror!(ZErrorKind::InvalidMessage {
                descr: format!("Declaration with unknown ID: {}", id)
            }),
        }
    }

    fn read_submode(&mut self) -> ZResult<(SubMode, Option<Period>)> {
        use super::decl::id::*;

        let mode_flag = self.read()?;
        let mode = match mode_flag & !PERIOD {
            MODE_PUSH => SubMode::Push,
            MODE_PULL => SubMode::Pull,
            id => {
                return zerror!(ZErrorKind::InvalidMessage {
                    descr: format!("Unknown SubMode ID: {}", id)
                })
            }
        };
        let period = if imsg::has_flag(mode_flag, PERIOD) {
            Some(Period {
                origin: self.read_zint()?,
                period: self.read_zint()?,
                duration: self.read_zint()?,
            })
        } else {
            None
        };
        Ok((mode, period))
    }

    pub fn read_reskey(&mut self, has_name: bool) -> ZResult<ResKey> {
        let id = self.read_zint()?;
        if has_name {
            let s = self.read_string()?;
            if id == NO_RESOURCE_ID {
                Ok(ResKey::RName(s))
            } else {
                Ok(ResKey::RIdWithSuffix(id, s))
            }
        } else {
            Ok(ResKey::RId(id))
        }
    }

    fn read_query_target(&mut self) -> ZResult<QueryTarget> {
        let kind = self.read_zint()?;
        let target = self.read_target()?;
        Ok(QueryTarget { kind, target })
    }

    fn read_target(&mut self) -> ZResult<Target> {
        use super::zmsg::query::target::*;

        match self.read_zint()? {
            BEST_MATCHING => Ok(Target::BestMatching),
            COMPLETE => {
                let n = self.read_zint()?;
                Ok(Target::Complete { n })
            }
            ALL => Ok(Target::All),
            NONE => Ok(Target::None),
            id => zerror!(ZErrorKind::InvalidMessage {
                descr: format!("Unknown Target ID: {}", id)
            }),
        }
    }

    fn read_consolidation(&mut self) -> ZResult<QueryConsolidation> {
        fn consolidation_mode(bits: ZInt) -> ZResult<ConsolidationMode> {
            use super::zmsg::query::consolidation::*;

            match bits {
                NONE => Ok(ConsolidationMode::None),
                LAZY => Ok(ConsolidationMode::Lazy),
                FULL => Ok(ConsolidationMode::Full),
                id => zerror!(ZErrorKind::InvalidMessage {
                    descr: format!("Unknown ConsolidationMode ID: {}", id)
                }),
            }
        }

        let modes = self.read_zint()?;
        if modes >> 6 != 0 {
            return zerror!(ZErrorKind::InvalidMessage {
                descr: format!("Invalid QueryConsolidation: {}", modes)
            });
        }
        Ok(QueryConsolidation {
            first_routers: consolidation_mode((modes >> 4) & 0x03)?,
            last_router: consolidation_mode((modes >> 2) & 0x03)?,
            reception: consolidation_mode(modes & 0x03)?,
        })
    }

    pub fn read_timestamp(&mut self) -> ZResult<Timestamp> {
        let time = self.read_zint()?;
        let id = self.read_peerid()?;
        Ok(Timestamp { time, id })
    }

    pub fn read_peerid(&mut self) -> ZResult<PeerId> {
        let id = self.read_bytes_array()?;
        Ok(PeerId { id })
    }
}
