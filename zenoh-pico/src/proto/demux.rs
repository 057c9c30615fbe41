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
use super::{Declaration, Primitives, ZenohBody, ZenohMessage};
use crate::session::TransportPeerEventHandler;
use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::zerror;

pub struct DeMux<P: Primitives> {
    primitives: P,
}

impl<P: Primitives> DeMux<P> {
    pub fn new(primitives: P) -> DeMux<P> {
        DeMux { primitives }
    }

    #[inline]
    pub fn primitives(&self) -> &P {
        &self.primitives
    }
}

impl<P: Primitives> TransportPeerEventHandler for DeMux<P> {
    fn handle_message(&self, msg: ZenohMessage) -> ZResult<()> {
        let ZenohMessage {
            body,
            reliability,
            congestion_control,
            reply_context,
            ..
        } = msg;

        match body {
            ZenohBody::Declare { declarations } => {
                for declaration in declarations {
                    match declaration {
                        Declaration::Resource { rid, key } => {
                            self.primitives.decl_resource(rid, &key);
                        }
                        Declaration::Publisher { key } => {
                            self.primitives.decl_publisher(&key);
                        }
                        Declaration::Subscriber { key, info } => {
                            self.primitives.decl_subscriber(&key, &info);
                        }
                        Declaration::Queryable { key, kind, info } => {
                            self.primitives.decl_queryable(&key, kind, &info);
                        }
                        Declaration::ForgetResource { rid } => {
                            self.primitives.forget_resource(rid);
                        }
                        Declaration::ForgetPublisher { key } => {
                            self.primitives.forget_publisher(&key);
                        }
                        Declaration::ForgetSubscriber { key } => {
                            self.primitives.forget_subscriber(&key);
                        }
                        Declaration::ForgetQueryable { key } => {
                            self.primitives.forget_queryable(&key);
                        }
                    }
                }
            }

            ZenohBody::Data {
                key,
                data_info,
                payload,
            } => match reply_context {
                None => {
                    self.primitives.send_data(
                        &key,
                        payload,
                        reliability,
                        congestion_control,
                        data_info,
                    );
                }
                Some(rep) => match rep.replier {
                    Some(replier) => {
                        self.primitives.send_reply_data(
                            rep.qid,
                            replier.kind,
                            replier.id,
                            key,
                            data_info,
                            payload,
                        );
                    }
                    None => {
                        return zerror!(ZErrorKind::Other {
                            descr: "ReplyData with no replier_id".to_string()
                        })
                    }
                },
            },

            ZenohBody::Unit => {
                if let Some(rep) = reply_context {
                    if rep.is_final() {
                        self.primitives.send_reply_final(rep.qid);
                    }
                }
            }

            ZenohBody::Query {
                key,
                predicate,
                qid,
                target,
                consolidation,
            } => {
                self.primitives.send_query(
                    &key,
                    &predicate,
                    qid,
                    target.unwrap_or_default(),
                    consolidation,
                );
            }

            ZenohBody::Pull {
                key,
                pull_id,
                max_samples,
                is_final,
            } => {
                self.primitives
                    .send_pull(is_final, &key, pull_id, &max_samples);
            }
        }

        Ok(())
    }

    fn closing(&self) {
        self.primitives.send_close();
    }

    fn closed(&self) {}
}
