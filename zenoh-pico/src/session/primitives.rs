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
use super::PendingQueries;
use crate::core::{
    CongestionControl, PeerId, QueryConsolidation, QueryTarget, QueryableInfo, Reliability,
    ResKey, SubInfo, ZInt,
};
use crate::io::RBuf;
use crate::proto::{DataInfo, Primitives, ReplierInfo, ReplyContext};
use async_std::sync::Arc;

/// Routes the replies to the pending queries of the session and forwards
/// everything else to the inner primitives.
pub struct SessionPrimitives<P: Primitives> {
    queries: Arc<PendingQueries>,
    primitives: P,
}

impl<P: Primitives> SessionPrimitives<P> {
    pub fn new(queries: Arc<PendingQueries>, primitives: P) -> SessionPrimitives<P> {
        SessionPrimitives {
            queries,
            primitives,
        }
    }

    #[inline]
    pub fn queries(&self) -> &Arc<PendingQueries> {
        &self.queries
    }
}

impl<P: Primitives> Primitives for SessionPrimitives<P> {
    fn decl_resource(&self, rid: ZInt, reskey: &ResKey) {
        self.primitives.decl_resource(rid, reskey);
    }

    fn forget_resource(&self, rid: ZInt) {
        self.primitives.forget_resource(rid);
    }

    fn decl_publisher(&self, reskey: &ResKey) {
        self.primitives.decl_publisher(reskey);
    }

    fn forget_publisher(&self, reskey: &ResKey) {
        self.primitives.forget_publisher(reskey);
    }

    fn decl_subscriber(&self, reskey: &ResKey, sub_info: &SubInfo) {
        self.primitives.decl_subscriber(reskey, sub_info);
    }

    fn forget_subscriber(&self, reskey: &ResKey) {
        self.primitives.forget_subscriber(reskey);
    }

    fn decl_queryable(&self, reskey: &ResKey, kind: ZInt, qabl_info: &Option<QueryableInfo>) {
        self.primitives.decl_queryable(reskey, kind, qabl_info);
    }

    fn forget_queryable(&self, reskey: &ResKey) {
        self.primitives.forget_queryable(reskey);
    }

    fn send_data(
        &self,
        reskey: &ResKey,
        payload: RBuf,
        reliability: Reliability,
        congestion_control: CongestionControl,
        data_info: Option<DataInfo>,
    ) {
        self.primitives
            .send_data(reskey, payload, reliability, congestion_control, data_info);
    }

    fn send_query(
        &self,
        reskey: &ResKey,
        predicate: &str,
        qid: ZInt,
        target: QueryTarget,
        consolidation: QueryConsolidation,
    ) {
        self.primitives
            .send_query(reskey, predicate, qid, target, consolidation);
    }

    fn send_reply_data(
        &self,
        qid: ZInt,
        replier_kind: ZInt,
        replier_id: PeerId,
        reskey: ResKey,
        data_info: Option<DataInfo>,
        payload: RBuf,
    ) {
        log::trace!("recv ReplyData {} {} {} {}", qid, replier_kind, replier_id, reskey);
        let reply_context = ReplyContext::make(
            qid,
            Some(ReplierInfo {
                kind: replier_kind,
                id: replier_id,
            }),
        );
        if let Err(e) = self
            .queries
            .trigger_reply_partial(&reply_context, reskey, payload, data_info)
        {
            log::warn!("{}", e);
        }
    }

    fn send_reply_final(&self, qid: ZInt) {
        log::trace!("recv ReplyFinal {}", qid);
        let reply_context = ReplyContext::make(qid, None);
        if let Err(e) = self.queries.trigger_reply_final(&reply_context) {
            log::warn!("{}", e);
        }
    }

    fn send_pull(&self, is_final: bool, reskey: &ResKey, pull_id: ZInt, max_samples: &Option<ZInt>) {
        self.primitives
            .send_pull(is_final, reskey, pull_id, max_samples);
    }

    fn send_close(&self) {
        log::trace!("recv Close");
        self.queries.flush();
        self.primitives.send_close();
    }
}
