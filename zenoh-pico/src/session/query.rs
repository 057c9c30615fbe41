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
use crate::core::{
    AtomicZInt, ConsolidationMode, PeerId, QueryConsolidation, QueryTarget, ResKey, Timestamp,
    ZInt,
};
use crate::io::RBuf;
use crate::proto::{DataInfo, ReplyContext};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::{zerror, zlock};

/// A reply received for a pending query.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyData {
    pub reskey: ResKey,
    pub payload: RBuf,
    pub data_info: Option<DataInfo>,
    pub replier_kind: ZInt,
    pub replier_id: PeerId,
}

impl ReplyData {
    #[inline]
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.data_info.as_ref().and_then(|info| info.timestamp.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Data(ReplyData),
    Final,
}

pub type ReplyCallback = Arc<dyn Fn(Reply) + Send + Sync>;

/// The state of a query waiting for its replies.
pub struct PendingQuery {
    pub id: ZInt,
    pub reskey: ResKey,
    pub predicate: String,
    pub target: QueryTarget,
    pub consolidation: QueryConsolidation,
    // The latest reply for each key, used by the consolidation on reception
    replies: HashMap<ResKey, ReplyData>,
    callback: ReplyCallback,
}

impl PendingQuery {
    pub fn new<F>(
        id: ZInt,
        reskey: ResKey,
        predicate: String,
        target: QueryTarget,
        consolidation: QueryConsolidation,
        callback: F,
    ) -> PendingQuery
    where
        F: Fn(Reply) + Send + Sync + 'static,
    {
        PendingQuery {
            id,
            reskey,
            predicate,
            target,
            consolidation,
            replies: HashMap::new(),
            callback: Arc::new(callback),
        }
    }

    // Returns true if the reply has to be kept w.r.t. the replies already received for its key
    fn is_newer(&self, reply: &ReplyData) -> bool {
        match self.replies.get(&reply.reskey) {
            Some(previous) => reply.timestamp() > previous.timestamp(),
            None => true,
        }
    }

    // Returns the reply to deliver right away, if any
    fn consolidate(&mut self, reply: ReplyData) -> Option<ReplyData> {
        match self.consolidation.reception {
            ConsolidationMode::None => Some(reply),
            ConsolidationMode::Lazy => {
                if self.is_newer(&reply) {
                    self.replies.insert(reply.reskey.clone(), reply.clone());
                    Some(reply)
                } else {
                    None
                }
            }
            ConsolidationMode::Full => {
                if self.is_newer(&reply) {
                    self.replies.insert(reply.reskey.clone(), reply);
                }
                None
            }
        }
    }

    // Delivers the replies still pending and the final notification
    fn finalize(self) {
        if self.consolidation.reception == ConsolidationMode::Full {
            for (_, reply) in self.replies.into_iter() {
                (self.callback)(Reply::Data(reply));
            }
        }
        (self.callback)(Reply::Final);
    }
}

impl fmt::Debug for PendingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingQuery")
            .field("id", &self.id)
            .field("reskey", &self.reskey)
            .field("predicate", &self.predicate)
            .field("target", &self.target)
            .field("consolidation", &self.consolidation)
            .finish()
    }
}

/// The registry of the queries waiting for their replies, indexed by query id.
///
/// The callbacks of the queries are never invoked while holding the lock on the registry.
#[derive(Default)]
pub struct PendingQueries {
    query_id: AtomicZInt,
    queries: Mutex<HashMap<ZInt, PendingQuery>>,
}

impl PendingQueries {
    pub fn new() -> PendingQueries {
        PendingQueries::default()
    }

    /// Allocates a new query id.
    #[inline]
    pub fn get_query_id(&self) -> ZInt {
        self.query_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        zlock!(self.queries).len()
    }

    pub fn is_empty(&self) -> bool {
        zlock!(self.queries).is_empty()
    }

    pub fn contains(&self, id: ZInt) -> bool {
        zlock!(self.queries).contains_key(&id)
    }

    /// Reads the state of a pending query while holding the lock on the registry.
    /// `f` must not access the registry.
    pub fn lookup<F, R>(&self, id: ZInt, f: F) -> Option<R>
    where
        F: FnOnce(&PendingQuery) -> R,
    {
        zlock!(self.queries).get(&id).map(f)
    }

    pub fn register(&self, query: PendingQuery) -> ZResult<()> {
        let mut guard = zlock!(self.queries);
        if guard.contains_key(&query.id) {
            return zerror!(ZErrorKind::InvalidReference {
                descr: format!("Query {} is already registered", query.id)
            });
        }
        log::trace!("Register query {}", query.id);
        guard.insert(query.id, query);
        Ok(())
    }

    /// Removes a query without notifying its callback.
    pub fn unregister(&self, id: ZInt) -> Option<PendingQuery> {
        log::trace!("Unregister query {}", id);
        zlock!(self.queries).remove(&id)
    }

    pub fn trigger_reply_partial(
        &self,
        reply_context: &ReplyContext,
        reskey: ResKey,
        payload: RBuf,
        data_info: Option<DataInfo>,
    ) -> ZResult<()> {
        let replier = match &reply_context.replier {
            Some(replier) => replier.clone(),
            None => {
                return zerror!(ZErrorKind::InvalidMessage {
                    descr: format!("Partial reply to query {} without replier", reply_context.qid)
                })
            }
        };

        let mut guard = zlock!(self.queries);
        let query = match guard.get_mut(&reply_context.qid) {
            Some(query) => query,
            None => {
                return zerror!(ZErrorKind::InvalidReference {
                    descr: format!("Received reply for unknown query {}", reply_context.qid)
                })
            }
        };

        let reply = ReplyData {
            reskey,
            payload,
            data_info,
            replier_kind: replier.kind,
            replier_id: replier.id,
        };
        if let Some(reply) = query.consolidate(reply) {
            let callback = query.callback.clone();
            drop(guard);
            callback(Reply::Data(reply));
        }

        Ok(())
    }

    pub fn trigger_reply_final(&self, reply_context: &ReplyContext) -> ZResult<()> {
        let query = zlock!(self.queries).remove(&reply_context.qid);
        match query {
            Some(query) => {
                log::trace!("Close query {}", query.id);
                query.finalize();
                Ok(())
            }
            None => zerror!(ZErrorKind::InvalidReference {
                descr: format!("Received final reply for unknown query {}", reply_context.qid)
            }),
        }
    }

    /// Removes all the queries, notifying each one as if it had received its final reply.
    pub fn flush(&self) {
        let queries: Vec<PendingQuery> = zlock!(self.queries).drain().map(|(_, q)| q).collect();
        for query in queries {
            log::trace!("Flush query {}", query.id);
            query.finalize();
        }
    }
}
