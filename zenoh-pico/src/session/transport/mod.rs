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
mod defragmentation;
mod fragmentation;
mod rx;
mod tx;

pub use defragmentation::*;
pub use fragmentation::*;

use super::defaults::{ZN_BATCH_SIZE, ZN_FRAG_BUF_TX_CHUNK, ZN_FRAG_MAX_SIZE, ZN_SN_RESOLUTION};
use super::TransportPeerEventHandler;
use crate::core::{whatami, PeerId, Reliability, WhatAmI, ZInt};
use crate::io::{RBuf, WBuf};
use crate::link::LinkUnicast;
use crate::proto::{SeqNum, SeqNumGenerator};
use async_std::sync::{Arc, Mutex as AsyncMutex};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use zenoh_util::core::ZResult;
use zenoh_util::zlock;

/*************************************/
/*              CONFIG               */
/*************************************/
#[derive(Clone, Debug)]
pub struct TransportUnicastConfig {
    // The remote peer id
    pub pid: PeerId,
    // The remote whatami
    pub whatami: WhatAmI,
    pub sn_resolution: ZInt,
    pub initial_sn_tx: ZInt,
    pub initial_sn_rx: ZInt,
    // The maximum size of a batch, further bounded by the link MTU
    pub batch_size: usize,
    // The maximum size of a reassembled message
    pub defrag_buff_size: usize,
}

impl Default for TransportUnicastConfig {
    fn default() -> TransportUnicastConfig {
        TransportUnicastConfig {
            pid: PeerId::default(),
            whatami: whatami::ROUTER,
            sn_resolution: *ZN_SN_RESOLUTION,
            initial_sn_tx: 0,
            initial_sn_rx: 0,
            batch_size: *ZN_BATCH_SIZE,
            defrag_buff_size: *ZN_FRAG_MAX_SIZE,
        }
    }
}

/*************************************/
/*             CHANNELS              */
/*************************************/
pub(crate) struct TransportChannelTx {
    pub(crate) batch: WBuf,
    pub(crate) fragbuf: WBuf,
    pub(crate) sn_reliable: SeqNumGenerator,
    pub(crate) sn_best_effort: SeqNumGenerator,
}

impl TransportChannelTx {
    fn new(initial_sn: ZInt, sn_resolution: ZInt, batch_size: usize) -> ZResult<TransportChannelTx> {
        Ok(TransportChannelTx {
            batch: WBuf::new(batch_size, true),
            fragbuf: WBuf::new(*ZN_FRAG_BUF_TX_CHUNK, false),
            sn_reliable: SeqNumGenerator::new(initial_sn, sn_resolution)?,
            sn_best_effort: SeqNumGenerator::new(initial_sn, sn_resolution)?,
        })
    }
}

pub(crate) struct TransportChannelRx {
    // The last received SN
    pub(crate) sn: SeqNum,
    pub(crate) defrag: DefragBuffer,
}

impl TransportChannelRx {
    fn new(
        reliability: Reliability,
        initial_sn: ZInt,
        sn_resolution: ZInt,
        defrag_buff_size: usize,
    ) -> ZResult<TransportChannelRx> {
        // Set the sequence number in the state as it had
        // received a message with initial_sn - 1
        let last_initial_sn = if initial_sn == 0 {
            sn_resolution.saturating_sub(1)
        } else {
            initial_sn - 1
        };

        Ok(TransportChannelRx {
            sn: SeqNum::new(last_initial_sn, sn_resolution)?,
            defrag: DefragBuffer::new(initial_sn, sn_resolution, reliability, defrag_buff_size)?,
        })
    }
}

/*************************************/
/*             TRANSPORT             */
/*************************************/
pub(crate) struct TransportUnicastInner {
    pub(crate) config: TransportUnicastConfig,
    pub(crate) link: LinkUnicast,
    pub(crate) batch_size: usize,
    // The TX batch and sequence number generators
    pub(crate) tx: AsyncMutex<TransportChannelTx>,
    // The RX buffer, never filled by two readers at the same time
    pub(crate) rx_buffer: AsyncMutex<RBuf>,
    pub(crate) rx_reliable: Mutex<TransportChannelRx>,
    pub(crate) rx_best_effort: Mutex<TransportChannelRx>,
    pub(crate) callback: Arc<dyn TransportPeerEventHandler>,
    // Set every time a message is received, used to check the lease
    pub(crate) received: AtomicBool,
    pub(crate) closed: AtomicBool,
}

/// A unicast transport with a remote peer over a single link.
#[derive(Clone)]
pub struct TransportUnicast(Arc<TransportUnicastInner>);

impl TransportUnicast {
    pub fn new(
        link: LinkUnicast,
        config: TransportUnicastConfig,
        callback: Arc<dyn TransportPeerEventHandler>,
    ) -> ZResult<TransportUnicast> {
        let batch_size = config.batch_size.min(link.get_mtu() as usize);
        let tx = TransportChannelTx::new(config.initial_sn_tx, config.sn_resolution, batch_size)?;
        let rx_reliable = TransportChannelRx::new(
            Reliability::Reliable,
            config.initial_sn_rx,
            config.sn_resolution,
            config.defrag_buff_size,
        )?;
        let rx_best_effort = TransportChannelRx::new(
            Reliability::BestEffort,
            config.initial_sn_rx,
            config.sn_resolution,
            config.defrag_buff_size,
        )?;

        let inner = TransportUnicastInner {
            config,
            link,
            batch_size,
            tx: AsyncMutex::new(tx),
            rx_buffer: AsyncMutex::new(RBuf::with_capacity(batch_size)),
            rx_reliable: Mutex::new(rx_reliable),
            rx_best_effort: Mutex::new(rx_best_effort),
            callback,
            received: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        };

        Ok(TransportUnicast(Arc::new(inner)))
    }

    /*************************************/
    /*            ACCESSORS              */
    /*************************************/
    #[inline]
    pub fn get_pid(&self) -> PeerId {
        self.0.config.pid.clone()
    }

    #[inline]
    pub fn get_whatami(&self) -> WhatAmI {
        self.0.config.whatami
    }

    #[inline]
    pub fn get_sn_resolution(&self) -> ZInt {
        self.0.config.sn_resolution
    }

    #[inline]
    pub fn get_batch_size(&self) -> usize {
        self.0.batch_size
    }

    #[inline]
    pub fn get_link(&self) -> LinkUnicast {
        self.0.link.clone()
    }

    #[inline]
    pub fn get_callback(&self) -> Arc<dyn TransportPeerEventHandler> {
        self.0.callback.clone()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.0.closed.load(Ordering::Acquire)
    }

    /// Returns whether some message has been received since the last call.
    #[inline]
    pub fn take_received(&self) -> bool {
        self.0.received.swap(false, Ordering::AcqRel)
    }

    /// The last sequence number accepted on the given reliability channel.
    pub fn get_sn_rx(&self, reliability: Reliability) -> ZInt {
        match reliability {
            Reliability::Reliable => zlock!(self.0.rx_reliable).sn.get(),
            Reliability::BestEffort => zlock!(self.0.rx_best_effort).sn.get(),
        }
    }

    /// The number of bytes waiting in the defragmentation buffer of the given channel.
    pub fn get_defrag_len(&self, reliability: Reliability) -> usize {
        match reliability {
            Reliability::Reliable => zlock!(self.0.rx_reliable).defrag.len(),
            Reliability::BestEffort => zlock!(self.0.rx_best_effort).defrag.len(),
        }
    }

    /*************************************/
    /*           TERMINATION             */
    /*************************************/
    // Marks the transport as closed and notifies the callback only once
    pub(crate) fn delete(&self) {
        if self.0.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        log::debug!("Closing the transport with peer: {}", self.0.config.pid);
        self.0.callback.closing();
        self.0.callback.closed();
    }
}

impl fmt::Debug for TransportUnicast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportUnicast")
            .field("pid", &self.0.config.pid)
            .field("whatami", &whatami::to_str(self.0.config.whatami))
            .field("sn_resolution", &self.0.config.sn_resolution)
            .field("batch_size", &self.0.batch_size)
            .field("link", &self.0.link)
            .finish()
    }
}
