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
use crate::core::{Reliability, ZInt};
use crate::io::{RBuf, WBuf};
use crate::proto::{SeqNum, ZenohMessage};
use crate::session::defaults::ZN_FRAG_BUF_TX_CHUNK;
use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::zerror;

/// Reassembles the fragments of a single [`ZenohMessage`][ZenohMessage]
/// received on a reliability channel.
///
/// The first fragment pushed on an idle buffer starts a new message and the
/// following fragments are expected to carry consecutive sequence numbers.
/// Once a fragment is missing, or the reassembled message exceeds the buffer
/// capacity, the rest of the message is discarded up to its final fragment.
pub struct DefragBuffer {
    reliability: Reliability,
    // Keep track of the next expected fragment
    sn: SeqNum,
    capacity: usize,
    buffer: WBuf,
    // A message is being reassembled
    active: bool,
    drop: bool,
}

impl DefragBuffer {
    pub fn new(
        initial_sn: ZInt,
        sn_resolution: ZInt,
        reliability: Reliability,
        capacity: usize,
    ) -> ZResult<DefragBuffer> {
        Ok(DefragBuffer {
            reliability,
            sn: SeqNum::new(initial_sn, sn_resolution)?,
            capacity,
            buffer: WBuf::new(*ZN_FRAG_BUF_TX_CHUNK, false),
            active: false,
            drop: false,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no message is being reassembled.
    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.active
    }

    #[inline]
    pub fn is_dropping(&self) -> bool {
        self.drop
    }

    #[inline]
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.active = false;
        self.drop = false;
    }

    pub fn push(&mut self, sn: ZInt, fragment: RBuf) -> ZResult<()> {
        if !self.active {
            self.sn.set(sn)?;
            self.active = true;
        }

        if sn != self.sn.get() {
            let expected = self.sn.get();
            // The message can not be completed anymore: keep discarding
            // its fragments until the final one
            self.buffer.clear();
            self.drop = true;
            self.sn.set(sn)?;
            self.sn.increment();
            return zerror!(ZErrorKind::InvalidMessage {
                descr: format!("Expected SN {}, received {}", expected, sn)
            });
        }

        let bytes = fragment.as_slice();
        if !self.drop {
            if self.buffer.len() + bytes.len() > self.capacity {
                log::warn!(
                    "{:?} message exceeds the maximum size of {} bytes and will be dropped",
                    self.reliability,
                    self.capacity
                );
                // Fill the buffer up to its capacity: the message is dropped
                // as soon as its last fragment is received
                let space_left = self.capacity.saturating_sub(self.buffer.len());
                self.buffer.write_bytes(&bytes[..space_left]);
                self.drop = true;
            } else {
                self.buffer.write_bytes(bytes);
            }
        }
        self.sn.increment();

        Ok(())
    }

    /// Decodes the reassembled message and resets the buffer.
    /// Returns `None` if the message has been dropped.
    pub fn defragment(&mut self) -> ZResult<Option<ZenohMessage>> {
        if self.drop {
            log::trace!("{:?} reassembled message discarded", self.reliability);
            self.clear();
            return Ok(None);
        }

        let mut rbuf = RBuf::from(&self.buffer);
        let res = rbuf.read_zenoh_message(self.reliability);
        self.clear();
        res.map(Some)
    }
}
