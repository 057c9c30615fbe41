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
use super::{TransportChannelRx, TransportUnicast};
use crate::core::{PeerId, Reliability, ZInt};
use crate::io::RBuf;
use crate::proto::{
    tmsg, Close, Frame, FramePayload, TransportBody, TransportMessage, ZenohMessage,
};
use std::sync::atomic::Ordering;
use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::{zasynclock, zerror, zlock};

/*************************************/
/*            TRANSPORT RX           */
/*************************************/
impl TransportUnicast {
    /// Reads one batch from the link and decodes all the transport messages it contains.
    ///
    /// On a streamed link the batch is prefixed by its length as a 16 bits
    /// little endian integer, on a datagram link a batch is a whole datagram.
    pub async fn receive_transport_messages(&self) -> ZResult<Vec<TransportMessage>> {
        let link = &self.0.link;
        let capacity = self.0.batch_size;

        // Acquire the lock on the RX buffer
        let mut guard = zasynclock!(self.0.rx_buffer);

        if link.is_streamed() {
            // Read and decode the message length
            let mut length = [0u8; 2];
            link.read_exact(&mut length).await?;
            let to_read = u16::from_le_bytes(length) as usize;
            log::trace!("Transport: {}. Reading {} bytes", self.0.config.pid, to_read);
            if to_read > capacity {
                return zerror!(ZErrorKind::BufferOverflow {
                    missing: to_read - capacity
                });
            }
            // Read enough bytes to decode the message
            link.read_exact(guard.prepare_fill(to_read)).await?;
        } else {
            let n = link.read(guard.prepare_fill(capacity)).await?;
            if n == 0 {
                // Reading 0 bytes means error
                return zerror!(ZErrorKind::IoError {
                    descr: "zero bytes reading".to_string()
                });
            }
            guard.truncate(n);
        }

        // Mark the transport that we have received data
        self.0.received.store(true, Ordering::Release);

        guard.read_transport_messages()
    }

    fn trigger_callback(&self, msg: ZenohMessage) -> ZResult<()> {
        self.0.callback.handle_message(msg)
    }

    fn handle_close(&self, pid: Option<PeerId>, reason: u8, link_only: bool) -> ZResult<()> {
        // Check if the PID is correct when provided
        if let Some(pid) = pid {
            if pid != self.0.config.pid {
                log::warn!(
                    "Received an invalid Close from peer {} with reason: {}. Ignoring.",
                    pid,
                    tmsg::close_reason_to_str(reason)
                );
                return Ok(());
            }
        }

        log::debug!(
            "Transport: {}. Closing as requested by the remote peer (link only: {}). Reason: {}",
            self.0.config.pid,
            link_only,
            tmsg::close_reason_to_str(reason)
        );
        self.delete();

        Ok(())
    }

    fn handle_frame(&self, reliability: Reliability, sn: ZInt, payload: FramePayload) -> ZResult<()> {
        // The channel lock is released before triggering the callback
        let messages: Vec<ZenohMessage> = {
            let mut guard = match reliability {
                Reliability::Reliable => zlock!(self.0.rx_reliable),
                Reliability::BestEffort => zlock!(self.0.rx_best_effort),
            };

            // Only monotonic SNs are ensured, missing frames are not recovered
            let precedes = guard.sn.precedes(sn)?;
            if !precedes {
                log::warn!(
                    "Transport: {}. {:?} frame dropped because it is out of order: {}. Last: {}.",
                    self.0.config.pid,
                    reliability,
                    sn,
                    guard.sn.get()
                );
                // Drop the fragments if needed
                guard.defrag.clear();
                return Ok(());
            }

            // Set will always return OK because we have already checked
            // with precedes() that the sn has the right resolution
            guard.sn.set(sn)?;
            match payload {
                FramePayload::Fragment { buffer, is_final } => self
                    .handle_fragment(&mut guard, sn, buffer, is_final)
                    .into_iter()
                    .collect(),
                FramePayload::Messages { messages } => {
                    if !guard.defrag.is_idle() {
                        // The final fragment of the previous message has been lost
                        log::trace!(
                            "Transport: {}. {:?} incomplete message discarded",
                            self.0.config.pid,
                            reliability
                        );
                        guard.defrag.clear();
                    }
                    messages
                }
            }
        };

        for msg in messages {
            self.trigger_callback(msg)?;
        }
        Ok(())
    }

    fn handle_fragment(
        &self,
        channel: &mut TransportChannelRx,
        sn: ZInt,
        buffer: RBuf,
        is_final: bool,
    ) -> Option<ZenohMessage> {
        if let Err(e) = channel.defrag.push(sn, buffer) {
            log::warn!(
                "Transport: {}. Fragment dropped: {}",
                self.0.config.pid,
                e
            );
            if is_final {
                channel.defrag.clear();
            }
            return None;
        }

        if !is_final {
            return None;
        }
        match channel.defrag.defragment() {
            Ok(msg) => msg,
            Err(e) => {
                log::trace!(
                    "Transport: {}. Defragmentation error: {}",
                    self.0.config.pid,
                    e
                );
                None
            }
        }
    }

    /// Dispatches a transport message received from the link.
    pub fn handle_transport_message(&self, msg: TransportMessage) -> ZResult<()> {
        match msg.body {
            TransportBody::Frame(Frame {
                reliability,
                sn,
                payload,
            }) => self.handle_frame(reliability, sn, payload),
            TransportBody::Close(Close {
                pid,
                reason,
                link_only,
            }) => self.handle_close(pid, reason, link_only),
            TransportBody::KeepAlive(_) => {
                log::trace!("Transport: {}. Received KeepAlive", self.0.config.pid);
                Ok(())
            }
            TransportBody::Hello(_)
            | TransportBody::Join(_)
            | TransportBody::InitSyn(_)
            | TransportBody::InitAck(_)
            | TransportBody::OpenSyn(_)
            | TransportBody::OpenAck(_) => {
                // Not expected on an established transport
                log::trace!(
                    "Transport: {}. Ignoring message: {:?}",
                    self.0.config.pid,
                    msg.body
                );
                Ok(())
            }
            TransportBody::Scout(_)
            | TransportBody::Sync(_)
            | TransportBody::AckNack(_)
            | TransportBody::Ping(_)
            | TransportBody::Pong(_) => {
                log::info!(
                    "Transport: {}. Message handling not implemented: {:?}",
                    self.0.config.pid,
                    msg.body
                );
                Ok(())
            }
        }
    }

    /// Receives and dispatches messages until the transport is closed or an error occurs.
    pub async fn rx_loop(&self) -> ZResult<()> {
        while !self.is_closed() {
            let messages = self.receive_transport_messages().await?;
            for msg in messages {
                self.handle_transport_message(msg)?;
                if self.is_closed() {
                    break;
                }
            }
        }
        self.0.link.close().await
    }
}
