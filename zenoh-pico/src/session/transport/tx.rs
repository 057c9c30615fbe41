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
use super::{finalize_wbuf, prepare_wbuf, serialize_zenoh_fragment, TransportUnicast};
use crate::core::Reliability;
use crate::io::WBuf;
use crate::link::LinkUnicast;
use crate::proto::{tmsg, TransportMessage, ZenohMessage};
use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::{zasynclock, zerror};

async fn write_batch(link: &LinkUnicast, batch: &mut WBuf) -> ZResult<()> {
    let is_streamed = link.is_streamed();
    finalize_wbuf(batch, is_streamed)?;
    link.write_all(batch.get_first_slice(..)).await
}

/*************************************/
/*            TRANSPORT TX           */
/*************************************/
impl TransportUnicast {
    /// Serializes a transport message in a single batch and sends it on the link.
    pub async fn send_transport_message(&self, msg: &TransportMessage) -> ZResult<()> {
        let link = &self.0.link;
        let mut guard = zasynclock!(self.0.tx);

        prepare_wbuf(&mut guard.batch, link.is_streamed());
        if !guard.batch.write_transport_message(msg) {
            let mut wbuf = WBuf::new(self.0.batch_size, false);
            wbuf.write_transport_message(msg);
            return zerror!(ZErrorKind::BufferOverflow {
                missing: wbuf.len().saturating_sub(self.0.batch_size)
            });
        }

        write_batch(link, &mut guard.batch).await
    }

    /// Sends a zenoh message in a frame. A message that does not fit in
    /// a single batch is serialized first and then sent in fragments,
    /// each one taking a new sequence number.
    pub async fn send_zenoh_message(&self, msg: &ZenohMessage) -> ZResult<()> {
        let link = &self.0.link;
        let is_streamed = link.is_streamed();
        let mut guard = zasynclock!(self.0.tx);
        let tx = &mut *guard;

        let sn_gen = match msg.reliability {
            Reliability::Reliable => &mut tx.sn_reliable,
            Reliability::BestEffort => &mut tx.sn_best_effort,
        };
        let mut sn = sn_gen.get();

        prepare_wbuf(&mut tx.batch, is_streamed);
        if tx.batch.write_frame_header(msg.reliability, sn, None, None)
            && tx.batch.write_zenoh_message(msg)
        {
            return write_batch(link, &mut tx.batch).await;
        }

        // The message does not fit in the batch: fragment it
        tx.fragbuf.clear();
        if !tx.fragbuf.write_zenoh_message(msg) {
            return zerror!(ZErrorKind::InvalidMessage {
                descr: format!("Unable to serialize: {}", msg)
            });
        }

        let mut first = true;
        while !tx.fragbuf.is_empty() {
            // The first fragment reuses the SN of the failed frame
            if !first {
                sn = sn_gen.get();
            }
            first = false;

            prepare_wbuf(&mut tx.batch, is_streamed);
            let written = serialize_zenoh_fragment(&mut tx.batch, &mut tx.fragbuf, msg.reliability, sn);
            if written == 0 {
                log::warn!(
                    "Zenoh message dropped because it can not be fragmented: {:?}",
                    msg
                );
                let missing = tx.fragbuf.len();
                tx.fragbuf.clear();
                return zerror!(ZErrorKind::BufferOverflow { missing });
            }
            log::trace!("Sending fragment with SN {}: {} bytes", sn, written);

            write_batch(link, &mut tx.batch).await?;
        }

        Ok(())
    }

    /// Notifies the remote peer and closes the transport.
    pub async fn close(&self, reason: u8) -> ZResult<()> {
        log::trace!(
            "Closing transport with peer {}: {}",
            self.0.config.pid,
            tmsg::close_reason_to_str(reason)
        );
        let msg = TransportMessage::make_close(None, reason, false, None);
        let res = self.send_transport_message(&msg).await;
        self.delete();
        self.0.link.close().await?;
        res
    }
}
