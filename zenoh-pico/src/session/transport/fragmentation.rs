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
use crate::io::WBuf;
use std::convert::TryFrom;
use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::zerror;

// Number of bytes used to encode the length of a batch on a streamed link
pub(crate) const BATCH_LEN_SIZE: usize = 2;

/// Resets the batch buffer, reserving the space for the
/// batch length when the link is streamed.
pub fn prepare_wbuf(wbuf: &mut WBuf, is_streamed: bool) {
    wbuf.clear();
    if is_streamed {
        // Reserve 16 bits to write the length
        wbuf.write_bytes(&[0u8; BATCH_LEN_SIZE]);
    }
}

/// Writes the batch length in the reserved space of a streamed batch.
pub fn finalize_wbuf(wbuf: &mut WBuf, is_streamed: bool) -> ZResult<()> {
    if !is_streamed {
        return Ok(());
    }
    let length = match u16::try_from(wbuf.len().saturating_sub(BATCH_LEN_SIZE)) {
        Ok(length) => length,
        Err(e) => {
            return zerror!(
                ZErrorKind::BufferOverflow {
                    missing: wbuf.len() - BATCH_LEN_SIZE - u16::MAX as usize
                },
                e
            )
        }
    };
    let bits = wbuf.get_first_slice_mut(..BATCH_LEN_SIZE);
    bits.copy_from_slice(&length.to_le_bytes());
    Ok(())
}

/// Serializes in `dst` a frame carrying the next fragment of the message serialized in `src`.
///
/// The frame header is first written as non-final. If the bytes left in
/// `src` fit entirely in `dst`, the header is rewritten as final.
/// Returns the number of bytes moved from `src`, 0 meaning that not even
/// a single byte of the message fits in `dst`.
pub fn serialize_zenoh_fragment(
    dst: &mut WBuf,
    src: &mut WBuf,
    reliability: Reliability,
    sn: ZInt,
) -> usize {
    // Mark the buffer for the writing operation
    dst.mark();

    if !dst.write_frame_header(reliability, sn, Some(false), None) {
        dst.revert();
        return 0;
    }

    let bytes_left = src.len();
    if bytes_left <= dst.space_left() {
        // This is the last fragment, rewrite the header
        dst.revert();
        if !dst.write_frame_header(reliability, sn, Some(true), None) {
            dst.revert();
            return 0;
        }
    }

    let to_write = std::cmp::min(bytes_left, dst.space_left());
    if to_write == 0 || !dst.siphon(src, to_write) {
        dst.revert();
        return 0;
    }

    to_write
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::RBuf;
    use crate::proto::{FramePayload, TransportBody};

    #[test]
    fn fragment_header_final() {
        let mut src = WBuf::new(16, false);
        assert!(src.write_bytes(&[7u8; 20]));

        let mut dst = WBuf::new(16, true);
        let written = serialize_zenoh_fragment(&mut dst, &mut src, Reliability::Reliable, 1);
        assert_eq!(written, 14);
        let msg = RBuf::from(&dst).read_transport_message().unwrap();
        match msg.body {
            TransportBody::Frame(frame) => match frame.payload {
                FramePayload::Fragment { is_final, buffer } => {
                    assert!(!is_final);
                    assert_eq!(buffer.len(), 14);
                }
                _ => panic!(),
            },
            _ => panic!(),
        }

        dst.clear();
        let written = serialize_zenoh_fragment(&mut dst, &mut src, Reliability::Reliable, 2);
        assert_eq!(written, 6);
        assert!(src.is_empty());
        let msg = RBuf::from(&dst).read_transport_message().unwrap();
        match msg.body {
            TransportBody::Frame(frame) => match frame.payload {
                FramePayload::Fragment { is_final, buffer } => {
                    assert!(is_final);
                    assert_eq!(buffer.to_vec(), vec![7u8; 6]);
                }
                _ => panic!(),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn fragment_no_space() {
        let mut src = WBuf::new(16, false);
        assert!(src.write_bytes(&[7u8; 20]));
        // Only the frame header fits
        let mut dst = WBuf::new(2, true);
        assert_eq!(serialize_zenoh_fragment(&mut dst, &mut src, Reliability::BestEffort, 1), 0);
        assert!(dst.is_empty());
        assert_eq!(src.len(), 20);
    }

    #[test]
    fn streamed_batch_length() {
        let mut wbuf = WBuf::new(32, true);
        prepare_wbuf(&mut wbuf, true);
        assert!(wbuf.write_bytes(&[1, 2, 3]));
        finalize_wbuf(&mut wbuf, true).unwrap();
        assert_eq!(wbuf.get_first_slice(..), &[3, 0, 1, 2, 3]);
    }
}
