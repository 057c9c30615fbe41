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
use rand::*;
use zenoh_pico::core::{CongestionControl, Reliability, ResKey, ZInt};
use zenoh_pico::io::{RBuf, WBuf};
use zenoh_pico::proto::{Frame, FramePayload, TransportBody, ZenohMessage};
use zenoh_pico::session::defaults::ZN_SN_RESOLUTION;
use zenoh_pico::session::{
    finalize_wbuf, prepare_wbuf, serialize_zenoh_fragment, DefragBuffer,
};

const BATCH_SIZE: usize = 64;

fn make_message(payload_size: usize) -> ZenohMessage {
    let mut payload = vec![0u8; payload_size];
    thread_rng().fill(payload.as_mut_slice());
    ZenohMessage::make_data(
        ResKey::RName("/test/fragmentation".to_string()),
        RBuf::from(payload),
        Reliability::Reliable,
        CongestionControl::Block,
        None,
        None,
        None,
    )
}

// Fragments the message in batches and returns the batches ready to be sent
fn fragment(msg: &ZenohMessage, initial_sn: ZInt, is_streamed: bool) -> (Vec<Vec<u8>>, usize) {
    let mut fragbuf = WBuf::new(128, false);
    assert!(fragbuf.write_zenoh_message(msg));
    let serialized = fragbuf.len();

    let mut batches = vec![];
    let mut batch = WBuf::new(BATCH_SIZE, true);
    let mut sn = initial_sn;
    let mut total = 0;
    while !fragbuf.is_empty() {
        prepare_wbuf(&mut batch, is_streamed);
        let written = serialize_zenoh_fragment(&mut batch, &mut fragbuf, msg.reliability, sn);
        assert_ne!(written, 0);
        assert!(batch.len() <= BATCH_SIZE);
        total += written;
        sn = (sn + 1) % *ZN_SN_RESOLUTION;
        finalize_wbuf(&mut batch, is_streamed).unwrap();
        batches.push(batch.to_vec());
    }
    assert_eq!(serialized, total);

    (batches, serialized)
}

fn defragment(batches: Vec<Vec<u8>>, initial_sn: ZInt, is_streamed: bool) -> ZenohMessage {
    let mut defrag =
        DefragBuffer::new(initial_sn, *ZN_SN_RESOLUTION, Reliability::Reliable, 1_024).unwrap();

    let count = batches.len();
    let mut result = None;
    for (i, bytes) in batches.into_iter().enumerate() {
        let mut rbuf = RBuf::from(bytes);
        if is_streamed {
            let mut length = [0u8; 2];
            rbuf.read_bytes(&mut length).unwrap();
            assert_eq!(rbuf.readable(), u16::from_le_bytes(length) as usize);
        }
        let msg = rbuf.read_transport_message().unwrap();
        match msg.body {
            TransportBody::Frame(Frame {
                reliability,
                sn,
                payload: FramePayload::Fragment { buffer, is_final },
            }) => {
                assert_eq!(Reliability::Reliable, reliability);
                // Only the last fragment is final
                assert_eq!(i == count - 1, is_final);
                defrag.push(sn, buffer).unwrap();
                if is_final {
                    result = defrag.defragment().unwrap();
                }
            }
            _ => panic!("Unexpected message: {:?}", msg),
        }
    }

    assert!(defrag.is_empty());
    result.unwrap()
}

fn run(payload_size: usize, initial_sn: ZInt, is_streamed: bool) {
    let msg = make_message(payload_size);
    let (batches, serialized) = fragment(&msg, initial_sn, is_streamed);
    println!(
        "Message of {} bytes sent in {} fragments",
        serialized,
        batches.len()
    );
    assert!(batches.len() > 1);
    let result = defragment(batches, initial_sn, is_streamed);
    assert_eq!(msg, result);
}

#[test]
fn fragmentation_datagram() {
    for size in [100, 500, 900].iter() {
        run(*size, 0, false);
    }
}

#[test]
fn fragmentation_streamed() {
    for size in [100, 500, 900].iter() {
        run(*size, 0, true);
    }
}

#[test]
fn fragmentation_sn_wraparound() {
    // The fragments cross the end of the sequence number space
    run(500, *ZN_SN_RESOLUTION - 2, false);
}

#[test]
fn fragmentation_missing_fragment() {
    let msg = make_message(500);
    let (mut batches, _) = fragment(&msg, 0, false);
    // Lose the second fragment
    batches.remove(1);

    let mut defrag =
        DefragBuffer::new(0, *ZN_SN_RESOLUTION, Reliability::Reliable, 1_024).unwrap();
    let mut errors = 0;
    for bytes in batches.into_iter() {
        let msg = RBuf::from(bytes).read_transport_message().unwrap();
        if let TransportBody::Frame(Frame {
            sn,
            payload: FramePayload::Fragment { buffer, is_final },
            ..
        }) = msg.body
        {
            if defrag.push(sn, buffer).is_err() {
                errors += 1;
                continue;
            }
            if is_final {
                assert!(defrag.defragment().unwrap().is_none());
            }
        }
    }
    assert!(errors > 0);
    assert!(defrag.is_empty());
}
