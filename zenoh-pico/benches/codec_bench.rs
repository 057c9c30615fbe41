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
#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};

use zenoh_pico::core::{CongestionControl, Reliability, ResKey, ZInt};
use zenoh_pico::io::{RBuf, WBuf};
use zenoh_pico::proto::{Frame, FramePayload, TransportMessage, ZenohMessage};
use zenoh_pico::session::{serialize_zenoh_fragment, DefragBuffer};
use zenoh_util::core::ZResult;

fn bench_one_zint_codec((v, buf): (ZInt, &mut WBuf)) -> ZResult<()> {
    buf.write_zint(v);
    RBuf::from(&*buf).read_zint().map(|_| ())
}

fn bench_three_zint_codec((v, buf): (&[ZInt; 3], &mut WBuf)) -> ZResult<()> {
    buf.write_zint(v[0]);
    buf.write_zint(v[1]);
    buf.write_zint(v[2]);
    let mut rbuf = RBuf::from(&*buf);
    let _ = rbuf.read_zint()?;
    let _ = rbuf.read_zint()?;
    rbuf.read_zint().map(|_| ())
}

fn bench_write_data(buf: &mut WBuf, data: &ZenohMessage) {
    buf.write_zenoh_message(data);
}

fn bench_write_frame_header(buf: &mut WBuf, reliability: Reliability, sn: ZInt, is_fragment: Option<bool>) {
    buf.write_frame_header(reliability, sn, is_fragment, None);
}

fn bench_write_frame_data(buf: &mut WBuf, frame: &TransportMessage) {
    buf.write_transport_message(frame);
}

fn bench_read_frame_data(bytes: &[u8]) -> ZResult<()> {
    RBuf::from(bytes).read_transport_messages().map(|_| ())
}

// Fragments a serialized message in batches of 64 bytes and reassembles it
fn bench_fragment_defragment(msg: &ZenohMessage, batch: &mut WBuf) -> ZResult<()> {
    let mut fragbuf = WBuf::new(128, false);
    fragbuf.write_zenoh_message(msg);
    let mut defrag = DefragBuffer::new(0, 1 << 28, Reliability::Reliable, 65_535)?;
    let mut sn = 0;
    while !fragbuf.is_empty() {
        batch.clear();
        if serialize_zenoh_fragment(batch, &mut fragbuf, Reliability::Reliable, sn) == 0 {
            break;
        }
        let frame = RBuf::from(&*batch).read_transport_message()?;
        if let zenoh_pico::proto::TransportBody::Frame(Frame {
            sn,
            payload: FramePayload::Fragment { buffer, is_final },
            ..
        }) = frame.body
        {
            defrag.push(sn, buffer)?;
            if is_final {
                defrag.defragment()?;
            }
        }
        sn += 1;
    }
    Ok(())
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut buf = WBuf::new(64, true);
    let rs3: [ZInt; 3] = [
        ZInt::from(rand::random::<u8>()),
        ZInt::from(rand::random::<u16>()),
        ZInt::from(rand::random::<u32>()),
    ];

    c.bench_function("bench_one_zint_codec", |b| {
        b.iter(|| {
            let _ = bench_one_zint_codec(black_box((rs3[0], &mut buf)));
            buf.clear();
        })
    });

    c.bench_function("bench_three_zint_codec", |b| {
        b.iter(|| {
            let _ = bench_three_zint_codec(black_box((&rs3, &mut buf)));
            buf.clear();
        })
    });

    let payload = RBuf::from(vec![0u8; 32]);
    let data = ZenohMessage::make_data(
        ResKey::RId(10),
        payload,
        Reliability::Reliable,
        CongestionControl::Block,
        None,
        None,
        None,
    );

    c.bench_function("bench_write_data", |b| {
        b.iter(|| {
            bench_write_data(&mut buf, &data);
            buf.clear();
        })
    });

    c.bench_function("bench_write_frame_header", |b| {
        b.iter(|| {
            bench_write_frame_header(&mut buf, Reliability::Reliable, 42, Some(true));
            buf.clear();
        })
    });

    let frame = TransportMessage::make_frame(
        Reliability::Reliable,
        42,
        FramePayload::Messages {
            messages: vec![data],
        },
        None,
    );
    c.bench_function("bench_write_frame_data", |b| {
        b.iter(|| {
            bench_write_frame_data(&mut buf, &frame);
            buf.clear();
        })
    });

    buf.write_transport_message(&frame);
    let bytes = buf.to_vec();
    buf.clear();
    c.bench_function("bench_read_frame_data", |b| {
        b.iter(|| {
            let _ = bench_read_frame_data(black_box(&bytes));
        })
    });

    let large = ZenohMessage::make_data(
        ResKey::RName("/bench/fragmentation".to_string()),
        RBuf::from(vec![0u8; 4_096]),
        Reliability::Reliable,
        CongestionControl::Block,
        None,
        None,
        None,
    );
    c.bench_function("bench_fragment_defragment_4k", |b| {
        b.iter(|| {
            let _ = bench_fragment_defragment(&large, &mut buf);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
