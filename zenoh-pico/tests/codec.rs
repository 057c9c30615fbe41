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
use zenoh_pico::core::*;
use zenoh_pico::io::{zint_len, RBuf, WBuf};
use zenoh_pico::proto::*;
use zenoh_pico::session::defaults::ZN_PROTO_VERSION;
use zenoh_util::core::{ZErrorKind, ZResult};

const NUM_ITER: usize = 100;
const MAX_PAYLOAD_SIZE: usize = 256;

macro_rules! gen {
    ($name:ty) => {
        thread_rng().gen::<$name>()
    };
}

macro_rules! gen_bool {
    () => {
        thread_rng().gen_bool(0.5)
    };
}

macro_rules! option_gen {
    ($e:expr) => {
        if gen_bool!() {
            Some($e)
        } else {
            None
        }
    };
}

fn gen_buffer(max_size: usize) -> Vec<u8> {
    let len: usize = thread_rng().gen_range(1..max_size + 1);
    let mut buf: Vec<u8> = vec![0; len];
    thread_rng().fill(buf.as_mut_slice());
    buf
}

fn gen_pid() -> PeerId {
    PeerId::new(gen_buffer(16))
}

fn gen_rid() -> ResourceId {
    thread_rng().gen_range(1..ZInt::MAX)
}

fn gen_key() -> ResKey {
    let key = [
        ResKey::RId(gen_rid()),
        ResKey::RName("my_resource".to_string()),
        ResKey::RIdWithSuffix(gen_rid(), "/my/resource".to_string()),
    ];
    key[thread_rng().gen_range(0..key.len())].clone()
}

fn gen_attachment() -> Attachment {
    Attachment::make(0, RBuf::from(gen_buffer(MAX_PAYLOAD_SIZE)))
}

fn gen_reply_context(is_final: bool) -> ReplyContext {
    let qid = gen!(ZInt);
    let replier = if is_final {
        None
    } else {
        Some(ReplierInfo {
            kind: queryable::STORAGE,
            id: gen_pid(),
        })
    };
    ReplyContext::make(qid, replier)
}

fn gen_timestamp() -> Timestamp {
    Timestamp::new(gen!(ZInt), gen_pid())
}

fn gen_data_info() -> DataInfo {
    DataInfo {
        kind: option_gen!(gen!(ZInt)),
        encoding: option_gen!(Encoding::new(gen!(ZInt), "text/plain")),
        timestamp: option_gen!(gen_timestamp()),
        source_id: option_gen!(gen_pid()),
        source_sn: option_gen!(gen!(ZInt)),
        first_router_id: option_gen!(gen_pid()),
        first_router_sn: option_gen!(gen!(ZInt)),
    }
}

fn gen_consolidation_mode() -> ConsolidationMode {
    let cm = [
        ConsolidationMode::None,
        ConsolidationMode::Lazy,
        ConsolidationMode::Full,
    ];
    cm[thread_rng().gen_range(0..cm.len())]
}

fn gen_consolidation() -> QueryConsolidation {
    QueryConsolidation {
        first_routers: gen_consolidation_mode(),
        last_router: gen_consolidation_mode(),
        reception: gen_consolidation_mode(),
    }
}

fn gen_query_target() -> QueryTarget {
    let tgt = [
        Target::BestMatching,
        Target::Complete { n: 3 },
        Target::All,
        Target::None,
    ];
    QueryTarget {
        kind: queryable::ALL_KINDS,
        target: tgt[thread_rng().gen_range(0..tgt.len())].clone(),
    }
}

fn gen_declarations() -> Vec<Declaration> {
    vec![
        Declaration::Resource {
            rid: gen!(ZInt),
            key: gen_key(),
        },
        Declaration::ForgetResource { rid: gen!(ZInt) },
        Declaration::Publisher { key: gen_key() },
        Declaration::ForgetPublisher { key: gen_key() },
        Declaration::Subscriber {
            key: gen_key(),
            info: SubInfo {
                reliability: Reliability::Reliable,
                mode: SubMode::Push,
                period: None,
            },
        },
        Declaration::Subscriber {
            key: gen_key(),
            info: SubInfo {
                reliability: Reliability::BestEffort,
                mode: SubMode::Pull,
                period: None,
            },
        },
        Declaration::Subscriber {
            key: gen_key(),
            info: SubInfo {
                reliability: Reliability::Reliable,
                mode: SubMode::Pull,
                period: Some(Period {
                    origin: gen!(ZInt),
                    period: gen!(ZInt),
                    duration: gen!(ZInt),
                }),
            },
        },
        Declaration::ForgetSubscriber { key: gen_key() },
        Declaration::Queryable {
            key: gen_key(),
            kind: queryable::EVAL,
            info: None,
        },
        Declaration::Queryable {
            key: gen_key(),
            kind: queryable::STORAGE,
            info: Some(QueryableInfo {
                complete: 1,
                distance: 10,
            }),
        },
        Declaration::ForgetQueryable { key: gen_key() },
    ]
}

fn gen_zenoh_messages() -> Vec<ZenohMessage> {
    let reliability = if gen_bool!() {
        Reliability::Reliable
    } else {
        Reliability::BestEffort
    };
    let congestion_control = if gen_bool!() {
        CongestionControl::Block
    } else {
        CongestionControl::Drop
    };

    vec![
        ZenohMessage::make_declare(gen_declarations(), option_gen!(gen_attachment())),
        ZenohMessage::make_data(
            gen_key(),
            RBuf::from(gen_buffer(MAX_PAYLOAD_SIZE)),
            reliability,
            congestion_control,
            option_gen!(gen_data_info()),
            option_gen!(gen_reply_context(false)),
            option_gen!(gen_attachment()),
        ),
        ZenohMessage::make_unit(
            reliability,
            congestion_control,
            option_gen!(gen_reply_context(true)),
            option_gen!(gen_attachment()),
        ),
        ZenohMessage::make_pull(
            gen_bool!(),
            gen_key(),
            gen!(ZInt),
            option_gen!(gen!(ZInt)),
            option_gen!(gen_attachment()),
        ),
        ZenohMessage::make_query(
            gen_key(),
            "my_predicate".to_string(),
            gen!(ZInt),
            option_gen!(gen_query_target()),
            gen_consolidation(),
            option_gen!(gen_attachment()),
        ),
    ]
}

fn gen_transport_messages() -> Vec<TransportMessage> {
    let lease = thread_rng().gen_range(1..100_000);
    let next_sns = if gen_bool!() {
        ConduitSnList::Plain(ConduitSn {
            reliable: gen!(u32) as ZInt,
            best_effort: gen!(u32) as ZInt,
        })
    } else {
        let mut sns = Box::new([ConduitSn::default(); tmsg::conduit::PRIORITIES]);
        for sn in sns.iter_mut() {
            sn.reliable = gen!(u32) as ZInt;
            sn.best_effort = gen!(u32) as ZInt;
        }
        ConduitSnList::QoS(sns)
    };

    vec![
        TransportMessage::make_scout(
            option_gen!(whatami::ROUTER),
            gen_bool!(),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_hello(
            option_gen!(gen_pid()),
            option_gen!(whatami::PEER),
            option_gen!(vec![
                "tcp/127.0.0.1:7447".to_string(),
                "udp/127.0.0.1:7447".to_string()
            ]),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_join(
            *ZN_PROTO_VERSION,
            whatami::PEER,
            gen_pid(),
            lease,
            option_gen!(gen!(u32) as ZInt),
            next_sns,
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_init_syn(
            *ZN_PROTO_VERSION,
            whatami::CLIENT,
            gen_pid(),
            option_gen!(gen!(u32) as ZInt),
            gen_bool!(),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_init_ack(
            whatami::ROUTER,
            gen_pid(),
            option_gen!(gen!(u32) as ZInt),
            gen_bool!(),
            RBuf::from(gen_buffer(64)),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_open_syn(
            lease,
            gen!(u32) as ZInt,
            RBuf::from(gen_buffer(64)),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_open_ack(lease, gen!(u32) as ZInt, option_gen!(gen_attachment())),
        TransportMessage::make_close(
            option_gen!(gen_pid()),
            tmsg::close_reason::GENERIC,
            gen_bool!(),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_sync(
            Reliability::Reliable,
            gen!(u32) as ZInt,
            option_gen!(gen!(u32) as ZInt),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_sync(
            Reliability::BestEffort,
            gen!(u32) as ZInt,
            None,
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_ack_nack(
            gen!(u32) as ZInt,
            option_gen!(gen!(ZInt)),
            option_gen!(gen_attachment()),
        ),
        TransportMessage::make_keep_alive(option_gen!(gen_pid()), option_gen!(gen_attachment())),
        TransportMessage::make_ping(gen!(ZInt), option_gen!(gen_attachment())),
        TransportMessage::make_pong(gen!(ZInt), option_gen!(gen_attachment())),
    ]
}

fn test_write_read_zenoh_message(msg: ZenohMessage) {
    let mut buf = WBuf::new(164, false);
    println!("\nWrite message: {:?}", msg);
    assert!(buf.write_zenoh_message(&msg));
    println!("Read message from: {:?}", buf);
    let result = RBuf::from(&buf).read_zenoh_message(msg.reliability).unwrap();
    println!("Message read: {:?}", result);
    assert_eq!(msg, result);
}

fn test_write_read_transport_message(msg: TransportMessage) {
    let mut buf = WBuf::new(164, false);
    println!("\nWrite message: {:?}", msg);
    assert!(buf.write_transport_message(&msg));
    println!("Read message from: {:?}", buf);
    let result = RBuf::from(&buf).read_transport_message().unwrap();
    println!("Message read: {:?}", result);
    assert_eq!(msg, result);
}

fn test_zint(v: ZInt) -> ZResult<()> {
    let mut buf = WBuf::new(32, true);
    assert!(buf.write_zint(v));
    assert_eq!(zint_len(v), buf.len());
    assert_eq!(v, RBuf::from(&buf).read_zint()?);
    Ok(())
}

#[test]
fn codec_zint_limits() -> ZResult<()> {
    test_zint(0)?;
    test_zint(127)?;
    test_zint(128)?;
    for i in 1..10 {
        let v: ZInt = 1 << (7 * i);
        test_zint(v - 1)?;
        test_zint(v)?;
    }
    test_zint(ZInt::MAX)?;
    Ok(())
}

#[test]
fn codec_zint_wire_format() {
    let mut buf = WBuf::new(16, true);
    assert!(buf.write_zint(0));
    assert!(buf.write_zint(127));
    assert!(buf.write_zint(128));
    assert!(buf.write_zint(300));
    assert_eq!(vec![0x00, 0x7f, 0x80, 0x01, 0xac, 0x02], buf.to_vec());

    let mut buf = WBuf::new(16, true);
    assert!(buf.write_zint(ZInt::MAX));
    let bytes = buf.to_vec();
    assert_eq!(10, bytes.len());
    assert_eq!(0x01, bytes[9]);
}

#[test]
fn codec_zint_random() -> ZResult<()> {
    for _ in 0..NUM_ITER {
        test_zint(gen!(ZInt))?;
    }
    Ok(())
}

#[test]
fn codec_zint_truncated() {
    // The continuation bit is set but the buffer ends
    let mut rbuf = RBuf::from(vec![0x80u8, 0x80]);
    match rbuf.read_zint() {
        Err(e) => assert_eq!(e.get_kind(), &ZErrorKind::BufferUnderflow { missing: 1 }),
        Ok(v) => panic!("Truncated ZInt decoded as {}", v),
    }
}

#[test]
fn codec_zint_overflow() {
    // Eleven bytes with the continuation bit set
    let mut rbuf = RBuf::from(vec![0xffu8; 11]);
    match rbuf.read_zint() {
        Err(e) => assert_eq!(e.get_kind(), &ZErrorKind::ZIntOverflow),
        Ok(v) => panic!("Overflowing ZInt decoded as {}", v),
    }

    // The 10th byte carries more than the most significant bit
    let mut bytes = vec![0xffu8; 9];
    bytes.push(0x02);
    let mut rbuf = RBuf::from(bytes);
    assert!(rbuf.read_zint().is_err());
}

#[test]
fn codec_zint_no_space() {
    let mut buf = WBuf::new(2, true);
    assert!(!buf.write_zint(1 << 14));
    // Nothing has been written
    assert!(buf.is_empty());
    assert!(buf.write_zint(1 << 13));
    assert_eq!(2, buf.len());
}

#[test]
fn codec_fields() -> ZResult<()> {
    let mut buf = WBuf::new(64, false);
    let bytes = gen_buffer(MAX_PAYLOAD_SIZE);
    let strings = vec!["zenoh".to_string(), String::new(), "/demo/**".to_string()];
    assert!(buf.write_bytes_array(&bytes));
    assert!(buf.write_string("my_resource"));
    assert!(buf.write_string_array(&strings));
    let pid = gen_pid();
    assert!(buf.write_peerid(&pid));
    let ts = gen_timestamp();
    assert!(buf.write_timestamp(&ts));

    let mut rbuf = RBuf::from(&buf);
    assert_eq!(bytes, rbuf.read_bytes_array()?);
    assert_eq!("my_resource", rbuf.read_string()?);
    assert_eq!(strings, rbuf.read_string_array()?);
    assert_eq!(pid, rbuf.read_peerid()?);
    assert_eq!(ts, rbuf.read_timestamp()?);
    assert!(!rbuf.can_read());
    Ok(())
}

#[test]
fn codec_bytes_array_underflow() {
    // A declared length larger than the available bytes
    let mut rbuf = RBuf::from(vec![0x05u8, 0x01, 0x02]);
    match rbuf.read_bytes_array() {
        Err(e) => assert_eq!(e.get_kind(), &ZErrorKind::BufferUnderflow { missing: 3 }),
        Ok(b) => panic!("Truncated bytes array decoded as {:?}", b),
    }
}

#[test]
fn codec_invalid_string() {
    let mut rbuf = RBuf::from(vec![0x02u8, 0xc3, 0x28]);
    assert!(rbuf.read_string().is_err());
}

#[test]
fn codec_reskey() -> ZResult<()> {
    for key in [
        ResKey::RId(42),
        ResKey::RName("/demo/example".to_string()),
        ResKey::RIdWithSuffix(7, "/suffix".to_string()),
    ]
    .iter()
    {
        let mut buf = WBuf::new(32, true);
        assert!(buf.write_reskey(key));
        let result = RBuf::from(&buf).read_reskey(key.has_name())?;
        assert_eq!(key, &result);
    }
    Ok(())
}

#[test]
fn codec_declarations() -> ZResult<()> {
    for _ in 0..NUM_ITER {
        let decls = gen_declarations();
        let mut buf = WBuf::new(64, false);
        assert!(buf.write_declarations(&decls));
        assert_eq!(decls, RBuf::from(&buf).read_declarations()?);
    }
    Ok(())
}

#[test]
fn codec_declaration_unknown_id() {
    let mut rbuf = RBuf::from(vec![0x1au8, 0x00]);
    match rbuf.read_declaration() {
        Err(e) => match e.get_kind() {
            ZErrorKind::InvalidMessage { .. } => {}
            k => panic!("Unexpected error kind: {:?}", k),
        },
        Ok(d) => panic!("Unknown declaration decoded as {:?}", d),
    }
}

#[test]
fn codec_data_info() -> ZResult<()> {
    for _ in 0..NUM_ITER {
        let info = gen_data_info();
        let mut buf = WBuf::new(64, false);
        assert!(buf.write_data_info(&info));
        assert_eq!(info, RBuf::from(&buf).read_data_info()?);
    }

    // Empty DataInfo only takes the options
    let mut buf = WBuf::new(8, true);
    assert!(buf.write_data_info(&DataInfo::new()));
    assert_eq!(vec![0x00], buf.to_vec());
    Ok(())
}

#[test]
fn codec_zenoh_messages() {
    for _ in 0..NUM_ITER {
        for msg in gen_zenoh_messages() {
            test_write_read_zenoh_message(msg);
        }
    }
}

#[test]
fn codec_transport_messages() {
    for _ in 0..NUM_ITER {
        for msg in gen_transport_messages() {
            test_write_read_transport_message(msg);
        }
    }
}

#[test]
fn codec_frame() {
    for _ in 0..NUM_ITER {
        let reliability = if gen_bool!() {
            Reliability::Reliable
        } else {
            Reliability::BestEffort
        };
        let sn = gen!(u32) as ZInt;

        // A frame carrying multiple messages
        let messages: Vec<ZenohMessage> = gen_zenoh_messages()
            .into_iter()
            .map(|mut m| {
                m.reliability = reliability;
                m
            })
            .collect();
        let payload = FramePayload::Messages { messages };
        let msg = TransportMessage::make_frame(reliability, sn, payload, None);
        test_write_read_transport_message(msg);

        // A fragment
        let payload = FramePayload::Fragment {
            buffer: RBuf::from(gen_buffer(MAX_PAYLOAD_SIZE)),
            is_final: gen_bool!(),
        };
        let msg =
            TransportMessage::make_frame(reliability, sn, payload, option_gen!(gen_attachment()));
        test_write_read_transport_message(msg);
    }
}

#[test]
fn codec_batch() -> ZResult<()> {
    let mut buf = WBuf::new(64, false);
    let mut sent = vec![];

    let msg = TransportMessage::make_keep_alive(Some(gen_pid()), None);
    assert!(buf.write_transport_message(&msg));
    sent.push(msg);

    let data = ZenohMessage::make_data(
        ResKey::RName("/demo/batch".to_string()),
        RBuf::from(gen_buffer(MAX_PAYLOAD_SIZE)),
        Reliability::Reliable,
        CongestionControl::Block,
        None,
        None,
        None,
    );
    let msg = TransportMessage::make_frame(
        Reliability::Reliable,
        1,
        FramePayload::Messages {
            messages: vec![data.clone(), data],
        },
        None,
    );
    assert!(buf.write_transport_message(&msg));
    sent.push(msg);

    let msg = TransportMessage::make_close(None, tmsg::close_reason::EXPIRED, false, None);
    assert!(buf.write_transport_message(&msg));
    sent.push(msg);

    let received = RBuf::from(&buf).read_transport_messages()?;
    assert_eq!(sent, received);
    Ok(())
}

#[test]
fn codec_sync_best_effort_count() -> ZResult<()> {
    // The count is not carried on the best-effort channel, even when set
    let sync = TransportMessage {
        body: TransportBody::Sync(zenoh_pico::proto::Sync {
            reliability: Reliability::BestEffort,
            sn: 7,
            count: Some(3),
        }),
        attachment: None,
    };
    let ping = TransportMessage::make_ping(gen!(ZInt), None);

    let mut buf = WBuf::new(64, false);
    assert!(buf.write_transport_message(&sync));
    assert!(buf.write_transport_message(&ping));

    let received = RBuf::from(&buf).read_transport_messages()?;
    assert_eq!(
        vec![
            TransportMessage::make_sync(Reliability::BestEffort, 7, None, None),
            ping
        ],
        received
    );
    Ok(())
}

#[test]
fn codec_frame_header() {
    let mut buf = WBuf::new(16, true);
    assert!(buf.write_frame_header(Reliability::Reliable, 3, Some(true), None));
    let msg = RBuf::from(&buf).read_transport_message().unwrap();
    match msg.body {
        TransportBody::Frame(Frame {
            reliability,
            sn,
            payload: FramePayload::Fragment { buffer, is_final },
        }) => {
            assert_eq!(Reliability::Reliable, reliability);
            assert_eq!(3, sn);
            assert!(is_final);
            assert!(buffer.is_empty());
        }
        _ => panic!("Unexpected message: {:?}", msg),
    }
}

#[test]
fn codec_unknown_messages() {
    // 0x10 is neither a transport nor a zenoh message id
    let mut rbuf = RBuf::from(vec![0x10u8, 0x00]);
    assert!(rbuf.read_transport_message().is_err());
    let mut rbuf = RBuf::from(vec![0x10u8, 0x00]);
    assert!(rbuf.read_zenoh_message(Reliability::Reliable).is_err());
}

#[test]
fn codec_write_no_space() {
    let msg = ZenohMessage::make_data(
        ResKey::RName("/demo/too/long".to_string()),
        RBuf::from(gen_buffer(MAX_PAYLOAD_SIZE)),
        Reliability::Reliable,
        CongestionControl::Block,
        None,
        None,
        None,
    );
    let mut buf = WBuf::new(8, true);
    assert!(!buf.write_zenoh_message(&msg));
}
