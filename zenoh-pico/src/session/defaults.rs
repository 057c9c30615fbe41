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
use crate::core::ZInt;

zconfigurable! {
    // The default sequence number resolution takes 4 bytes on the wire.
    // Given the VLE encoding of ZInt, 4 bytes result in 28 useful bits.
    // 2^28 = 268_435_456 => Max Seq Num = 268_435_455
    pub static ref ZN_SN_RESOLUTION: ZInt = 268_435_456;

    // The default batch size in bytes for the transport.
    // The length of a batch on a streamed link is encoded on 16 bits.
    pub static ref ZN_BATCH_SIZE: usize = 65_535;

    // Maximum size of a reassembled message
    pub static ref ZN_FRAG_MAX_SIZE: usize = 300_000;

    // Segment size of the buffer used to serialize a message before fragmenting it
    pub static ref ZN_FRAG_BUF_TX_CHUNK: usize = 128;

    pub static ref ZN_PROTO_VERSION: u8 = 0x05;
}
