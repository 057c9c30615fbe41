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
use super::{RBuf, WBuf};
use crate::core::{ZInt, ZINT_MAX_BYTES};

use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::{zcheck, zerror};

pub const fn zint_len(v: ZInt) -> usize {
    const MASK_1: ZInt = ZInt::MAX << 7;
    const MASK_2: ZInt = ZInt::MAX << (7 * 2);
    const MASK_3: ZInt = ZInt::MAX << (7 * 3);
    const MASK_4: ZInt = ZInt::MAX << (7 * 4);
    const MASK_5: ZInt = ZInt::MAX << (7 * 5);
    const MASK_6: ZInt = ZInt::MAX << (7 * 6);
    const MASK_7: ZInt = ZInt::MAX << (7 * 7);
    const MASK_8: ZInt = ZInt::MAX << (7 * 8);
    const MASK_9: ZInt = ZInt::MAX << (7 * 9);

    if (v & MASK_1) == 0 {
        1
    } else if (v & MASK_2) == 0 {
        2
    } else if (v & MASK_3) == 0 {
        3
    } else if (v & MASK_4) == 0 {
        4
    } else if (v & MASK_5) == 0 {
        5
    } else if (v & MASK_6) == 0 {
        6
    } else if (v & MASK_7) == 0 {
        7
    } else if (v & MASK_8) == 0 {
        8
    } else if (v & MASK_9) == 0 {
        9
    } else {
        10
    }
}

impl RBuf {
    pub fn read_zint(&mut self) -> ZResult<ZInt> {
        let mut v: ZInt = 0;
        let mut i = 0;
        for _ in 0..ZINT_MAX_BYTES {
            let b = self.read()?;
            let bits = (b & 0x7f) as ZInt;
            // The 10th byte can only carry the most significant bit
            if i == 63 && bits > 1 {
                break;
            }
            v |= bits << i;
            if b <= 0x7f {
                return Ok(v);
            }
            i += 7;
        }
        zerror!(ZErrorKind::ZIntOverflow)
    }

    pub fn read_zint_as_usize(&mut self) -> ZResult<usize> {
        let v = self.read_zint()?;
        if v > usize::MAX as ZInt {
            return zerror!(ZErrorKind::InvalidMessage {
                descr: format!("ZInt {} does not fit in usize", v)
            });
        }
        Ok(v as usize)
    }

    // Same as read_bytes but with array length before the bytes.
    // The declared length is checked against what is actually readable
    // before allocating anything.
    pub fn read_bytes_array(&mut self) -> ZResult<Vec<u8>> {
        let len = self.read_zint_as_usize()?;
        if len > self.readable() {
            return zerror!(ZErrorKind::BufferUnderflow {
                missing: len - self.readable()
            });
        }
        let mut buf = vec![0; len];
        self.read_bytes(buf.as_mut_slice())?;
        Ok(buf)
    }

    pub fn read_string(&mut self) -> ZResult<String> {
        let bytes = self.read_bytes_array()?;
        match String::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(e) => zerror!(
                ZErrorKind::InvalidMessage {
                    descr: "Invalid UTF-8 string".to_string()
                },
                e
            ),
        }
    }

    pub fn read_string_array(&mut self) -> ZResult<Vec<String>> {
        let len = self.read_zint_as_usize()?;
        // Each string takes at least one byte on the wire
        if len > self.readable() {
            return zerror!(ZErrorKind::BufferUnderflow {
                missing: len - self.readable()
            });
        }
        let mut vec: Vec<String> = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(self.read_string()?);
        }
        Ok(vec)
    }

    // Same as read_bytes_array but returning an RBuf
    pub fn read_rbuf(&mut self) -> ZResult<RBuf> {
        Ok(RBuf::from(self.read_bytes_array()?))
    }
}

impl WBuf {
    /// This the traditional VByte encoding, in which an arbirary integer
    /// is encoded as a sequence of 7 bits integers.
    /// Either the whole integer is written or nothing is.
    pub fn write_zint(&mut self, v: ZInt) -> bool {
        let mut bs = [0u8; ZINT_MAX_BYTES];
        let mut c = v;
        let mut n = 0;
        while c > 0x7f {
            bs[n] = (c as u8 & 0x7f) | 0x80;
            c >>= 7;
            n += 1;
        }
        bs[n] = c as u8;
        self.write_bytes(&bs[..=n])
    }

    pub fn write_usize_as_zint(&mut self, v: usize) -> bool {
        self.write_zint(v as ZInt)
    }

    // Same as write_bytes but with array length before the bytes.
    pub fn write_bytes_array(&mut self, s: &[u8]) -> bool {
        if self.is_contiguous() && zint_len(s.len() as ZInt) + s.len() > self.space_left() {
            return false;
        }
        self.write_usize_as_zint(s.len()) && self.write_bytes(s)
    }

    pub fn write_string(&mut self, s: &str) -> bool {
        self.write_bytes_array(s.as_bytes())
    }

    pub fn write_string_array(&mut self, s: &[String]) -> bool {
        zcheck!(self.write_usize_as_zint(s.len()));
        for x in s {
            zcheck!(self.write_string(x));
        }
        true
    }

    // Writes the unread content of the RBuf as a bytes array
    pub fn write_rbuf(&mut self, rbuf: &RBuf) -> bool {
        self.write_bytes_array(rbuf.as_slice())
    }
}
