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
use super::WBuf;
use std::fmt;

use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::zerror;

// A contiguous read buffer with a read position.
// It is filled either straight from a link read or by flattening the unread
// content of a WBuf (e.g. a defragmentation buffer).
#[derive(Clone, Default)]
pub struct RBuf {
    buf: Vec<u8>,
    pos: usize,
}

impl RBuf {
    pub fn new() -> RBuf {
        RBuf {
            buf: Vec::new(),
            pos: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> RBuf {
        RBuf {
            buf: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    pub fn empty() -> RBuf {
        RBuf::new()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn get_pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) -> ZResult<()> {
        if pos <= self.buf.len() {
            self.pos = pos;
            Ok(())
        } else {
            zerror!(ZErrorKind::BufferUnderflow {
                missing: pos - self.buf.len()
            })
        }
    }

    #[inline]
    pub fn reset_pos(&mut self) {
        self.pos = 0;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }

    #[inline]
    pub fn can_read(&self) -> bool {
        self.pos < self.buf.len()
    }

    #[inline]
    pub fn readable(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn skip_bytes(&mut self, n: usize) -> ZResult<()> {
        if n <= self.readable() {
            self.pos += n;
            Ok(())
        } else {
            zerror!(ZErrorKind::BufferUnderflow {
                missing: n - self.readable()
            })
        }
    }

    pub fn read(&mut self) -> ZResult<u8> {
        if self.can_read() {
            let b = self.buf[self.pos];
            self.pos += 1;
            Ok(b)
        } else {
            zerror!(ZErrorKind::BufferUnderflow { missing: 1 })
        }
    }

    // same than read() but not moving read position (allow not mutable self)
    pub fn get(&self) -> ZResult<u8> {
        if self.can_read() {
            Ok(self.buf[self.pos])
        } else {
            zerror!(ZErrorKind::BufferUnderflow { missing: 1 })
        }
    }

    pub fn read_bytes(&mut self, bs: &mut [u8]) -> ZResult<()> {
        let len = bs.len();
        if len > self.readable() {
            return zerror!(ZErrorKind::BufferUnderflow {
                missing: len - self.readable()
            });
        }
        bs.copy_from_slice(&self.buf[self.pos..self.pos + len]);
        self.pos += len;
        Ok(())
    }

    // Reads all the remaining bytes
    pub fn read_vec(&mut self) -> Vec<u8> {
        let vec = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        vec
    }

    // Moves all the remaining bytes in a new RBuf
    pub fn drain_into_rbuf(&mut self) -> RBuf {
        RBuf::from(self.read_vec())
    }

    // The unread bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    // returns a Vec<u8> containing a copy of RBuf content (not considering read position)
    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.clone()
    }

    // Gives access to the spare capacity, so that a link can read directly
    // into the buffer. The buffer is resized to 'len' and the read position reset.
    pub fn prepare_fill(&mut self, len: usize) -> &mut [u8] {
        self.pos = 0;
        self.buf.clear();
        self.buf.resize(len, 0);
        &mut self.buf[..]
    }

    // Shrinks the content to the 'len' bytes actually filled
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
        if self.pos > self.buf.len() {
            self.pos = self.buf.len();
        }
    }
}

impl fmt::Display for RBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RBuf{{ pos: {}, content: {} }}",
            self.pos,
            hex::encode_upper(&self.buf)
        )
    }
}

impl fmt::Debug for RBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<Vec<u8>> for RBuf {
    fn from(buf: Vec<u8>) -> RBuf {
        RBuf { buf, pos: 0 }
    }
}

impl From<&[u8]> for RBuf {
    fn from(slice: &[u8]) -> RBuf {
        RBuf::from(slice.to_vec())
    }
}

impl From<&WBuf> for RBuf {
    fn from(wbuf: &WBuf) -> RBuf {
        RBuf::from(wbuf.to_vec())
    }
}

impl From<WBuf> for RBuf {
    fn from(wbuf: WBuf) -> RBuf {
        Self::from(&wbuf)
    }
}

impl PartialEq for RBuf {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl Eq for RBuf {}
