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
use std::fmt;
use std::io;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::ops::RangeBounds;

// Notes:
//  - WBuf has 2 flavors:
//    - contiguous:
//      - it is made of a single segment which is contiguous in memory
//      - it is initialized with a fixed capacity and won't be extended
//      - if a write exceeds capacity, 'false' is returned and nothing is written
//    - non-contiguous (expandable):
//      - it manages a chain of fixed-capacity segments
//      - a write that does not fit in the last segment allocates a new segment
//        sized max(remaining bytes, segment capacity)
//      - segments are never reordered nor reallocated, hence the content
//        already written is never moved
//  - WBuf keeps a read position so that its content can be consumed in
//    chunks with siphon(), as done when fragmenting a serialized message.

#[derive(Clone)]
struct Segment {
    buf: Vec<u8>,
    capacity: usize,
}

impl Segment {
    fn new(capacity: usize) -> Segment {
        Segment {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    fn writable(&self) -> usize {
        self.capacity - self.buf.len()
    }
}

#[derive(Clone)]
pub struct WBuf {
    segments: Vec<Segment>,
    contiguous: bool,
    capacity: usize,
    r_pos: (usize, usize), // (index in segments, index in the segment)
    mark: (usize, usize),  // (number of segments, len of last segment)
}

impl WBuf {
    pub fn new(capacity: usize, contiguous: bool) -> WBuf {
        WBuf {
            segments: vec![Segment::new(capacity)],
            contiguous,
            capacity,
            r_pos: (0, 0),
            mark: (1, 0),
        }
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    // Total capacity of the allocated segments
    pub fn capacity(&self) -> usize {
        self.segments.iter().fold(0, |acc, s| acc + s.capacity)
    }

    // Number of bytes written and not yet read
    pub fn len(&self) -> usize {
        let written = self.segments.iter().fold(0, |acc, s| acc + s.buf.len());
        written - self.read_offset()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Bytes that can still be written in the current segment without
    // allocating: for a contiguous WBuf this is the remaining capacity.
    #[inline]
    pub fn space_left(&self) -> usize {
        match self.segments.last() {
            Some(s) => s.writable(),
            None => 0,
        }
    }

    #[inline]
    pub fn segments_count(&self) -> usize {
        self.segments.len()
    }

    fn read_offset(&self) -> usize {
        let mut offset = self.r_pos.1;
        for s in &self.segments[..self.r_pos.0] {
            offset += s.buf.len();
        }
        offset
    }

    pub fn clear(&mut self) {
        self.segments.truncate(1);
        if let Some(s) = self.segments.first_mut() {
            s.buf.clear();
        }
        self.r_pos = (0, 0);
        self.mark = (1, 0);
    }

    #[inline]
    pub fn mark(&mut self) {
        let last = self.segments.last().map_or(0, |s| s.buf.len());
        self.mark = (self.segments.len(), last);
    }

    pub fn revert(&mut self) -> bool {
        let (count, len) = self.mark;
        if count == 0 || count > self.segments.len() {
            return false;
        }
        self.segments.truncate(count);
        if let Some(s) = self.segments.last_mut() {
            s.buf.truncate(len);
        }
        // The read position can not go beyond the write position
        if self.r_pos.0 >= count {
            self.r_pos = (count - 1, len);
        } else if self.r_pos.0 == count - 1 && self.r_pos.1 > len {
            self.r_pos.1 = len;
        }
        true
    }

    fn add_segment(&mut self, min: usize) {
        let capacity = std::cmp::max(min, self.capacity);
        self.segments.push(Segment::new(capacity));
    }

    pub fn write(&mut self, b: u8) -> bool {
        if self.space_left() == 0 {
            if self.contiguous {
                return false;
            }
            self.add_segment(1);
        }
        match self.segments.last_mut() {
            Some(s) => {
                s.buf.push(b);
                true
            }
            None => false,
        }
    }

    pub fn write_bytes(&mut self, bs: &[u8]) -> bool {
        let left = self.space_left();
        if bs.len() <= left {
            match self.segments.last_mut() {
                Some(s) => s.buf.extend_from_slice(bs),
                None => return false,
            }
            return true;
        }
        if self.contiguous {
            return false;
        }
        let (head, tail) = bs.split_at(left);
        if let Some(s) = self.segments.last_mut() {
            s.buf.extend_from_slice(head);
        }
        self.add_segment(tail.len());
        match self.segments.last_mut() {
            Some(s) => {
                s.buf.extend_from_slice(tail);
                true
            }
            None => false,
        }
    }

    // Moves n bytes from the read position of src into self.
    // The bytes are copied segment by segment, straight from src storage.
    // Either all the n bytes are moved or nothing is.
    pub fn siphon(&mut self, src: &mut WBuf, n: usize) -> bool {
        if n > src.len() || (self.contiguous && n > self.space_left()) {
            return false;
        }
        let mut left = n;
        while left > 0 {
            let (idx, off) = src.r_pos;
            let seg = &src.segments[idx].buf;
            let to_copy = std::cmp::min(seg.len() - off, left);
            if to_copy > 0 {
                zcheck!(self.write_bytes(&seg[off..off + to_copy]));
            }
            left -= to_copy;
            if off + to_copy == seg.len() && idx + 1 < src.segments.len() {
                src.r_pos = (idx + 1, 0);
            } else {
                src.r_pos = (idx, off + to_copy);
            }
        }
        true
    }

    // The unread content, one slice per segment
    pub fn as_slices(&self) -> Vec<&[u8]> {
        let (idx, off) = self.r_pos;
        let mut result = Vec::with_capacity(self.segments.len() - idx);
        for (i, s) in self.segments[idx..].iter().enumerate() {
            let start = if i == 0 { off } else { 0 };
            if start < s.buf.len() {
                result.push(&s.buf[start..]);
            }
        }
        result
    }

    // Flattens the unread content in a single Vec<u8>
    pub fn to_vec(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(self.len());
        for s in self.as_slices() {
            vec.extend_from_slice(s);
        }
        vec
    }

    pub fn get_first_slice<R>(&self, range: R) -> &[u8]
    where
        R: RangeBounds<usize>,
    {
        let buf = &self.segments[0].buf;
        let (start, end) = bounds(range, buf.len());
        &buf[start..end]
    }

    pub fn get_first_slice_mut<R>(&mut self, range: R) -> &mut [u8]
    where
        R: RangeBounds<usize>,
    {
        let buf = &mut self.segments[0].buf;
        let (start, end) = bounds(range, buf.len());
        &mut buf[start..end]
    }
}

fn bounds<R: RangeBounds<usize>>(range: R, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Included(&n) => n,
        Excluded(&n) => n + 1,
        Unbounded => 0,
    };
    let end = match range.end_bound() {
        Included(&n) => n + 1,
        Excluded(&n) => n,
        Unbounded => len,
    };
    (start, end)
}

impl io::Write for WBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.write_bytes(buf) {
            Ok(buf.len())
        } else {
            Ok(0)
        }
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.write_bytes(buf) {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write whole buffer",
            ))
        }
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Display for WBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "WBuf{{ contiguous: {}, len: {}, capacity: {}, segments: {} }}",
            self.contiguous,
            self.len(),
            self.capacity(),
            self.segments.len()
        )
    }
}

impl fmt::Debug for WBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "WBuf{{ contiguous: {}, r_pos: {:?}, mark: {:?}, segments:",
            self.contiguous, self.r_pos, self.mark
        )?;
        for s in &self.segments {
            write!(f, " {}/{}:{},", s.buf.len(), s.capacity, hex::encode_upper(&s.buf))?;
        }
        write!(f, " }}")
    }
}
