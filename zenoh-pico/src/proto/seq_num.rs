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

use zenoh_util::core::{ZErrorKind, ZResult};
use zenoh_util::zerror;

/// Sequence Number
///
/// Zenoh sequence numbers have a negotiable resolution. Each transport can
/// ideally negotiate its resolution and use it across all reliability channels.
///
/// The [`SeqNum`][SeqNum] encapsulates the sequence numbers along with a
/// the comparison operators that check whether two sequence numbers are
/// less, equal or greater of each other.
///
#[derive(Clone, Copy, Debug)]
pub struct SeqNum {
    value: ZInt,
    semi_int: ZInt,
    resolution: ZInt,
}

impl SeqNum {
    /// Create a new sequence number with a given resolution.
    ///
    /// # Arguments
    /// * `value` - The sequence number.
    ///
    /// * `resolution` - The resolution (modulo) to be used for the sequence number.
    ///                  As a consequence of wire zenoh's representation of sequence numbers it is
    ///                  recommended that the resolution is a power of 2 with exponent multiple of 7.
    ///                  Suggested values are:
    ///                  - 256 (i.e., 2^7)
    ///                  - 16_386 (i.e., 2^14)
    ///                  - 2_097_152 (i.e., 2^21)
    ///                  - 268_435_456 (i.e., 2^28)
    ///
    /// This funtion will return an error if `value` is out of bound w.r.t. `resolution`.
    /// That is if `value` is greater or equal than `resolution`.
    ///
    pub fn new(value: ZInt, resolution: ZInt) -> ZResult<SeqNum> {
        if resolution == 0 {
            return zerror!(ZErrorKind::InvalidResolution {
                descr: "The sequence number resolution must be greater than 0".to_string()
            });
        }
        let mut sn = SeqNum {
            value: 0,
            semi_int: resolution >> 1,
            resolution,
        };
        sn.set(value)?;
        Ok(sn)
    }

    #[inline]
    pub fn get(&self) -> ZInt {
        self.value
    }

    #[inline]
    pub fn resolution(&self) -> ZInt {
        self.resolution
    }

    #[inline]
    pub fn set(&mut self, value: ZInt) -> ZResult<()> {
        self.check(value)?;
        self.value = value;
        Ok(())
    }

    #[inline]
    pub fn increment(&mut self) {
        self.value = (self.value + 1) % self.resolution;
    }

    #[inline]
    fn check(&self, value: ZInt) -> ZResult<()> {
        if value >= self.resolution {
            return zerror!(ZErrorKind::InvalidResolution {
                descr: format!(
                    "The sequence number value {} must be smaller than the resolution {}",
                    value, self.resolution
                )
            });
        }
        Ok(())
    }

    /// Checks to see if two sequence number are in a precedence relationship,
    /// while taking into account roll backs.
    ///
    /// Two case are considered:
    ///
    /// ## Case 1: sna < snb
    ///
    /// In this case *sna* precedes *snb* iff (snb - sna) <= semi_int where
    /// semi_int is defined as half the sequence number resolution.
    /// In other terms, sna precedes snb iff there are less than half
    /// the length for the interval that separates them.
    ///
    /// ## Case 2: sna > snb
    ///
    /// In this case *sna* precedes *snb* iff (sna - snb) > semi_int.
    ///
    /// # Arguments
    ///
    /// * `value` -  The sequence number which should be checked for precedence relation.
    pub fn precedes(&self, value: ZInt) -> ZResult<bool> {
        self.check(value)?;

        let res = if value > self.value {
            value - self.value <= self.semi_int
        } else {
            self.value - value > self.semi_int
        };

        Ok(res)
    }

    /// Computes the modulo gap between two sequence numbers.
    ///
    /// Two case are considered:
    ///
    /// ## Case 1: sna < snb
    ///
    /// In this case the gap is computed as *snb* - *sna*.
    ///
    /// ## Case 2: sna > snb
    ///
    /// In this case the gap is computed as *resolution* - (*sna* - *snb*).
    ///
    /// # Arguments
    ///
    /// * `value` -  The sequence number which should be checked for gap computation.
    pub fn gap(&self, value: ZInt) -> ZResult<ZInt> {
        self.check(value)?;

        let gap = if value >= self.value {
            value - self.value
        } else {
            self.resolution - (self.value - value)
        };

        Ok(gap)
    }
}

/// Sequence Number Generator
///
/// The [`SeqNumGenerator`][SeqNumGenerator] encapsulates the generation of sequence numbers.
#[derive(Clone, Copy, Debug)]
pub struct SeqNumGenerator(SeqNum);

impl SeqNumGenerator {
    /// Create a new sequence number generator with a given resolution.
    ///
    /// # Arguments
    /// * `initial_sn` - The initial sequence number. It is a good practice to initialize the
    ///           sequence number generator with a random number
    ///
    /// * `sn_resolution` - The resolution to be used for the sequence number generator.
    ///
    pub fn new(initial_sn: ZInt, sn_resolution: ZInt) -> ZResult<SeqNumGenerator> {
        Ok(SeqNumGenerator(SeqNum::new(initial_sn, sn_resolution)?))
    }

    #[inline]
    pub fn now(&self) -> ZInt {
        self.0.get()
    }

    /// Generates the next sequence number
    #[inline]
    pub fn get(&mut self) -> ZInt {
        let now = self.now();
        self.0.increment();
        now
    }

    #[inline]
    pub fn set(&mut self, sn: ZInt) -> ZResult<()> {
        self.0.set(sn)
    }

    #[inline]
    pub fn resolution(&self) -> ZInt {
        self.0.resolution()
    }
}
