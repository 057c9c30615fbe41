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
//! Resource name intersection.
//!
//! A resource name is a `/` separated list of chunks. A `*` matches any
//! sequence of characters inside a chunk, a `**` chunk matches any sequence
//! of chunks (including none).
use super::ResKey;

// The two levels of a resource name: the characters of a chunk
// and the chunks of a name. Both are matched by the same algorithm.
trait Level {
    fn end(s: &str) -> bool;
    fn wild(s: &str) -> bool;
    fn next(s: &str) -> &str;
    fn elem_intersect(s1: &str, s2: &str) -> bool;
}

struct Chunk;

impl Level for Chunk {
    #[inline(always)]
    fn end(s: &str) -> bool {
        s.is_empty() || s.starts_with('/')
    }

    #[inline(always)]
    fn wild(s: &str) -> bool {
        s.starts_with('*')
    }

    #[inline(always)]
    fn next(s: &str) -> &str {
        let mut chars = s.chars();
        chars.next();
        chars.as_str()
    }

    #[inline(always)]
    fn elem_intersect(s1: &str, s2: &str) -> bool {
        s1.chars().next() == s2.chars().next()
    }
}

struct Name;

impl Level for Name {
    #[inline(always)]
    fn end(s: &str) -> bool {
        s.is_empty()
    }

    #[inline(always)]
    fn wild(s: &str) -> bool {
        s == "**" || s.starts_with("**/")
    }

    #[inline(always)]
    fn next(s: &str) -> &str {
        match s.find('/') {
            Some(idx) => &s[idx + 1..],
            None => "",
        }
    }

    #[inline(always)]
    fn elem_intersect(s1: &str, s2: &str) -> bool {
        // A chunk ends where the other one ends
        if Chunk::end(s1) != Chunk::end(s2) {
            return false;
        }
        level_intersect::<Chunk>(s1, s2)
    }
}

fn level_intersect<L: Level>(s1: &str, s2: &str) -> bool {
    match (L::end(s1), L::end(s2)) {
        (true, true) => return true,
        (false, true) if L::wild(s1) => return level_intersect::<L>(L::next(s1), s2),
        (true, false) if L::wild(s2) => return level_intersect::<L>(s1, L::next(s2)),
        _ => {}
    }

    if L::wild(s1) || L::wild(s2) {
        let wild = if L::wild(s1) { s1 } else { s2 };
        // A trailing wildcard matches whatever remains
        if L::end(L::next(wild)) {
            return true;
        }
        // The wildcard matches either nothing or one more element
        return level_intersect::<L>(L::next(s1), s2) || level_intersect::<L>(s1, L::next(s2));
    }

    if L::end(s1) || L::end(s2) {
        return false;
    }
    L::elem_intersect(s1, s2) && level_intersect::<L>(L::next(s1), L::next(s2))
}

/// Returns `true` if some resource name matches both `s1` and `s2`.
#[inline]
pub fn intersect(s1: &str, s2: &str) -> bool {
    level_intersect::<Name>(s1, s2)
}

impl ResKey {
    /// Intersects the names of two resource keys.
    /// Returns `None` if one of the keys refers to a declared resource id,
    /// whose name is only known by the declaring session.
    pub fn intersects(&self, other: &ResKey) -> Option<bool> {
        match (self, other) {
            (ResKey::RName(s1), ResKey::RName(s2)) => Some(intersect(s1, s2)),
            _ => None,
        }
    }
}
