// This file is part of eventide-typegen.
// Copyright (C) 2025 Eventide Foundation
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deterministic, collision-free naming for generated declarations.
//!
//! Every declaration synthesized for one field carries a [`Tracker`]: the
//! field's base name followed by a path of [`Coordinate`]s, rendered with
//! `_` between the segments. Identifiers are pure functions of the path the
//! synthesis took through the declared type, so re-running the engine over
//! unchanged input reproduces them byte for byte.
//!
//! Two coordinate flavours exist, and they advance differently:
//!
//! * [`Coordinate::Numeric`] counts `0, 1, 2, …` and numbers chains of
//!   single-child nesting, such as a list inside a list.
//! * [`Coordinate::Literal`] counts in spreadsheet-column order, `A` through
//!   `Z`, then `AA`, `AB`, and so on without bound. Literal buckets are
//!   opened when a parent branches into several subtrees at once, so a map's
//!   key chain (`A`) and value chain (`B`) can each use numeric coordinates
//!   without colliding.
//!
//! Advancing a tracker with [`Tracker::next`] touches only the trailing
//! coordinate; appending a bucket with [`Tracker::literal`] or
//! [`Tracker::numeric`] lengthens the path instead. A map at `M_0` therefore
//! names its key subtree `M_0_A_0` and its value subtree `M_0_B_0`, and
//! nothing generated below one of those buckets can ever collide with the
//! other.

use std::fmt::{self, Display, Formatter};

/// Separator between the name and each coordinate of a rendered tracker.
const SEPARATOR: char = '_';

/// One position in a tracker's coordinate path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Coordinate {
    /// A natural-number coordinate.
    Numeric(u32),
    /// A spreadsheet-letter coordinate over `A`-`Z`.
    Literal(String),
}

impl Coordinate {
    /// A numeric coordinate starting at `seed`.
    pub fn numeric(seed: u32) -> Coordinate {
        Coordinate::Numeric(seed)
    }

    /// A literal coordinate at position `ordinal` of the spreadsheet column
    /// sequence: 0 is `A`, 25 is `Z`, 26 is `AA`.
    pub fn literal(ordinal: u32) -> Coordinate {
        // Bijective base-26: no position is ever an empty string.
        let mut remaining = u64::from(ordinal) + 1;
        let mut letters = Vec::new();
        while remaining > 0 {
            remaining -= 1;
            letters.push(char::from(b'A' + (remaining % 26) as u8));
            remaining /= 26;
        }
        letters.reverse();
        Coordinate::Literal(letters.into_iter().collect())
    }

    /// The successor of this coordinate within its own flavour.
    pub fn next(&self) -> Coordinate {
        match self {
            Coordinate::Numeric(value) => Coordinate::Numeric(value + 1),
            Coordinate::Literal(letters) => Coordinate::Literal(next_letters(letters)),
        }
    }

    /// The `count`-fold successor of this coordinate.
    pub fn next_by(&self, count: u32) -> Coordinate {
        match self {
            Coordinate::Numeric(value) => Coordinate::Numeric(value + count),
            Coordinate::Literal(_) => {
                let mut current = self.clone();
                for _ in 0..count {
                    current = current.next();
                }
                current
            }
        }
    }
}

/// Advances a spreadsheet column name: `A` to `B`, `Z` to `AA`, `AZ` to
/// `BA`, `ZZ` to `AAA`.
fn next_letters(letters: &str) -> String {
    let mut positions: Vec<char> = letters.chars().collect();
    for slot in positions.iter_mut().rev() {
        if *slot == 'Z' {
            *slot = 'A';
        } else {
            *slot = char::from(*slot as u8 + 1);
            return positions.into_iter().collect();
        }
    }
    // Every position carried over; the name grows by one column.
    positions.push('A');
    positions.into_iter().collect()
}

impl Display for Coordinate {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            Coordinate::Numeric(value) => write!(formatter, "{value}"),
            Coordinate::Literal(letters) => write!(formatter, "{letters}"),
        }
    }
}

/// A generated declaration's identifier: a base name plus a coordinate path.
///
/// Trackers are value objects; every operation returns a fresh tracker and
/// leaves the receiver untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tracker {
    name: String,
    path: Vec<Coordinate>,
}

impl Tracker {
    /// A tracker rooted at `name` with the given coordinate path.
    pub fn new(name: &str, path: Vec<Coordinate>) -> Tracker {
        Tracker {
            name: name.to_owned(),
            path,
        }
    }

    /// The base tracker for a named field: the field name followed by a
    /// single numeric coordinate at 0. Every identifier in the field's
    /// declaration set descends from this one.
    pub fn for_field(name: &str) -> Tracker {
        Tracker::new(name, vec![Coordinate::Numeric(0)])
    }

    /// Replaces the trailing coordinate with its successor, preserving the
    /// name and every earlier coordinate. This is how a chain of
    /// single-child nesting advances.
    pub fn next(&self) -> Tracker {
        let mut path = self.path.clone();
        if let Some(last) = path.last_mut() {
            *last = last.next();
        }
        Tracker {
            name: self.name.clone(),
            path,
        }
    }

    /// Appends a fresh literal bucket at position `ordinal`, lengthening the
    /// path. Opened once per branch when a parent fans out into several
    /// subtrees.
    pub fn literal(&self, ordinal: u32) -> Tracker {
        self.with(Coordinate::literal(ordinal))
    }

    /// Appends a fresh numeric coordinate starting at `seed`, lengthening
    /// the path.
    pub fn numeric(&self, seed: u32) -> Tracker {
        self.with(Coordinate::numeric(seed))
    }

    fn with(&self, coordinate: Coordinate) -> Tracker {
        let mut path = self.path.clone();
        path.push(coordinate);
        Tracker {
            name: self.name.clone(),
            path,
        }
    }
}

impl Display for Tracker {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.name)?;
        for coordinate in &self.path {
            write!(formatter, "{SEPARATOR}{coordinate}")?;
        }
        Ok(())
    }
}
