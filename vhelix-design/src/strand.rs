/*
vHelix, a design graph and file formats for DNA nanostructures.
    Copyright (C) 2021  Nicolas Levy <nicolaspierrelevy@gmail.com> and Nicolas Schabanel <nicolas.schabanel@ens-lyon.fr>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use super::*;

/// The direction in which a strand is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the 3' end.
    Forward,
    /// Towards the 5' end.
    Backward,
}

/// A strand of a design, identified by any of its bases.
///
/// A `Strand` does not own anything, it is a view over the forward/backward edges of the design
/// that starts at its defining base.
#[derive(Clone, Copy)]
pub struct Strand<'a> {
    design: &'a Design,
    base: BaseId,
}

impl<'a> Strand<'a> {
    pub fn new(design: &'a Design, base: BaseId) -> Self {
        Self { design, base }
    }

    pub fn defining_base(&self) -> BaseId {
        self.base
    }

    /// Iterate from the defining base towards the 3' end.
    pub fn forward(&self) -> StrandIter<'a> {
        StrandIter::new(self.design, self.base, Direction::Forward)
    }

    /// Iterate from the defining base towards the 5' end.
    pub fn backward(&self) -> StrandIter<'a> {
        StrandIter::new(self.design, self.base, Direction::Backward)
    }

    /// The same strand, defined by its 5' end. A circular strand is returned unchanged.
    pub fn rewind(&self) -> Self {
        let mut iter = self.backward();
        let mut last = self.base;
        for b in iter.by_ref() {
            last = b;
        }
        if iter.is_loop() {
            *self
        } else {
            Self::new(self.design, last)
        }
    }

    pub fn is_circular(&self) -> bool {
        let mut iter = self.forward();
        iter.by_ref().for_each(drop);
        iter.is_loop()
    }

    /// Return true iff `base` belongs to the strand.
    pub fn contains_base(&self, base: BaseId) -> bool {
        let mut iter = self.forward();
        if iter.by_ref().any(|b| b == base) {
            return true;
        }
        !iter.is_loop() && self.backward().any(|b| b == base)
    }

    /// The 5' end of the strand, or `None` if the strand is circular.
    pub fn five_prime_end(&self) -> Option<BaseId> {
        if self.is_circular() {
            None
        } else {
            Some(self.rewind().base)
        }
    }

    /// The bases of the strand, in the 5' to 3' order starting from `self.rewind()`.
    pub fn bases(&self) -> Vec<BaseId> {
        self.rewind().forward().collect()
    }

    pub fn len(&self) -> usize {
        self.bases().len()
    }

    pub fn is_empty(&self) -> bool {
        self.design.base(self.base).is_none()
    }
}

/// An iterator over the bases of a strand.
///
/// The iterator yields its origin first and then follows the edges in its direction. It stops at
/// the end of the strand or when it comes back to its origin, in which case `is_loop` returns
/// true.
pub struct StrandIter<'a> {
    design: &'a Design,
    origin: BaseId,
    next: Option<BaseId>,
    direction: Direction,
    started: bool,
    is_loop: bool,
}

impl<'a> StrandIter<'a> {
    fn new(design: &'a Design, origin: BaseId, direction: Direction) -> Self {
        Self {
            design,
            origin,
            next: design.base(origin).map(|_| origin),
            direction,
            started: false,
            is_loop: false,
        }
    }

    /// True if the iteration came back to its origin. Only meaningful once the iterator is
    /// exhausted.
    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl<'a> Iterator for StrandIter<'a> {
    type Item = BaseId;

    fn next(&mut self) -> Option<BaseId> {
        let current = self.next?;
        if self.started && current == self.origin {
            self.is_loop = true;
            self.next = None;
            return None;
        }
        self.started = true;
        self.next = match self.direction {
            Direction::Forward => self.design.forward(current),
            Direction::Backward => self.design.backward(current),
        };
        Some(current)
    }
}
