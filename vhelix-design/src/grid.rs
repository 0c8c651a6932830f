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
//! Lattices on which helices imported from caDNAno are placed.

use super::dna::{HONEYCOMB_X_STRIDE, HONEYCOMB_Y_OFFSET, HONEYCOMB_Y_STRIDE, SQUARE_STRIDE};
use ultraviolet::Vec3;

/// The type of lattice used by a caDNAno design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lattice {
    Honeycomb,
    Square,
}

impl Lattice {
    /// The number of columns of a honeycomb helix is always a multiple of 21 and the number of
    /// columns of a square helix a multiple of 32.
    pub fn from_column_count(nb_columns: usize) -> Self {
        if nb_columns % 21 == 0 {
            Self::Honeycomb
        } else {
            Self::Square
        }
    }

    pub fn column_multiple(&self) -> usize {
        match self {
            Self::Honeycomb => 21,
            Self::Square => 32,
        }
    }

    /// Position of the origin of the helix at (`row`, `col`).
    pub fn helix_position(&self, row: isize, col: isize) -> Vec3 {
        match self {
            Self::Honeycomb => {
                let upper = -HONEYCOMB_Y_STRIDE * row as f32;
                let y = if row.abs() % 2 != col.abs() % 2 {
                    upper - HONEYCOMB_Y_OFFSET
                } else {
                    upper
                };
                Vec3::new(col as f32 * HONEYCOMB_X_STRIDE, y, 0.)
            }
            Self::Square => Vec3::new(
                col as f32 * SQUARE_STRIDE,
                -(row as f32) * SQUARE_STRIDE,
                0.,
            ),
        }
    }

    /// Number of columns needed to hold `nb_used` columns.
    pub fn padded_column_count(&self, nb_used: usize) -> usize {
        let multiple = self.column_multiple();
        ((nb_used.max(1) + multiple - 1) / multiple) * multiple
    }
}

/// The position of a helix on a lattice, together with its caDNAno number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub num: isize,
    pub row: isize,
    pub col: isize,
    pub lattice: Lattice,
}

impl GridPosition {
    /// On even helices the scaffold runs 5' to 3' along the axis of the helix, on odd helices
    /// the staples do.
    pub fn scaffold_is_forward(&self) -> bool {
        self.num % 2 == 0
    }
}

/// The slot of a base on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeSlot {
    /// Column of the base on its helix.
    pub column: usize,
    /// True if the base belongs to the scaffold column, false for the staple column.
    pub scaffold: bool,
    /// Rank of the base among the bases inserted by a loop at `column`, 0 for the base that is
    /// not an insertion.
    pub loop_index: usize,
}
