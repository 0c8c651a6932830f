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
//! DNA geometric constants and the placement of base pairs along a helix axis.
//!
//! Positions are given in the local frame of a helix: the axis of the helix is the Z axis and
//! base pair `0` lies in the plane `z = Z_SHIFT`.

use ultraviolet::Vec3;

/// Twist between two consecutive base pairs, in degrees. A full turn takes 10.5 base pairs
/// (B-form DNA).
pub const PITCH: f32 = 720. / 21.;

/// Rise per base pair along the axis of a helix.
pub const STEP: f32 = 0.334;

/// Radius of a helix.
pub const RADIUS: f32 = 1.;

/// Radius of the sphere representing a base. Bases are placed so that their sphere stays inside
/// the cylinder of their helix.
pub const SPHERE_RADIUS: f32 = 0.13;

/// Angle, in degrees, between the two bases of a pair around the axis of their helix. Two paired
/// bases are not diametrically opposed because of the minor groove.
pub const OPPOSITE_ROTATION: f32 = 155.;

/// Position of base pair `0` along the axis of its helix.
pub const Z_SHIFT: f32 = 0.;

/// Distance between the axes of two helices that touch each other.
pub const DIAMETER: f32 = 2. * RADIUS;

/// Horizontal distance between two neighbouring columns of a honeycomb lattice (`2 R cos 30°`).
pub const HONEYCOMB_X_STRIDE: f32 = DIAMETER * 0.866_025_4;

/// Vertical distance between two rows of a honeycomb lattice (`2 R (1 + sin 30°)`).
pub const HONEYCOMB_Y_STRIDE: f32 = DIAMETER * 1.5;

/// Vertical shift of the helices whose row and column have different parities (`2 R sin 30°`).
pub const HONEYCOMB_Y_OFFSET: f32 = DIAMETER * 0.5;

/// Distance between two neighbouring helices of a square lattice.
pub const SQUARE_STRIDE: f32 = DIAMETER;

/// The positions of the two bases of a pair, in the frame of their helix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePairPositions {
    /// The base on the strand whose 5' to 3' direction follows the axis of the helix.
    pub forward: Vec3,
    /// The base on the antiparallel strand.
    pub backward: Vec3,
}

/// Compute the positions of the two bases of the pair at `index` along the axis of a helix.
///
/// `index` may be fractional, to interpolate positions between two base pairs. `offset` is an
/// additional rotation around the axis, in degrees.
pub fn calculate_base_pair_positions(index: f32, offset: f32) -> BasePairPositions {
    let angle = offset.to_radians() - index * PITCH.to_radians();
    let opposite_angle = angle + OPPOSITE_ROTATION.to_radians();
    let radius = RADIUS - SPHERE_RADIUS;
    let z = index * STEP + Z_SHIFT;

    BasePairPositions {
        forward: Vec3::new(radius * angle.sin(), radius * angle.cos(), z),
        backward: Vec3::new(radius * opposite_angle.sin(), radius * opposite_angle.cos(), z),
    }
}

/// The index, possibly fractional, of the base pair lying in the plane of `translation`.
pub fn index_of_translation(translation: Vec3) -> f32 {
    (translation.z - Z_SHIFT) / STEP
}
