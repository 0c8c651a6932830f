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
use super::grid::GridPosition;
use super::BaseId;
use std::str::FromStr;
use ultraviolet::{Rotor3, Vec3};

/// Identifier of a helix in a `Design`. Identifiers are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HelixId(pub(crate) usize);

impl std::fmt::Display for HelixId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "H{}", self.0)
    }
}

/// The visual extent of a helix along its local Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CylinderRange {
    pub origo: f32,
    pub height: f32,
}

/// The two strands of a double helix created with `Design::create_helix_with_bases`, indexed by
/// base pair.
///
/// `forward[i]` and `backward[i]` are paired. The forward strand runs 5' to 3' along the axis of
/// the helix, the backward strand in the opposite direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ladder {
    pub forward: Vec<BaseId>,
    pub backward: Vec<BaseId>,
}

impl Ladder {
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> Option<BaseId> {
        match endpoint {
            Endpoint::ForwardFivePrime => self.forward.first(),
            Endpoint::ForwardThreePrime => self.forward.last(),
            Endpoint::BackwardFivePrime => self.backward.last(),
            Endpoint::BackwardThreePrime => self.backward.first(),
        }
        .cloned()
    }

    pub fn contains(&self, base: BaseId) -> bool {
        self.forward.contains(&base) || self.backward.contains(&base)
    }
}

/// An end of one of the two strands of a ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ForwardFivePrime,
    ForwardThreePrime,
    BackwardFivePrime,
    BackwardThreePrime,
}

impl FromStr for Endpoint {
    type Err = ();

    /// Parse `f5'`, `f3'`, `b5'` or `b3'`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f5'" => Ok(Self::ForwardFivePrime),
            "f3'" => Ok(Self::ForwardThreePrime),
            "b5'" => Ok(Self::BackwardFivePrime),
            "b3'" => Ok(Self::BackwardThreePrime),
            _ => Err(()),
        }
    }
}

/// A helix, owner of a set of bases.
#[derive(Debug, Clone)]
pub struct Helix {
    pub(crate) name: String,
    /// Position of the origin of the helix axis.
    pub position: Vec3,
    /// Orientation of the helix. The axis of the helix is the image of the Z axis.
    pub orientation: Rotor3,
    pub(crate) cylinder: CylinderRange,
    /// The bases of the helix, in creation order.
    pub(crate) bases: Vec<BaseId>,
    pub(crate) ladder: Option<Ladder>,
    /// The position of the helix on a lattice. If this is None, the helix is not bound to
    /// any lattice.
    pub(crate) grid_position: Option<GridPosition>,
}

impl Helix {
    pub(crate) fn new(name: String, position: Vec3, orientation: Rotor3) -> Self {
        Self {
            name,
            position,
            orientation,
            cylinder: Default::default(),
            bases: Vec::new(),
            ladder: None,
            grid_position: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[BaseId] {
        &self.bases
    }

    pub fn ladder(&self) -> Option<&Ladder> {
        self.ladder.as_ref()
    }

    pub fn grid_position(&self) -> Option<GridPosition> {
        self.grid_position
    }

    pub fn cylinder_range(&self) -> CylinderRange {
        self.cylinder
    }

    pub fn set_cylinder_range(&mut self, origo: f32, height: f32) {
        self.cylinder = CylinderRange { origo, height };
    }

    /// Direction of the axis of the helix in world coordinates.
    pub fn axis(&self) -> Vec3 {
        self.rotate_point(Vec3::unit_z())
    }

    pub fn rotate_point(&self, point: Vec3) -> Vec3 {
        point.rotated_by(self.orientation)
    }

    /// Map a point of the helix frame to world coordinates.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.rotate_point(local) + self.position
    }

    /// Map a point in world coordinates to the helix frame.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        (world - self.position).rotated_by(self.orientation.reversed())
    }
}

/// The rotation mapping the Z axis onto `normal`.
pub fn orientation_from_normal(normal: Vec3) -> Rotor3 {
    let normal = normal.normalized();
    if normal.dot(Vec3::unit_z()) < -1. + 1e-6 {
        // from_rotation_between is undefined for opposite vectors
        Rotor3::from_rotation_xz(std::f32::consts::PI)
    } else {
        Rotor3::from_rotation_between(Vec3::unit_z(), normal)
    }
}
