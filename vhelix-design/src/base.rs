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
use super::grid::LatticeSlot;
use super::{HelixId, Label, Material};
use ultraviolet::Vec3;

/// Identifier of a base in a `Design`. Identifiers are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BaseId(pub(crate) usize);

impl std::fmt::Display for BaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The label of a base together with its opposite pairing.
///
/// Of two paired bases, only the source stores a label. The label of the destination is always
/// the complement of the label of its source, so a destination cannot hold a label of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    Unpaired(Label),
    PairedSource { opposite: BaseId, label: Label },
    PairedDestination { source: BaseId },
}

impl Default for LabelState {
    fn default() -> Self {
        Self::Unpaired(Label::Invalid)
    }
}

impl LabelState {
    pub fn opposite(&self) -> Option<BaseId> {
        match self {
            Self::Unpaired(_) => None,
            Self::PairedSource { opposite, .. } => Some(*opposite),
            Self::PairedDestination { source } => Some(*source),
        }
    }

    pub fn is_destination(&self) -> bool {
        matches!(self, Self::PairedDestination { .. })
    }
}

/// Classification of a base according to its forward and backward neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    /// Both neighbours are connected.
    Base,
    /// No backward neighbour.
    FivePrimeEnd,
    /// No forward neighbour.
    ThreePrimeEnd,
    /// An isolated base, which is both a 5' and a 3' end.
    End,
}

impl BaseType {
    pub fn is_five_prime_end(&self) -> bool {
        matches!(self, Self::FivePrimeEnd | Self::End)
    }

    pub fn is_three_prime_end(&self) -> bool {
        matches!(self, Self::ThreePrimeEnd | Self::End)
    }
}

/// A base of a design.
///
/// The edges of a base are only modified through the methods of `Design` so that both ends of an
/// edge are always updated together.
#[derive(Debug, Clone)]
pub struct Base {
    pub(crate) name: String,
    pub(crate) helix: HelixId,
    pub(crate) translation: Vec3,
    pub(crate) forward: Option<BaseId>,
    pub(crate) backward: Option<BaseId>,
    pub(crate) label: LabelState,
    pub(crate) material: Option<Material>,
    pub(crate) slot: Option<LatticeSlot>,
}

impl Base {
    pub(crate) fn new(name: String, helix: HelixId, translation: Vec3) -> Self {
        Self {
            name,
            helix,
            translation,
            forward: None,
            backward: None,
            label: Default::default(),
            material: None,
            slot: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The helix owning this base.
    pub fn helix(&self) -> HelixId {
        self.helix
    }

    /// Translation of the base in the frame of its helix.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// The next base in the 3' direction.
    pub fn forward(&self) -> Option<BaseId> {
        self.forward
    }

    /// The previous base in the 5' direction.
    pub fn backward(&self) -> Option<BaseId> {
        self.backward
    }

    pub fn opposite(&self) -> Option<BaseId> {
        self.label.opposite()
    }

    pub fn is_destination(&self) -> bool {
        self.label.is_destination()
    }

    pub fn label_state(&self) -> LabelState {
        self.label
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    pub fn slot(&self) -> Option<LatticeSlot> {
        self.slot
    }

    pub fn base_type(&self) -> BaseType {
        match (self.backward.is_some(), self.forward.is_some()) {
            (true, true) => BaseType::Base,
            (false, true) => BaseType::FivePrimeEnd,
            (true, false) => BaseType::ThreePrimeEnd,
            (false, false) => BaseType::End,
        }
    }
}
