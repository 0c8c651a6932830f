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
//! This crate defines the vHelix design graph.
//!
//! A design is an arena of helices and bases. Bases are linked by directed forward/backward
//! edges that form strands, and by opposite edges that pair bases of complementary strands. All
//! the file formats supported by vHelix are converted from and into a `Design`.
use ahash::AHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use ultraviolet;
use ultraviolet::{Rotor3, Vec3};

mod base;
pub use base::*;
mod collaborators;
pub use collaborators::*;
pub mod design_operations;
pub mod dna;
mod error;
pub use error::DesignError;
mod graph;
pub use graph::Edge;
pub mod grid;
use grid::{GridPosition, LatticeSlot};
mod helix;
pub use helix::*;
mod label;
pub use label::*;
mod strand;
pub use strand::*;

#[cfg(test)]
mod tests;

/// The vHelix design structure.
#[derive(Clone, Default)]
pub struct Design {
    helices: BTreeMap<HelixId, Helix>,
    bases: BTreeMap<BaseId, Base>,
    helix_names: AHashMap<String, HelixId>,
    base_names: AHashMap<String, BaseId>,
    next_helix_id: usize,
    next_base_id: usize,
    observers: Vec<Arc<dyn DesignObserver>>,
}

fn check_name(name: &str) -> Result<(), DesignError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        Err(DesignError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

impl Design {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register an observer that is notified before bases are deleted.
    pub fn add_observer(&mut self, observer: Arc<dyn DesignObserver>) {
        self.observers.push(observer)
    }

    // Creation and deletion
    //============================================================================================
    /// Create an empty helix.
    pub fn create_helix<S: Into<String>>(
        &mut self,
        name: S,
        position: Vec3,
        orientation: Rotor3,
    ) -> Result<HelixId, DesignError> {
        let name = name.into();
        check_name(&name)?;
        if self.helix_names.contains_key(&name) {
            return Err(DesignError::DuplicateName(name));
        }
        let id = HelixId(self.next_helix_id);
        self.next_helix_id += 1;
        self.helix_names.insert(name.clone(), id);
        self.helices.insert(id, Helix::new(name, position, orientation));
        Ok(id)
    }

    /// Create a double helix of `nb_pairs` base pairs.
    ///
    /// The forward strand runs 5' to 3' along the axis of the helix and the backward strand runs
    /// in the opposite direction. Bases are named `<helix>_f<i>` and `<helix>_b<i>` where `i` is
    /// the index of their base pair, and the forward base of each pair is the source of the
    /// opposite pairing.
    pub fn create_helix_with_bases<S: Into<String>>(
        &mut self,
        name: S,
        position: Vec3,
        orientation: Rotor3,
        nb_pairs: usize,
    ) -> Result<HelixId, DesignError> {
        let name = name.into();
        let helix_id = self.create_helix(name.clone(), position, orientation)?;

        let mut forward = Vec::new();
        let mut backward = Vec::new();
        for i in 0..nb_pairs {
            let positions = dna::calculate_base_pair_positions(i as f32, 0.);
            forward.push(self.create_base(format!("{}_f{}", name, i), helix_id, positions.forward)?);
        }
        for i in 0..nb_pairs {
            let positions = dna::calculate_base_pair_positions(i as f32, 0.);
            backward.push(self.create_base(
                format!("{}_b{}", name, i),
                helix_id,
                positions.backward,
            )?);
        }
        for i in 1..nb_pairs {
            self.connect_forward(forward[i - 1], forward[i], true)?;
            self.connect_forward(backward[i], backward[i - 1], true)?;
        }
        for (f, b) in forward.iter().zip(backward.iter()) {
            self.connect_opposite(*f, *b, true)?;
        }

        let helix = self.helix_mut(helix_id)?;
        helix.ladder = Some(Ladder { forward, backward });
        helix.set_cylinder_range(dna::Z_SHIFT, nb_pairs as f32 * dna::STEP);
        Ok(helix_id)
    }

    /// Create an isolated base on `helix`, at `translation` in the frame of the helix.
    pub fn create_base<S: Into<String>>(
        &mut self,
        name: S,
        helix: HelixId,
        translation: Vec3,
    ) -> Result<BaseId, DesignError> {
        let name = name.into();
        check_name(&name)?;
        if !self.helices.contains_key(&helix) {
            return Err(DesignError::InvalidHelix(helix));
        }
        if self.base_names.contains_key(&name) {
            return Err(DesignError::DuplicateName(name));
        }
        let id = BaseId(self.next_base_id);
        self.next_base_id += 1;
        self.base_names.insert(name.clone(), id);
        self.bases.insert(id, Base::new(name, helix, translation));
        self.helix_mut(helix)?.bases.push(id);
        Ok(id)
    }

    /// Remove a base from the design after severing all its edges.
    pub fn delete_base(&mut self, id: BaseId) -> Result<(), DesignError> {
        self.check_base(id)?;
        for observer in self.observers.iter() {
            observer.on_base_will_be_deleted(id);
        }
        self.disconnect_forward(id)?;
        self.disconnect_backward(id)?;
        self.disconnect_opposite(id)?;
        if let Some(base) = self.bases.remove(&id) {
            self.base_names.remove(&base.name);
            if let Some(helix) = self.helices.get_mut(&base.helix) {
                helix.bases.retain(|b| *b != id);
                // A ladder with a missing base no longer describes base pairs
                if helix.ladder.as_ref().map(|l| l.contains(id)).unwrap_or(false) {
                    log::debug!("dropping the ladder of {}", base.helix);
                    helix.ladder = None;
                }
            }
        }
        Ok(())
    }

    /// Remove a helix and all its bases.
    pub fn delete_helix(&mut self, id: HelixId) -> Result<(), DesignError> {
        let bases = self.helix(id).ok_or(DesignError::InvalidHelix(id))?.bases.clone();
        for b in bases {
            self.delete_base(b)?;
        }
        if let Some(helix) = self.helices.remove(&id) {
            self.helix_names.remove(&helix.name);
        }
        Ok(())
    }
    //============================================================================================

    // Collection methods
    //============================================================================================
    pub fn helix(&self, id: HelixId) -> Option<&Helix> {
        self.helices.get(&id)
    }

    pub(crate) fn helix_mut(&mut self, id: HelixId) -> Result<&mut Helix, DesignError> {
        self.helices.get_mut(&id).ok_or(DesignError::InvalidHelix(id))
    }

    pub fn base(&self, id: BaseId) -> Option<&Base> {
        self.bases.get(&id)
    }

    pub(crate) fn base_mut(&mut self, id: BaseId) -> Result<&mut Base, DesignError> {
        self.bases.get_mut(&id).ok_or(DesignError::InvalidBase(id))
    }

    pub(crate) fn check_base(&self, id: BaseId) -> Result<(), DesignError> {
        if self.bases.contains_key(&id) {
            Ok(())
        } else {
            Err(DesignError::InvalidBase(id))
        }
    }

    /// Iterate over the helices in creation order.
    pub fn helices(&self) -> impl Iterator<Item = (HelixId, &Helix)> {
        self.helices.iter().map(|(id, h)| (*id, h))
    }

    /// Iterate over the bases, helix by helix, each helix in creation order.
    pub fn bases(&self) -> impl Iterator<Item = (BaseId, &Base)> {
        self.helices.values().flat_map(move |h| {
            h.bases
                .iter()
                .filter_map(move |id| self.bases.get(id).map(|b| (*id, b)))
        })
    }

    /// The bases of `helix` in creation order.
    pub fn helix_bases(&self, helix: HelixId) -> impl Iterator<Item = BaseId> + '_ {
        self.helices
            .get(&helix)
            .into_iter()
            .flat_map(|h| h.bases.iter().cloned())
    }

    pub fn nb_helices(&self) -> usize {
        self.helices.len()
    }

    pub fn nb_bases(&self) -> usize {
        self.bases.len()
    }

    pub fn helix_by_name(&self, name: &str) -> Option<HelixId> {
        self.helix_names.get(name).cloned()
    }

    pub fn base_by_name(&self, name: &str) -> Option<BaseId> {
        self.base_names.get(name).cloned()
    }

    pub fn resolve_helix(&self, name: &str) -> Result<HelixId, DesignError> {
        self.helix_by_name(name)
            .ok_or_else(|| DesignError::UnknownName(name.to_string()))
    }

    pub fn resolve_base(&self, name: &str) -> Result<BaseId, DesignError> {
        self.base_by_name(name)
            .ok_or_else(|| DesignError::UnknownName(name.to_string()))
    }
    //============================================================================================

    // Attributes
    //============================================================================================
    /// Position of a base in world coordinates.
    pub fn base_world_position(&self, id: BaseId) -> Option<Vec3> {
        let base = self.bases.get(&id)?;
        let helix = self.helices.get(&base.helix)?;
        Some(helix.to_world(base.translation))
    }

    pub fn set_base_translation(&mut self, id: BaseId, translation: Vec3) -> Result<(), DesignError> {
        self.base_mut(id)?.translation = translation;
        Ok(())
    }

    pub fn set_material(&mut self, id: BaseId, material: Option<Material>) -> Result<(), DesignError> {
        self.base_mut(id)?.material = material;
        Ok(())
    }

    pub fn set_slot(&mut self, id: BaseId, slot: Option<LatticeSlot>) -> Result<(), DesignError> {
        self.base_mut(id)?.slot = slot;
        Ok(())
    }

    pub fn set_grid_position(
        &mut self,
        helix: HelixId,
        grid_position: Option<GridPosition>,
    ) -> Result<(), DesignError> {
        self.helix_mut(helix)?.grid_position = grid_position;
        Ok(())
    }

    pub fn set_helix_transform(
        &mut self,
        helix: HelixId,
        position: Vec3,
        orientation: Rotor3,
    ) -> Result<(), DesignError> {
        let helix = self.helix_mut(helix)?;
        helix.position = position;
        helix.orientation = orientation;
        Ok(())
    }

    pub fn set_cylinder_range(
        &mut self,
        helix: HelixId,
        origo: f32,
        height: f32,
    ) -> Result<(), DesignError> {
        self.helix_mut(helix)?.set_cylinder_range(origo, height);
        Ok(())
    }

    pub fn cylinder_range(&self, helix: HelixId) -> Option<CylinderRange> {
        self.helix(helix).map(Helix::cylinder_range)
    }

    /// Set the cylinder range of `helix` so that it covers all its bases, with half a step of
    /// margin on each side.
    pub fn fit_cylinder_range(&mut self, helix: HelixId) -> Result<(), DesignError> {
        let mut bounds: Option<(f32, f32)> = None;
        for b in self.helix_bases(helix) {
            if let Some(base) = self.bases.get(&b) {
                let z = base.translation.z;
                bounds = Some(bounds.map_or((z, z), |(min, max)| (min.min(z), max.max(z))));
            }
        }
        let (min, max) = bounds.unwrap_or((dna::Z_SHIFT, dna::Z_SHIFT - dna::STEP));
        let origo = min - dna::STEP / 2.;
        self.set_cylinder_range(helix, origo, max - min + dna::STEP)
    }
    //============================================================================================

    /// The strand containing `base`.
    pub fn strand(&self, base: BaseId) -> Strand<'_> {
        Strand::new(self, base)
    }

    /// All the strands of the design, each one exactly once and rooted at its 5' end (or at an
    /// arbitrary base if it is circular).
    ///
    /// Strands are ordered by the position of their first encountered base in the order of
    /// `Design::bases`.
    pub fn strands(&self) -> Vec<Strand<'_>> {
        let mut seen: ahash::AHashSet<BaseId> = Default::default();
        let mut ret = Vec::new();
        for (id, _) in self.bases() {
            if seen.contains(&id) {
                continue;
            }
            let strand = self.strand(id).rewind();
            seen.extend(strand.forward());
            ret.push(strand);
        }
        ret
    }
}
