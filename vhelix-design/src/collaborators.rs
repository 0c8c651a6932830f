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
//! Interfaces to the subsystems that a design talks to without owning them: materials used to
//! paint bases, progress reporting and deletion observers.

use super::BaseId;

/// An opaque material identifier. The design only stores and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Material(String);

impl Material {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// A material named after a 24 bits packed RGB color, e.g. `#1a2b3c`.
    pub fn from_rgb(color: u32) -> Self {
        Self(format!("#{:06x}", color & 0xFF_FF_FF))
    }

    /// The packed RGB color of a material created with `from_rgb`.
    pub fn to_rgb(&self) -> Option<u32> {
        let hex = self.0.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const DEFAULT_MATERIALS: [&str; 8] = [
    "DNABaseMaterial1",
    "DNABaseMaterial2",
    "DNABaseMaterial3",
    "DNABaseMaterial4",
    "DNABaseMaterial5",
    "DNABaseMaterial6",
    "DNABaseMaterial7",
    "DNABaseMaterial8",
];

/// The materials available to an importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materials(Vec<Material>);

impl Default for Materials {
    fn default() -> Self {
        Self(DEFAULT_MATERIALS.iter().map(|n| Material::new(*n)).collect())
    }
}

impl Materials {
    pub fn new(materials: Vec<Material>) -> Self {
        Self(materials)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.0.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|m| m.name() == name)
    }

    /// Return the material named `name`.
    ///
    /// Colors (`#rrggbb`) are always available. An unknown name is not an error: a warning is
    /// logged and the first available material is returned instead. Returns `None` only if the
    /// name is unknown and there is no material at all.
    pub fn resolve(&self, name: &str) -> Option<Material> {
        let material = Material::new(name);
        if self.contains(name) || material.to_rgb().is_some() {
            Some(material)
        } else {
            let fallback = self.0.first().cloned();
            log::warn!(
                "Unknown material {}, using {} instead",
                name,
                fallback
                    .as_ref()
                    .map(|m| m.name())
                    .unwrap_or("no material")
            );
            fallback
        }
    }
}

/// A sink for the progress of long operations.
pub trait Progress {
    fn begin(&mut self, range: usize);
    fn step(&mut self);
    fn done(&mut self);
}

/// Discard progress reports.
pub struct NoProgress;

impl Progress for NoProgress {
    fn begin(&mut self, _range: usize) {}
    fn step(&mut self) {}
    fn done(&mut self) {}
}

/// Report progress in the log.
pub struct LogProgress {
    operation: &'static str,
    range: usize,
    current: usize,
}

impl LogProgress {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            range: 0,
            current: 0,
        }
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, range: usize) {
        self.range = range;
        self.current = 0;
        log::debug!("{}: 0/{}", self.operation, range);
    }

    fn step(&mut self) {
        self.current += 1;
        // Only log every tenth of the work
        let tenth = (self.range / 10).max(1);
        if self.current % tenth == 0 {
            log::debug!("{}: {}/{}", self.operation, self.current, self.range);
        }
    }

    fn done(&mut self) {
        log::debug!("{}: done", self.operation);
    }
}

/// An object that must be told when bases are about to be removed from a design.
pub trait DesignObserver: Send + Sync {
    /// Called before the edges of `base` are severed.
    fn on_base_will_be_deleted(&self, base: BaseId);
}
