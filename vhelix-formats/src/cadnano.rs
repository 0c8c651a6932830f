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
//! caDNAno json files.
//!
//! A caDNAno file lists helices (`vstrands`) placed on a lattice. Each helix has a scaffold and a
//! staple column. Column entries are `[from helix, from index, to helix, to index]` 4-tuples
//! giving the 5' and 3' neighbours of the base at that index, `-1` meaning no neighbour. A
//! negative `skip` value removes the bases at an index and a positive `loop` value `k` inserts
//! `k` extra bases there.

use super::{ExportError, FormatType, ImportError};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;
use std::path::Path;
use vhelix_design::grid::{GridPosition, Lattice, LatticeSlot};
use vhelix_design::ultraviolet::Rotor3;
use vhelix_design::{dna, BaseId, Design, HelixId, Material, Progress};

const FORMAT: FormatType = FormatType::Cadnano;
const NO_LINK: [isize; 4] = [-1, -1, -1, -1];
/// The largest number of bases that a loop may insert at one index.
const MAX_LOOP: isize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cadnano {
    #[serde(default)]
    pub name: String,
    pub vstrands: Vec<VStrand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VStrand {
    pub num: isize,
    pub row: isize,
    pub col: isize,
    pub scaf: Vec<[isize; 4]>,
    pub stap: Vec<[isize; 4]>,
    #[serde(rename = "loop")]
    pub loop_: Vec<isize>,
    pub skip: Vec<isize>,
    /// `[index of the 5' end, packed rgb color]` of colored staples.
    #[serde(default)]
    pub stap_colors: Vec<[i64; 2]>,
    #[serde(rename = "scafLoop", default)]
    pub scaf_loop: Vec<serde_json::Value>,
    #[serde(rename = "stapLoop", default)]
    pub stap_loop: Vec<serde_json::Value>,
}

impl VStrand {
    fn empty(grid_position: GridPosition, nb_columns: usize) -> Self {
        Self {
            num: grid_position.num,
            row: grid_position.row,
            col: grid_position.col,
            scaf: vec![NO_LINK; nb_columns],
            stap: vec![NO_LINK; nb_columns],
            loop_: vec![0; nb_columns],
            skip: vec![0; nb_columns],
            stap_colors: Vec::new(),
            scaf_loop: Vec::new(),
            stap_loop: Vec::new(),
        }
    }

    fn column(&self, scaffold: bool) -> &[[isize; 4]] {
        if scaffold {
            &self.scaf
        } else {
            &self.stap
        }
    }

    fn column_mut(&mut self, scaffold: bool) -> &mut [[isize; 4]] {
        if scaffold {
            &mut self.scaf
        } else {
            &mut self.stap
        }
    }
}

impl Cadnano {
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn kind_name(scaffold: bool) -> &'static str {
    if scaffold {
        "scaf"
    } else {
        "stap"
    }
}

fn helix_name(num: isize) -> String {
    format!("helix_{}", num)
}

fn base_name(num: isize, scaffold: bool, index: usize, loop_index: usize) -> String {
    if loop_index == 0 {
        format!("helix_{}_{}_{}", num, kind_name(scaffold), index)
    } else {
        format!(
            "helix_{}_{}_{}_{}",
            num,
            kind_name(scaffold),
            index,
            loop_index
        )
    }
}

fn malformed(details: String) -> ImportError {
    ImportError::Malformed {
        format: FORMAT,
        details,
    }
}

fn reference(details: String) -> ImportError {
    ImportError::Reference {
        format: FORMAT,
        details,
    }
}

fn validate(cadnano: &Cadnano) -> Result<(), ImportError> {
    let mut nums = AHashSet::new();
    for v in cadnano.vstrands.iter() {
        if !nums.insert(v.num) {
            return Err(malformed(format!("helix number {} is used twice", v.num)));
        }
        let n = v.scaf.len();
        if v.stap.len() != n || v.loop_.len() != n || v.skip.len() != n {
            return Err(malformed(format!(
                "the scaf, stap, loop and skip arrays of helix {} do not have the same length",
                v.num
            )));
        }
        if let Some(i) = v.loop_.iter().position(|l| *l > MAX_LOOP) {
            return Err(malformed(format!(
                "loop of {} bases at index {} of helix {}",
                v.loop_[i], i, v.num
            )));
        }
    }
    Ok(())
}

/// A position of the lattice: helix number, scaffold or staple column, and index.
type Slot = (isize, bool, usize);

/// Build a design from a caDNAno file.
///
/// All the helices and bases are created before any connection between columns is made, since
/// connections may point to helices that come later in the file.
pub fn from_cadnano(cadnano: &Cadnano, progress: &mut dyn Progress) -> Result<Design, ImportError> {
    validate(cadnano)?;
    let mut design = Design::new();
    let lattice = cadnano
        .vstrands
        .first()
        .map(|v| Lattice::from_column_count(v.scaf.len()))
        .unwrap_or(Lattice::Honeycomb);
    log::debug!("caDNAno lattice: {:?}", lattice);
    let vstrands: AHashMap<isize, &VStrand> =
        cadnano.vstrands.iter().map(|v| (v.num, v)).collect();

    let mut chains: AHashMap<Slot, Vec<BaseId>> = Default::default();
    let mut helices: Vec<HelixId> = Vec::with_capacity(cadnano.vstrands.len());
    progress.begin(2 * cadnano.vstrands.len());
    for v in cadnano.vstrands.iter() {
        let grid_position = GridPosition {
            num: v.num,
            row: v.row,
            col: v.col,
            lattice,
        };
        let helix = design.create_helix(
            helix_name(v.num),
            lattice.helix_position(v.row, v.col),
            Rotor3::identity(),
        )?;
        design.set_grid_position(helix, Some(grid_position))?;
        for scaffold in [true, false] {
            let forward = scaffold == grid_position.scaffold_is_forward();
            for (i, link) in v.column(scaffold).iter().enumerate() {
                if *link == NO_LINK || v.skip[i] < 0 {
                    continue;
                }
                let nb_bases = v.loop_[i].max(0) as usize + 1;
                let mut chain = Vec::new();
                for m in 0..nb_bases {
                    // Inserted bases share the index of their column
                    let rank = if forward { m } else { nb_bases - 1 - m };
                    let index = i as f32 + rank as f32 / nb_bases as f32;
                    let positions = dna::calculate_base_pair_positions(index, 0.);
                    let translation = if forward {
                        positions.forward
                    } else {
                        positions.backward
                    };
                    let base = design.create_base(
                        base_name(v.num, scaffold, i, m),
                        helix,
                        translation,
                    )?;
                    design.set_slot(
                        base,
                        Some(LatticeSlot {
                            column: i,
                            scaffold,
                            loop_index: m,
                        }),
                    )?;
                    chain.push(base);
                }
                for w in chain.windows(2) {
                    design.connect_forward(w[0], w[1], false)?;
                }
                chains.insert((v.num, scaffold, i), chain);
            }
        }
        for i in 0..v.scaf.len() {
            if let (Some(scaf), Some(stap)) =
                (chains.get(&(v.num, true, i)), chains.get(&(v.num, false, i)))
            {
                for (source, destination) in scaf.iter().zip(stap.iter().rev()) {
                    design.connect_opposite(*source, *destination, false)?;
                }
            }
        }
        helices.push(helix);
        progress.step();
    }
    log::info!(
        "created {} helices and {} bases",
        design.nb_helices(),
        design.nb_bases()
    );

    let mut nb_connections = 0;
    for v in cadnano.vstrands.iter() {
        for scaffold in [true, false] {
            for (i, link) in v.column(scaffold).iter().enumerate() {
                let last = match chains.get(&(v.num, scaffold, i)).and_then(|c| c.last()) {
                    Some(b) => *b,
                    None => continue,
                };
                if link[2] < 0 {
                    continue;
                }
                if let Some((num, index)) =
                    get_valid_index(&vstrands, scaffold, (v.num, i), (link[2], link[3]))?
                {
                    let first = chains
                        .get(&(num, scaffold, index))
                        .and_then(|c| c.first())
                        .ok_or_else(|| {
                            reference(format!(
                                "{} {} of helix {} points to the empty index {} of helix {}",
                                kind_name(scaffold),
                                i,
                                v.num,
                                index,
                                num
                            ))
                        })?;
                    design.connect_forward(last, *first, false)?;
                    nb_connections += 1;
                }
            }
        }
        progress.step();
    }
    log::info!("made {} connections", nb_connections);

    for helix in helices {
        design.fit_cylinder_range(helix)?;
    }

    for v in cadnano.vstrands.iter() {
        for [index, color] in v.stap_colors.iter() {
            let five_prime = usize::try_from(*index)
                .ok()
                .and_then(|i| chains.get(&(v.num, false, i)))
                .and_then(|c| c.first());
            if let Some(five_prime) = five_prime {
                let material = Material::from_rgb(*color as u32);
                for b in design.strand(*five_prime).bases() {
                    design.set_material(b, Some(material.clone()))?;
                }
            } else {
                log::warn!("no staple at index {} of helix {} to color", index, v.num);
            }
        }
    }
    progress.done();
    Ok(design)
}

/// Follow the link going from `from` to `to` until it reaches an index that is not skipped.
///
/// Return `None` if the strand ends on skipped indices.
fn get_valid_index(
    vstrands: &AHashMap<isize, &VStrand>,
    scaffold: bool,
    from: (isize, usize),
    to: (isize, isize),
) -> Result<Option<(isize, usize)>, ImportError> {
    let mut previous = from;
    let mut current = to;
    let mut visited = AHashSet::new();
    loop {
        let (num, index) = current;
        let v = vstrands
            .get(&num)
            .ok_or_else(|| reference(format!("there is no helix {}", num)))?;
        let index = usize::try_from(index)
            .ok()
            .filter(|i| *i < v.skip.len())
            .ok_or_else(|| reference(format!("helix {} has no index {}", num, index)))?;
        let link = v.column(scaffold)[index];
        if link[0] != previous.0 || link[1] != previous.1 as isize {
            log::warn!(
                "{} {} of helix {} does not point back to {} of helix {}",
                kind_name(scaffold),
                index,
                num,
                previous.1,
                previous.0
            );
        }
        if v.skip[index] >= 0 {
            return Ok(Some((num, index)));
        }
        if !visited.insert((num, index)) {
            return Err(malformed(format!(
                "cycle of skipped indices at {} {} of helix {}",
                kind_name(scaffold),
                index,
                num
            )));
        }
        if link[2] < 0 {
            return Ok(None);
        }
        previous = (num, index);
        current = (link[2], link[3]);
    }
}

/// The 3'-most base of the bases of `group`.
fn last_of_group(design: &Design, group: &[BaseId]) -> Option<BaseId> {
    group
        .iter()
        .find(|b| {
            design
                .forward(**b)
                .map(|n| !group.contains(&n))
                .unwrap_or(true)
        })
        .or_else(|| group.first())
        .cloned()
}

/// Convert a design to the caDNAno format.
///
/// All the bases must have a lattice slot, which is the case of the bases of designs imported
/// from caDNAno. Columns that carry no base between two consecutive bases of a strand are written
/// as skips.
pub fn to_cadnano<S: Into<String>>(
    design: &Design,
    name: S,
    progress: &mut dyn Progress,
) -> Result<Cadnano, ExportError> {
    let mut lattice: Option<Lattice> = None;
    let mut check_lattice = |grid: &GridPosition| match lattice {
        Some(l) if l != grid.lattice => Err(ExportError::MixedLattices),
        _ => {
            lattice = Some(grid.lattice);
            Ok(())
        }
    };

    let mut helices: BTreeMap<isize, (GridPosition, usize)> = BTreeMap::new();
    for (_, helix) in design.helices() {
        if let Some(grid) = helix.grid_position() {
            check_lattice(&grid)?;
            helices.insert(grid.num, (grid, 0));
        }
    }

    let mut slots: AHashMap<BaseId, Slot> = Default::default();
    let mut groups: BTreeMap<Slot, Vec<BaseId>> = BTreeMap::new();
    let mut occupied: AHashSet<(isize, usize)> = Default::default();
    for (id, base) in design.bases() {
        let not_on_lattice = || ExportError::NotOnLattice {
            base: base.name().to_string(),
        };
        let grid = design
            .helix(base.helix())
            .and_then(|h| h.grid_position())
            .ok_or_else(not_on_lattice)?;
        let slot = base.slot().ok_or_else(not_on_lattice)?;
        let key = (grid.num, slot.scaffold, slot.column);
        slots.insert(id, key);
        groups.entry(key).or_default().push(id);
        occupied.insert((grid.num, slot.column));
        if let Some(entry) = helices.get_mut(&grid.num) {
            entry.1 = entry.1.max(slot.column + 1);
        }
    }

    let lattice = lattice.unwrap_or(Lattice::Honeycomb);
    let nb_used = helices.values().map(|(_, n)| *n).max().unwrap_or(0);
    let nb_columns = lattice.padded_column_count(nb_used);
    let mut vstrands: BTreeMap<isize, VStrand> = helices
        .values()
        .map(|(grid, _)| (grid.num, VStrand::empty(*grid, nb_columns)))
        .collect();

    progress.begin(groups.len());
    for (&(num, scaffold, column), group) in groups.iter() {
        progress.step();
        if let Some(v) = vstrands.get_mut(&num) {
            v.loop_[column] = v.loop_[column].max(group.len() as isize - 1);
        }
        let next = match last_of_group(design, group).and_then(|b| design.forward(b)) {
            Some(next) => next,
            None => continue,
        };
        let (next_num, next_scaffold, next_column) = slots
            .get(&next)
            .cloned()
            .ok_or_else(|| ExportError::NotOnLattice {
                base: next.to_string(),
            })?;
        if next_scaffold != scaffold {
            return Err(ExportError::Unrepresentable {
                details: format!(
                    "a {} strand continues on a {} column",
                    kind_name(scaffold),
                    kind_name(next_scaffold)
                ),
            });
        }
        if next_num == num && next_column == column {
            continue;
        }

        let mut path = vec![(num, column)];
        if next_num == num && column.abs_diff(next_column) > 1 {
            let skipped: Vec<usize> = if next_column > column {
                (column + 1..next_column).collect()
            } else {
                (next_column + 1..column).rev().collect()
            };
            if skipped.iter().all(|c| !occupied.contains(&(num, *c))) {
                if let Some(v) = vstrands.get_mut(&num) {
                    for c in skipped.iter() {
                        v.skip[*c] = -1;
                    }
                }
                path.extend(skipped.into_iter().map(|c| (num, c)));
            }
        }
        path.push((next_num, next_column));

        for w in path.windows(2) {
            let ((from_num, from_column), (to_num, to_column)) = (w[0], w[1]);
            if let Some(v) = vstrands.get_mut(&from_num) {
                let link = &mut v.column_mut(scaffold)[from_column];
                link[2] = to_num;
                link[3] = to_column as isize;
            }
            if let Some(v) = vstrands.get_mut(&to_num) {
                let link = &mut v.column_mut(scaffold)[to_column];
                link[0] = from_num;
                link[1] = from_column as isize;
            }
        }
    }

    for &(num, scaffold, column) in groups.keys() {
        if vstrands
            .get(&num)
            .map(|v| v.column(scaffold)[column] == NO_LINK)
            .unwrap_or(false)
        {
            log::warn!(
                "the isolated base at {} {} of helix {} cannot be written",
                kind_name(scaffold),
                column,
                num
            );
        }
    }

    for strand in design.strands() {
        if let Some(five_prime) = strand.five_prime_end() {
            let color = design
                .base(five_prime)
                .and_then(|b| b.material())
                .and_then(Material::to_rgb);
            if let (Some(color), Some((num, false, column))) = (color, slots.get(&five_prime)) {
                if let Some(v) = vstrands.get_mut(num) {
                    v.stap_colors.push([*column as i64, color as i64]);
                }
            }
        }
    }
    for v in vstrands.values_mut() {
        v.stap_colors.sort_unstable();
    }
    progress.done();

    Ok(Cadnano {
        name: name.into(),
        vstrands: vstrands.into_values().collect(),
    })
}
