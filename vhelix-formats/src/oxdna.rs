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
//! oxDNA configuration and topology files, together with a glue file that stores what oxDNA
//! cannot represent: helices, base names and materials.

use super::topology::Topology;
use super::{ExportError, FormatType, ImportError};
use ahash::AHashMap;
use itertools::Itertools;
use std::io::Write;
use std::path::Path;
use vhelix_design::ultraviolet::Vec3;
use vhelix_design::{
    orientation_from_normal, BaseId, Design, DesignError, HelixId, Materials, Progress,
};

const FORMAT: FormatType = FormatType::Oxdna;

pub struct OxDnaNucl {
    pub position: Vec3,
    /// Direction from the axis of the helix to the base.
    pub tangent: Vec3,
    /// Direction of the axis of the helix, oriented towards the 3' end of the strand.
    pub normal: Vec3,
}

impl OxDnaNucl {
    fn new(design: &Design, id: BaseId) -> Option<Self> {
        let base = design.base(id)?;
        let helix = design.helix(base.helix())?;
        let local = base.translation();

        let radial = Vec3::new(local.x, local.y, 0.);
        let tangent = if radial.mag_sq() > 0. {
            helix.rotate_point(radial.normalized())
        } else {
            Vec3::zero()
        };

        let on_same_helix = |other: Option<BaseId>| {
            other
                .and_then(|b| design.base(b))
                .filter(|b| b.helix() == base.helix())
                .map(|b| b.translation().z)
        };
        let dz = if let Some(z) = on_same_helix(design.forward(id)) {
            z - local.z
        } else if let Some(z) = on_same_helix(design.backward(id)) {
            local.z - z
        } else {
            1.
        };
        let normal = if dz < 0. { -helix.axis() } else { helix.axis() };

        Some(Self {
            position: helix.to_world(local),
            tangent,
            normal,
        })
    }
}

pub struct OxDnaConfig {
    boundaries: [f32; 3],
    nucls: Vec<OxDnaNucl>,
}

impl OxDnaConfig {
    pub fn nucls(&self) -> &[OxDnaNucl] {
        &self.nucls
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<(), std::io::Error> {
        writeln!(out, "t = 0")?;
        writeln!(
            out,
            "b = {} {} {}",
            self.boundaries[0], self.boundaries[1], self.boundaries[2]
        )?;
        writeln!(out, "E = 0. 0. 0.")?;
        for n in self.nucls.iter() {
            writeln!(
                out,
                "{} {} {} {} {} {} {} {} {} 0.0 0.0 0.0 0.0 0.0 0.0",
                n.position.x,
                n.position.y,
                n.position.z,
                n.tangent.x,
                n.tangent.y,
                n.tangent.z,
                n.normal.x,
                n.normal.y,
                n.normal.z,
            )?;
        }
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write(&mut file)?;
        file.flush()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlueHelix {
    pub name: String,
    pub position: Vec3,
    pub normal: Vec3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlueBase {
    /// Index of the base in the topology.
    pub index: usize,
    pub name: String,
    pub helix: String,
    pub material: Option<String>,
}

/// The content of a glue file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Glue {
    pub helices: Vec<GlueHelix>,
    pub bases: Vec<GlueBase>,
}

const NO_MATERIAL: &str = "-";

impl Glue {
    pub fn write<W: Write>(&self, out: &mut W) -> Result<(), std::io::Error> {
        writeln!(out, "# vHelix oxDNA glue file")?;
        writeln!(
            out,
            "# Generated on {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(out)?;
        for h in self.helices.iter() {
            writeln!(
                out,
                "helix {} {} {} {} {} {} {}",
                h.name, h.position.x, h.position.y, h.position.z, h.normal.x, h.normal.y, h.normal.z
            )?;
        }
        writeln!(out)?;
        for b in self.bases.iter() {
            writeln!(
                out,
                "base {} {} {} {}",
                b.index,
                b.name,
                b.helix,
                b.material.as_deref().unwrap_or(NO_MATERIAL)
            )?;
        }
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write(&mut file)?;
        file.flush()
    }

    pub fn parse(input: &str) -> Result<Self, ImportError> {
        let mut ret = Self::default();
        for (line, l) in input.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
            if l.is_empty() || l.starts_with('#') {
                continue;
            }
            let parse_error = |details: String| ImportError::Parse {
                format: FORMAT,
                line,
                details,
            };
            let tokens: Vec<&str> = l.split_whitespace().collect();
            match tokens[0] {
                "helix" if tokens.len() == 8 => {
                    let floats = parse_floats(&tokens[2..8]).map_err(parse_error)?;
                    ret.helices.push(GlueHelix {
                        name: tokens[1].to_string(),
                        position: Vec3::new(floats[0], floats[1], floats[2]),
                        normal: Vec3::new(floats[3], floats[4], floats[5]),
                    });
                }
                "base" if tokens.len() == 5 => {
                    let index = tokens[1]
                        .parse()
                        .map_err(|e| parse_error(format!("invalid base index: {}", e)))?;
                    ret.bases.push(GlueBase {
                        index,
                        name: tokens[2].to_string(),
                        helix: tokens[3].to_string(),
                        material: Some(tokens[4])
                            .filter(|m| *m != NO_MATERIAL)
                            .map(str::to_string),
                    });
                }
                "helix" | "base" => {
                    return Err(parse_error(format!(
                        "wrong number of fields for {}",
                        tokens[0]
                    )))
                }
                other => return Err(parse_error(format!("unknown record {:?}", other))),
            }
        }
        Ok(ret)
    }

    /// The glue of a design that was not created by vHelix: one helix along the Z axis per
    /// strand and generated base names.
    fn generate(topology: &Topology) -> Self {
        let helices = (1..=topology.nb_strands())
            .map(|k| GlueHelix {
                name: format!("strand_{}", k),
                position: Vec3::zero(),
                normal: Vec3::unit_z(),
            })
            .collect();
        let bases = topology
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| GlueBase {
                index,
                name: format!("base_{}", index),
                helix: format!("strand_{}", entry.strand),
                material: None,
            })
            .collect();
        Self { helices, bases }
    }
}

fn parse_floats(tokens: &[&str]) -> Result<Vec<f32>, String> {
    tokens
        .iter()
        .map(|t| t.parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number: {}", e))
}

/// Convert a design to oxDNA. All the bases must have a label.
pub fn to_oxdna(
    design: &Design,
    progress: &mut dyn Progress,
) -> Result<(OxDnaConfig, Topology, Glue), ExportError> {
    let topology = Topology::from_design(design, true)?;
    progress.begin(topology.nb_bases());
    let mut boundaries = [0f32; 3];
    let mut nucls = Vec::with_capacity(topology.nb_bases());
    let mut glue = Glue::default();
    for (index, id) in topology.bases().iter().enumerate() {
        let base = design.base(*id).ok_or(DesignError::InvalidBase(*id))?;
        let helix = design
            .helix(base.helix())
            .ok_or_else(|| DesignError::InvalidHelix(base.helix()))?;
        let nucl = OxDnaNucl::new(design, *id).ok_or(DesignError::InvalidBase(*id))?;
        boundaries[0] = boundaries[0].max(4. * nucl.position.x.abs());
        boundaries[1] = boundaries[1].max(4. * nucl.position.y.abs());
        boundaries[2] = boundaries[2].max(4. * nucl.position.z.abs());
        nucls.push(nucl);
        glue.bases.push(GlueBase {
            index,
            name: base.name().to_string(),
            helix: helix.name().to_string(),
            material: base.material().map(|m| m.name().to_string()),
        });
        progress.step();
    }
    glue.helices = design
        .helices()
        .map(|(_, h)| GlueHelix {
            name: h.name().to_string(),
            position: h.position,
            normal: h.axis(),
        })
        .collect();
    log::info!(
        "oxDNA export: {} bases in {} strands",
        topology.nb_bases(),
        topology.nb_strands()
    );
    progress.done();
    Ok((OxDnaConfig { boundaries, nucls }, topology, glue))
}

/// Read the positions of a configuration file.
fn parse_configuration(input: &str) -> Result<Vec<Vec3>, ImportError> {
    let mut ret = Vec::new();
    for (line, l) in input.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
        let tokens: Vec<&str> = l.split_whitespace().collect();
        match tokens.first() {
            None | Some(&"t") | Some(&"b") | Some(&"E") => continue,
            _ => (),
        }
        if tokens.len() < 3 {
            return Err(ImportError::Parse {
                format: FORMAT,
                line,
                details: "expected a position".to_string(),
            });
        }
        let floats = parse_floats(&tokens[0..3]).map_err(|details| ImportError::Parse {
            format: FORMAT,
            line,
            details,
        })?;
        ret.push(Vec3::new(floats[0], floats[1], floats[2]));
    }
    Ok(ret)
}

/// Build a design from the content of oxDNA topology and configuration files and of an
/// optional glue file.
///
/// Base orientations are not read, they are derived from the helices.
pub fn from_oxdna(
    topology: &str,
    configuration: &str,
    glue: Option<&str>,
    materials: &Materials,
    progress: &mut dyn Progress,
) -> Result<Design, ImportError> {
    let topology = Topology::parse(topology, FORMAT)?;
    let positions = parse_configuration(configuration)?;
    if positions.len() != topology.nb_bases() {
        return Err(ImportError::Malformed {
            format: FORMAT,
            details: format!(
                "the topology has {} bases but the configuration has {}",
                topology.nb_bases(),
                positions.len()
            ),
        });
    }
    let glue = match glue {
        Some(glue) => Glue::parse(glue)?,
        None => Glue::generate(&topology),
    };
    let reference = |details: String| ImportError::Reference {
        format: FORMAT,
        details,
    };

    let mut glue_bases: Vec<Option<&GlueBase>> = vec![None; topology.nb_bases()];
    for b in glue.bases.iter() {
        let slot = glue_bases
            .get_mut(b.index)
            .ok_or_else(|| reference(format!("glue file names base {}", b.index)))?;
        if slot.replace(b).is_some() {
            return Err(ImportError::Malformed {
                format: FORMAT,
                details: format!("base {} is named twice", b.index),
            });
        }
    }

    let mut design = Design::new();
    let mut helices: AHashMap<&str, HelixId> = AHashMap::new();
    for h in glue.helices.iter() {
        let id = design.create_helix(h.name.clone(), h.position, orientation_from_normal(h.normal))?;
        helices.insert(h.name.as_str(), id);
    }

    let mut ids = Vec::with_capacity(topology.nb_bases());
    progress.begin(topology.nb_bases());
    for (i, (entry, glue_base)) in topology.entries().iter().zip(glue_bases).enumerate() {
        let glue_base =
            glue_base.ok_or_else(|| reference(format!("base {} is not in the glue file", i)))?;
        let helix = *helices
            .get(glue_base.helix.as_str())
            .ok_or_else(|| reference(format!("there is no helix {}", glue_base.helix)))?;
        let local = design
            .helix(helix)
            .map(|h| h.to_local(positions[i]))
            .unwrap_or(positions[i]);
        let id = design.create_base(glue_base.name.clone(), helix, local)?;
        design.set_label(id, entry.label)?;
        if let Some(material) = glue_base.material.as_ref() {
            design.set_material(id, materials.resolve(material))?;
        }
        ids.push(id);
        progress.step();
    }
    log::info!(
        "created {} helices and {} bases",
        design.nb_helices(),
        design.nb_bases()
    );

    for (i, entry) in topology.entries().iter().enumerate() {
        if entry.next >= 0 {
            design.connect_forward(ids[i], ids[entry.next as usize], false)?;
        }
    }
    for id in helices.values().sorted() {
        design.fit_cylinder_range(*id)?;
    }
    progress.done();
    Ok(design)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhelix_design::ultraviolet::Rotor3;
    use vhelix_design::{Label, Material, NoProgress};

    fn h1() -> Design {
        let mut design = Design::new();
        let h = design
            .create_helix_with_bases("h1", Vec3::new(1., 2., 0.), Rotor3::identity(), 4)
            .unwrap();
        let forward = design.helix(h).unwrap().ladder().unwrap().forward.clone();
        for (b, l) in forward.iter().zip([Label::A, Label::T, Label::G, Label::C]) {
            design.set_label(*b, l).unwrap();
        }
        design
    }

    fn to_strings(design: &Design) -> (String, String, String) {
        let (config, topology, glue) = to_oxdna(design, &mut NoProgress).unwrap();
        let mut c = Vec::new();
        let mut t = Vec::new();
        let mut g = Vec::new();
        config.write(&mut c).unwrap();
        topology.write(&mut t).unwrap();
        glue.write(&mut g).unwrap();
        (
            String::from_utf8(c).unwrap(),
            String::from_utf8(t).unwrap(),
            String::from_utf8(g).unwrap(),
        )
    }

    #[test]
    fn four_base_pairs() {
        let design = h1();
        let (_, topology, _) = to_oxdna(&design, &mut NoProgress).unwrap();
        assert_eq!(topology.nb_bases(), 8);
        assert_eq!(topology.nb_strands(), 2);
        let entries = topology.entries();
        let labels: String = entries.iter().map(|e| e.label.to_char()).collect();
        assert_eq!(labels, "ATGCGCAT");
        let strands: Vec<usize> = entries.iter().map(|e| e.strand).collect();
        assert_eq!(strands, vec![1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!((entries[0].next, entries[0].prev), (1, -1));
        assert_eq!((entries[3].next, entries[3].prev), (-1, 2));
        assert_eq!((entries[4].next, entries[4].prev), (5, -1));
        assert_eq!((entries[7].next, entries[7].prev), (-1, 6));
    }

    #[test]
    fn configuration_file() {
        let (config, _, glue) = to_strings(&h1());
        let lines: Vec<&str> = config.lines().collect();
        assert_eq!(lines.len(), 3 + 8);
        assert_eq!(lines[0], "t = 0");
        assert!(lines[1].starts_with("b = "));
        assert_eq!(lines[2], "E = 0. 0. 0.");
        for l in lines[3..].iter() {
            assert_eq!(l.split_whitespace().count(), 15);
            assert!(l.ends_with(" 0.0 0.0 0.0 0.0 0.0 0.0"));
        }
        assert!(glue.starts_with("# vHelix oxDNA glue file\n# Generated on "));
        assert!(glue.contains("\nhelix h1 1 2 0 "));
        assert!(glue.contains("\nbase 0 h1_f0 h1 -\n"));
    }

    #[test]
    fn normals_follow_the_strands() {
        let design = h1();
        let (config, _, _) = to_oxdna(&design, &mut NoProgress).unwrap();
        let nucls = config.nucls();
        assert!((nucls[0].normal - Vec3::unit_z()).mag() < 1e-5);
        assert!((nucls[4].normal + Vec3::unit_z()).mag() < 1e-5);
        for n in nucls {
            assert!(n.tangent.z.abs() < 1e-5);
            assert!((n.tangent.mag() - 1.).abs() < 1e-5);
        }
    }

    #[test]
    fn unlabeled_bases_cannot_be_exported() {
        let mut design = Design::new();
        design
            .create_helix_with_bases("h", Vec3::zero(), Rotor3::identity(), 2)
            .unwrap();
        assert!(matches!(
            to_oxdna(&design, &mut NoProgress),
            Err(ExportError::MissingLabel { .. })
        ));
    }

    #[test]
    fn round_trip() {
        let mut design = h1();
        let f0 = design.base_by_name("h1_f0").unwrap();
        design
            .set_material(f0, Some(Material::new("DNABaseMaterial2")))
            .unwrap();
        let (config, topology, glue) = to_strings(&design);
        let imported = from_oxdna(
            &topology,
            &config,
            Some(&glue),
            &Materials::default(),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(imported.nb_bases(), 8);
        assert_eq!(imported.nb_helices(), 1);
        for name in ["h1_f0", "h1_b3"] {
            let original: Vec<_> = design
                .strand(design.base_by_name(name).unwrap())
                .forward()
                .map(|b| (design.base(b).unwrap().name().to_string(), design.label(b)))
                .collect();
            let copy: Vec<_> = imported
                .strand(imported.base_by_name(name).unwrap())
                .forward()
                .map(|b| (imported.base(b).unwrap().name().to_string(), imported.label(b)))
                .collect();
            assert_eq!(original, copy);
        }
        let f0_copy = imported.base_by_name("h1_f0").unwrap();
        assert_eq!(
            imported.base(f0_copy).unwrap().material(),
            Some(&Material::new("DNABaseMaterial2"))
        );
        let original = design.base_world_position(f0).unwrap();
        let copy = imported.base_world_position(f0_copy).unwrap();
        assert!((original - copy).mag() < 1e-4);
    }

    #[test]
    fn import_without_glue() {
        let (config, topology, _) = to_strings(&h1());
        let imported = from_oxdna(
            &topology,
            &config,
            None,
            &Materials::default(),
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(imported.nb_helices(), 2);
        assert!(imported.helix_by_name("strand_2").is_some());
        let b4 = imported.base_by_name("base_4").unwrap();
        assert_eq!(imported.strand(b4).len(), 4);
        assert_eq!(imported.label(b4), Some(Label::G));
    }

    #[test]
    fn unknown_materials_fall_back() {
        let (config, topology, glue) = to_strings(&h1());
        let glue = glue.replace("base 0 h1_f0 h1 -", "base 0 h1_f0 h1 Gold");
        let imported = from_oxdna(
            &topology,
            &config,
            Some(&glue),
            &Materials::default(),
            &mut NoProgress,
        )
        .unwrap();
        let f0 = imported.base_by_name("h1_f0").unwrap();
        assert_eq!(
            imported.base(f0).unwrap().material(),
            Some(&Material::new("DNABaseMaterial1"))
        );
    }

    #[test]
    fn glue_must_name_every_base() {
        let (config, topology, glue) = to_strings(&h1());
        let glue: String = glue
            .lines()
            .filter(|l| !l.starts_with("base 7 "))
            .map(|l| format!("{}\n", l))
            .collect();
        assert!(matches!(
            from_oxdna(
                &topology,
                &config,
                Some(&glue),
                &Materials::default(),
                &mut NoProgress
            ),
            Err(ImportError::Reference { .. })
        ));
        assert!(matches!(
            from_oxdna(
                &topology,
                "t = 0\n1 2 3\n",
                None,
                &Materials::default(),
                &mut NoProgress
            ),
            Err(ImportError::Malformed { .. })
        ));
    }
}
