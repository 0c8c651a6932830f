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
//! The vHelix text format.
//!
//! Each line holds one command:
//!
//! * `h <name> <x> <y> <z> <qx> <qy> <qz> <qw>`: an empty helix at a position with an orientation
//! given as a quaternion.
//! * `hb <name> <number of base pairs> <x> <y> <z> <qx> <qy> <qz> <qw>`: a double helix.
//! * `b <name> <helix> <x> <y> <z> <material> <label>`: a base, positioned in the frame of its
//! helix. The material can be `-`.
//! * `c <helix> <endpoint> <helix> <endpoint>`: make the second endpoint the forward neighbour of
//! the first one. An endpoint is `f5'`, `f3'`, `b5'`, `b3'` or the name of a base.
//! * `l <base> <label>`: set the label of a base.
//! * `ps <helix> <endpoint>`: paint the strand of an endpoint.
//! * `autonick` or `autostaple`: nick the strands once the design is built.
//!
//! Empty lines and lines starting with `#` are ignored. Commands may reference helices and bases
//! declared later in the file.

use super::{FormatType, ImportError, Imported, ReaderOptions};
use vhelix_design::design_operations::auto_nick;
use vhelix_design::ultraviolet::{Bivec3, Rotor3, Vec3};
use vhelix_design::{BaseId, Design, Endpoint, Label, Progress};

const FORMAT: FormatType = FormatType::Text;

/// The longest helix that a `hb` command may declare.
pub const MAX_BASE_PAIRS: usize = 1 << 20;

struct HelixRecord {
    line: usize,
    name: String,
    nb_base_pairs: Option<usize>,
    position: Vec3,
    orientation: Rotor3,
}

struct BaseRecord {
    line: usize,
    name: String,
    helix: String,
    position: Vec3,
    material: Option<String>,
    label: Label,
}

struct EndpointRecord {
    line: usize,
    helix: String,
    endpoint: String,
}

struct LabelRecord {
    line: usize,
    base: String,
    label: Label,
}

#[derive(Default)]
struct TextFile {
    helices: Vec<HelixRecord>,
    bases: Vec<BaseRecord>,
    connections: Vec<(EndpointRecord, EndpointRecord)>,
    labels: Vec<LabelRecord>,
    paints: Vec<EndpointRecord>,
    autonick: bool,
}

fn parse_error(line: usize, details: String) -> ImportError {
    ImportError::Parse {
        format: FORMAT,
        line,
        details,
    }
}

fn reference_error(line: usize, details: String) -> ImportError {
    ImportError::Reference {
        format: FORMAT,
        details: format!("line {}: {}", line, details),
    }
}

fn parse_vec3(line: usize, tokens: &[&str]) -> Result<Vec3, ImportError> {
    let mut coords = [0f32; 3];
    for (c, t) in coords.iter_mut().zip(tokens) {
        *c = t
            .parse()
            .map_err(|_| parse_error(line, format!("{:?} is not a number", t)))?;
    }
    Ok(Vec3::new(coords[0], coords[1], coords[2]))
}

/// Convert a `[x, y, z, w]` quaternion to a rotor.
fn parse_orientation(line: usize, tokens: &[&str]) -> Result<Rotor3, ImportError> {
    let mut quat = [0f32; 4];
    for (c, t) in quat.iter_mut().zip(tokens) {
        *c = t
            .parse()
            .map_err(|_| parse_error(line, format!("{:?} is not a number", t)))?;
    }
    let rotor = Rotor3::new(quat[3], Bivec3::new(-quat[2], quat[1], -quat[0]));
    let norm = rotor.mag();
    if norm.is_finite() && norm > 0. {
        Ok(rotor.normalized())
    } else {
        Err(parse_error(line, "null quaternion".to_string()))
    }
}

fn parse_label(line: usize, token: &str) -> Result<Label, ImportError> {
    token.parse().map_err(|e| parse_error(line, format!("{}", e)))
}

impl TextFile {
    fn parse(input: &str) -> Result<Self, ImportError> {
        let mut ret = Self::default();
        for (line, l) in input.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
            if l.is_empty() || l.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = l.split_whitespace().collect();
            let expect = |n: usize| {
                if tokens.len() == n {
                    Ok(())
                } else {
                    Err(parse_error(
                        line,
                        format!(
                            "{} expects {} arguments, got {}",
                            tokens[0],
                            n - 1,
                            tokens.len() - 1
                        ),
                    ))
                }
            };
            match tokens[0] {
                "h" => {
                    expect(9)?;
                    ret.helices.push(HelixRecord {
                        line,
                        name: tokens[1].to_string(),
                        nb_base_pairs: None,
                        position: parse_vec3(line, &tokens[2..5])?,
                        orientation: parse_orientation(line, &tokens[5..9])?,
                    });
                }
                "hb" => {
                    expect(10)?;
                    let nb_base_pairs: usize = tokens[2].parse().map_err(|_| {
                        parse_error(line, format!("{:?} is not a number of bases", tokens[2]))
                    })?;
                    if nb_base_pairs > MAX_BASE_PAIRS {
                        return Err(parse_error(
                            line,
                            format!(
                                "{} base pairs is more than the {} allowed",
                                nb_base_pairs, MAX_BASE_PAIRS
                            ),
                        ));
                    }
                    ret.helices.push(HelixRecord {
                        line,
                        name: tokens[1].to_string(),
                        nb_base_pairs: Some(nb_base_pairs),
                        position: parse_vec3(line, &tokens[3..6])?,
                        orientation: parse_orientation(line, &tokens[6..10])?,
                    });
                }
                "b" => {
                    expect(8)?;
                    ret.bases.push(BaseRecord {
                        line,
                        name: tokens[1].to_string(),
                        helix: tokens[2].to_string(),
                        position: parse_vec3(line, &tokens[3..6])?,
                        material: Some(tokens[6])
                            .filter(|m| *m != "-")
                            .map(str::to_string),
                        label: parse_label(line, tokens[7])?,
                    });
                }
                "c" => {
                    expect(5)?;
                    ret.connections.push((
                        EndpointRecord {
                            line,
                            helix: tokens[1].to_string(),
                            endpoint: tokens[2].to_string(),
                        },
                        EndpointRecord {
                            line,
                            helix: tokens[3].to_string(),
                            endpoint: tokens[4].to_string(),
                        },
                    ));
                }
                "l" => {
                    expect(3)?;
                    ret.labels.push(LabelRecord {
                        line,
                        base: tokens[1].to_string(),
                        label: parse_label(line, tokens[2])?,
                    });
                }
                "ps" => {
                    expect(3)?;
                    ret.paints.push(EndpointRecord {
                        line,
                        helix: tokens[1].to_string(),
                        endpoint: tokens[2].to_string(),
                    });
                }
                "autonick" | "autostaple" => {
                    expect(1)?;
                    ret.autonick = true;
                }
                other => return Err(parse_error(line, format!("unknown command {:?}", other))),
            }
        }
        Ok(ret)
    }

    fn build(
        self,
        options: &ReaderOptions,
        progress: &mut dyn Progress,
    ) -> Result<Imported, ImportError> {
        let mut design = Design::new();
        progress.begin(self.helices.len() + self.bases.len() + self.connections.len());
        for h in self.helices.iter() {
            let created = if let Some(n) = h.nb_base_pairs {
                design.create_helix_with_bases(h.name.clone(), h.position, h.orientation, n)
            } else {
                design.create_helix(h.name.clone(), h.position, h.orientation)
            };
            created.map_err(|e| reference_error(h.line, e.to_string()))?;
            progress.step();
        }
        log::info!("created {} helices", design.nb_helices());

        let mut filled = Vec::new();
        for b in self.bases.iter() {
            let helix = design
                .resolve_helix(&b.helix)
                .map_err(|e| reference_error(b.line, e.to_string()))?;
            let id = design
                .create_base(b.name.clone(), helix, b.position)
                .map_err(|e| reference_error(b.line, e.to_string()))?;
            design.set_label(id, b.label)?;
            if let Some(material) = b.material.as_ref() {
                design.set_material(id, options.materials.resolve(material))?;
            }
            if !filled.contains(&helix) {
                filled.push(helix);
            }
            progress.step();
        }
        for helix in filled {
            if design.helix(helix).and_then(|h| h.ladder()).is_none() {
                design.fit_cylinder_range(helix)?;
            }
        }
        log::info!("created {} bases", design.nb_bases());

        for (from, to) in self.connections.iter() {
            let from = resolve_endpoint(&design, from)?;
            let to = resolve_endpoint(&design, to)?;
            design.connect_forward(from, to, false)?;
            progress.step();
        }
        log::info!("made {} connections", self.connections.len());

        for l in self.labels.iter() {
            let base = design
                .resolve_base(&l.base)
                .map_err(|e| reference_error(l.line, e.to_string()))?;
            design.set_label(base, l.label)?;
        }

        let mut painted = self
            .paints
            .iter()
            .map(|p| resolve_endpoint(&design, p))
            .collect::<Result<Vec<_>, _>>()?;

        if options.autonick.unwrap_or(self.autonick) {
            let report = auto_nick(&mut design, &options.nicking)?;
            painted.extend(report.painted);
        }
        progress.done();
        Ok(Imported { design, painted })
    }
}

fn resolve_endpoint(design: &Design, record: &EndpointRecord) -> Result<BaseId, ImportError> {
    if let Ok(endpoint) = record.endpoint.parse::<Endpoint>() {
        let helix = design
            .resolve_helix(&record.helix)
            .map_err(|e| reference_error(record.line, e.to_string()))?;
        design
            .helix(helix)
            .and_then(|h| h.ladder())
            .and_then(|l| l.endpoint(endpoint))
            .ok_or_else(|| {
                reference_error(
                    record.line,
                    format!("helix {} has no {} end", record.helix, record.endpoint),
                )
            })
    } else {
        let base = design
            .resolve_base(&record.endpoint)
            .map_err(|e| reference_error(record.line, e.to_string()))?;
        let helix = design
            .base(base)
            .and_then(|b| design.helix(b.helix()))
            .map(|h| h.name());
        if helix != Some(record.helix.as_str()) {
            log::warn!(
                "line {}: base {} is not on helix {}",
                record.line,
                record.endpoint,
                record.helix
            );
        }
        Ok(base)
    }
}

/// Build a design from a text file.
pub fn read_text(
    input: &str,
    options: &ReaderOptions,
    progress: &mut dyn Progress,
) -> Result<Imported, ImportError> {
    TextFile::parse(input)?.build(options, progress)
}
