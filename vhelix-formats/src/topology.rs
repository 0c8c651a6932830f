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
//! Topology tables, listing the bases of a design strand by strand.
//!
//! This is both the oxDNA topology file and the strand table export. The table starts with a
//! `<number of bases> <number of strands>` line. Then each strand is introduced by a `#` comment
//! followed by one `<strand number> <label> <next> <previous>` line per base, where `next` and
//! `previous` are global base indices. The ends of linear strands have `-1` as neighbour, the
//! first and last bases of circular strands refer to each other.

use super::{ExportError, FormatType, ImportError};
use std::io::Write;
use std::path::Path;
use vhelix_design::{BaseId, Design, Label};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyEntry {
    /// 1-based index of the strand.
    pub strand: usize,
    pub label: Label,
    pub next: isize,
    pub prev: isize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StrandHeader {
    name: Option<String>,
    circular: bool,
}

/// A topology table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    entries: Vec<TopologyEntry>,
    strands: Vec<StrandHeader>,
    /// The base described by each entry, empty if the table was parsed from a file.
    bases: Vec<BaseId>,
}

impl Topology {
    /// Build the topology of `design`. If `require_labels` is true, bases without a label are
    /// refused.
    pub fn from_design(design: &Design, require_labels: bool) -> Result<Self, ExportError> {
        let mut ret = Self {
            entries: Vec::with_capacity(design.nb_bases()),
            strands: Vec::new(),
            bases: Vec::with_capacity(design.nb_bases()),
        };
        for strand in design.strands() {
            let mut iter = strand.forward();
            let bases: Vec<BaseId> = iter.by_ref().collect();
            let circular = iter.is_loop();
            let first = ret.entries.len() as isize;
            let last = first + bases.len() as isize - 1;
            let strand_number = ret.strands.len() + 1;
            for (i, base) in bases.iter().enumerate() {
                let label = design.label(*base).unwrap_or_default();
                if require_labels && !label.is_valid() {
                    return Err(ExportError::MissingLabel {
                        base: base_name(design, *base),
                    });
                }
                let index = first + i as isize;
                let next = if index < last {
                    index + 1
                } else if circular {
                    first
                } else {
                    -1
                };
                let prev = if index > first {
                    index - 1
                } else if circular {
                    last
                } else {
                    -1
                };
                ret.entries.push(TopologyEntry {
                    strand: strand_number,
                    label,
                    next,
                    prev,
                });
                ret.bases.push(*base);
            }
            ret.strands.push(StrandHeader {
                name: Some(base_name(design, strand.defining_base())),
                circular,
            });
        }
        Ok(ret)
    }

    pub fn nb_bases(&self) -> usize {
        self.entries.len()
    }

    pub fn nb_strands(&self) -> usize {
        self.strands.len()
    }

    pub fn entries(&self) -> &[TopologyEntry] {
        &self.entries
    }

    /// The bases in the order of the table.
    pub fn bases(&self) -> &[BaseId] {
        &self.bases
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<(), std::io::Error> {
        writeln!(out, "{} {}", self.nb_bases(), self.nb_strands())?;
        let mut current_strand = 0;
        for entry in self.entries.iter() {
            if entry.strand != current_strand {
                current_strand = entry.strand;
                if let Some(header) = self.strands.get(current_strand - 1) {
                    write!(out, "# strand {}", current_strand)?;
                    if let Some(name) = header.name.as_ref() {
                        write!(out, ": {}", name)?;
                    }
                    if header.circular {
                        write!(out, " (circular)")?;
                    }
                    writeln!(out)?;
                }
            }
            writeln!(
                out,
                "{} {} {} {}",
                entry.strand,
                entry.label.to_char(),
                entry.next,
                entry.prev
            )?;
        }
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write(&mut file)?;
        file.flush()
    }

    /// Parse a topology table and check that its neighbour indices are consistent.
    pub fn parse(input: &str, format: FormatType) -> Result<Self, ImportError> {
        let parse_error = |line: usize, details: String| ImportError::Parse {
            format,
            line,
            details,
        };
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        let (header_line, header) = lines
            .next()
            .ok_or_else(|| parse_error(0, "empty topology".to_string()))?;
        let counts: Vec<usize> = header
            .split_whitespace()
            .map(|t| t.parse())
            .collect::<Result<_, _>>()
            .map_err(|e| parse_error(header_line, format!("invalid header: {}", e)))?;
        if counts.len() != 2 {
            return Err(parse_error(
                header_line,
                "expected <number of bases> <number of strands>".to_string(),
            ));
        }
        let (nb_bases, nb_strands) = (counts[0], counts[1]);
        if nb_strands > nb_bases || (nb_strands == 0) != (nb_bases == 0) {
            return Err(ImportError::Malformed {
                format,
                details: format!("{} bases cannot form {} strands", nb_bases, nb_strands),
            });
        }

        let mut entries = Vec::new();
        for (line, l) in lines {
            let tokens: Vec<&str> = l.split_whitespace().collect();
            if tokens.len() != 4 {
                return Err(parse_error(
                    line,
                    format!("expected 4 fields, got {}", tokens.len()),
                ));
            }
            let strand = tokens[0]
                .parse()
                .map_err(|e| parse_error(line, format!("invalid strand number: {}", e)))?;
            let label = tokens[1]
                .parse::<Label>()
                .map_err(|e| parse_error(line, e.to_string()))?;
            let next = tokens[2]
                .parse()
                .map_err(|e| parse_error(line, format!("invalid neighbour: {}", e)))?;
            let prev = tokens[3]
                .parse()
                .map_err(|e| parse_error(line, format!("invalid neighbour: {}", e)))?;
            entries.push(TopologyEntry {
                strand,
                label,
                next,
                prev,
            });
        }
        if entries.len() != nb_bases {
            return Err(ImportError::Malformed {
                format,
                details: format!(
                    "header announces {} bases, found {}",
                    nb_bases,
                    entries.len()
                ),
            });
        }
        check_neighbours(&entries, format)?;

        // A strand is circular if none of its bases has a missing neighbour
        let mut strands = vec![
            StrandHeader {
                name: None,
                circular: true
            };
            nb_strands
        ];
        let mut seen = vec![false; nb_strands];
        for entry in entries.iter() {
            if entry.strand == 0 || entry.strand > nb_strands {
                return Err(ImportError::Malformed {
                    format,
                    details: format!(
                        "strand number {} is not in 1..={}",
                        entry.strand, nb_strands
                    ),
                });
            }
            seen[entry.strand - 1] = true;
            if entry.prev < 0 {
                strands[entry.strand - 1].circular = false;
            }
        }
        for (header, seen) in strands.iter_mut().zip(seen) {
            header.circular &= seen;
        }

        Ok(Self {
            entries,
            strands,
            bases: Vec::new(),
        })
    }
}

fn check_neighbours(entries: &[TopologyEntry], format: FormatType) -> Result<(), ImportError> {
    let reference = |details: String| ImportError::Reference { format, details };
    let get = |i: usize, idx: isize| -> Result<Option<&TopologyEntry>, ImportError> {
        if idx < 0 {
            Ok(None)
        } else {
            entries
                .get(idx as usize)
                .map(Some)
                .ok_or_else(|| reference(format!("base {} has neighbour {}", i, idx)))
        }
    };
    for (i, entry) in entries.iter().enumerate() {
        if let Some(next) = get(i, entry.next)? {
            if next.prev != i as isize || next.strand != entry.strand {
                return Err(reference(format!(
                    "base {} is followed by {} which is not preceded by it",
                    i, entry.next
                )));
            }
        }
        if let Some(prev) = get(i, entry.prev)? {
            if prev.next != i as isize {
                return Err(reference(format!(
                    "base {} is preceded by {} which is not followed by it",
                    i, entry.prev
                )));
            }
        }
    }
    Ok(())
}

fn base_name(design: &Design, base: BaseId) -> String {
    design
        .base(base)
        .map(|b| b.name().to_string())
        .unwrap_or_else(|| base.to_string())
}
