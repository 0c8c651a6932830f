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
//! Conversions between vHelix designs and the file formats used in DNA nanotechnologies.

#[macro_use]
extern crate serde_derive;
extern crate serde;

use std::path::{Path, PathBuf};
use strum::{Display, EnumString};
use vhelix_design::{BaseId, Design, DesignError, LogProgress, Materials};

pub mod cadnano;
mod error;
pub use error::{ExportError, ImportError};
mod options;
pub use options::{ParseOptionsError, ReaderOptions};
pub mod oxdna;
pub mod text;
pub mod topology;

/// The file formats that vHelix reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FormatType {
    #[strum(serialize = "cadnano")]
    Cadnano,
    #[strum(serialize = "oxdna")]
    Oxdna,
    #[strum(serialize = "text")]
    Text,
    #[strum(serialize = "strands")]
    StrandTable,
}

impl FormatType {
    /// Guess the format of a file from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Cadnano),
            "conf" | "oxdna" | "dat" => Some(Self::Oxdna),
            "txt" | "rpoly" => Some(Self::Text),
            "strands" => Some(Self::StrandTable),
            _ => None,
        }
    }

    pub fn can_import(&self) -> bool {
        !matches!(self, Self::StrandTable)
    }

    pub fn can_export(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// A value returned by `export` when the export was successful.
///
/// This means that both the format conversion and the write to the output files were successful.
pub enum ExportSuccess {
    Cadnano(PathBuf),
    Oxdna {
        topology: PathBuf,
        configuration: PathBuf,
        glue: PathBuf,
    },
    StrandTable(PathBuf),
}

const SUCCESSFUL_EXPORT_MSG_PREFIX: &str = "Successfully exported to";

impl ExportSuccess {
    /// A message telling that the export operation was successful and giving the paths to which
    /// the export was made.
    pub fn message(&self) -> String {
        match self {
            Self::Cadnano(p) | Self::StrandTable(p) => {
                format!("{SUCCESSFUL_EXPORT_MSG_PREFIX}\n{}", p.to_string_lossy())
            }
            Self::Oxdna {
                topology,
                configuration,
                glue,
            } => format!(
                "{SUCCESSFUL_EXPORT_MSG_PREFIX}\n{}\n{}\n{}",
                configuration.to_string_lossy(),
                topology.to_string_lossy(),
                glue.to_string_lossy()
            ),
        }
    }
}

/// The paths of the three files of an oxDNA export: configuration, topology and glue file.
pub fn oxdna_paths(configuration: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let topology = configuration.with_extension("top");
    let glue = configuration.with_extension("vhelix");
    (configuration.to_path_buf(), topology, glue)
}

/// Write `design` to `path` in the `export_type` format.
pub fn export(
    design: &Design,
    export_type: FormatType,
    path: &Path,
) -> Result<ExportSuccess, ExportError> {
    match export_type {
        FormatType::Cadnano => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut progress = LogProgress::new("cadnano export");
            let cadnano = cadnano::to_cadnano(design, name, &mut progress)?;
            cadnano.write_file(path)?;
            Ok(ExportSuccess::Cadnano(path.to_path_buf()))
        }
        FormatType::Oxdna => {
            let (configuration, topology, glue) = oxdna_paths(path);
            let mut progress = LogProgress::new("oxDNA export");
            let (config, topo, glue_file) = oxdna::to_oxdna(design, &mut progress)?;
            config.write_file(&configuration)?;
            topo.write_file(&topology)?;
            glue_file.write_file(&glue)?;
            Ok(ExportSuccess::Oxdna {
                topology,
                configuration,
                glue,
            })
        }
        FormatType::StrandTable => {
            let table = topology::Topology::from_design(design, false)?;
            table.write_file(path)?;
            Ok(ExportSuccess::StrandTable(path.to_path_buf()))
        }
        FormatType::Text => Err(ExportError::Unsupported(export_type)),
    }
}

/// The result of an import.
pub struct Imported {
    pub design: Design,
    /// One base of each strand that the input asked to paint.
    pub painted: Vec<BaseId>,
}

impl Imported {
    fn unpainted(design: Design) -> Self {
        Self {
            design,
            painted: Vec::new(),
        }
    }

    /// Give each painted strand a material, cycling through `materials`.
    pub fn paint(&mut self, materials: &Materials) -> Result<(), DesignError> {
        let palette: Vec<_> = materials.iter().cloned().collect();
        if palette.is_empty() {
            return Ok(());
        }
        for (i, base) in self.painted.iter().enumerate() {
            let material = palette[i % palette.len()].clone();
            let bases = self.design.strand(*base).bases();
            for b in bases {
                self.design.set_material(b, Some(material.clone()))?;
            }
        }
        Ok(())
    }
}

/// Read a design from `path`, assuming that it is in the `import_type` format.
pub fn import(
    path: &Path,
    import_type: FormatType,
    options: &ReaderOptions,
) -> Result<Imported, ImportError> {
    log::info!("importing {} as {}", path.to_string_lossy(), import_type);
    let mut imported = match import_type {
        FormatType::Cadnano => {
            let cadnano = cadnano::Cadnano::from_file(path)?;
            let mut progress = LogProgress::new("cadnano import");
            Imported::unpainted(cadnano::from_cadnano(&cadnano, &mut progress)?)
        }
        FormatType::Oxdna => {
            let (configuration, topology, glue) = oxdna_paths(path);
            let configuration = std::fs::read_to_string(configuration)?;
            let topology = std::fs::read_to_string(topology)?;
            let glue = if glue.exists() {
                Some(std::fs::read_to_string(glue)?)
            } else {
                log::info!("no glue file, helices and names will be generated");
                None
            };
            let mut progress = LogProgress::new("oxDNA import");
            Imported::unpainted(oxdna::from_oxdna(
                &topology,
                &configuration,
                glue.as_deref(),
                &options.materials,
                &mut progress,
            )?)
        }
        FormatType::Text => {
            let input = std::fs::read_to_string(path)?;
            let mut progress = LogProgress::new("text import");
            return text::read_text(&input, options, &mut progress);
        }
        FormatType::StrandTable => return Err(ImportError::Unsupported(import_type)),
    };
    if options.autonick == Some(true) {
        let report =
            vhelix_design::design_operations::auto_nick(&mut imported.design, &options.nicking)?;
        imported.painted.extend(report.painted);
    }
    Ok(imported)
}

#[cfg(test)]
mod tests;
