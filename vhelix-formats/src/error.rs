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
use super::FormatType;
use vhelix_design::DesignError;

/// An error that occured while reading a design from a file.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{format} file, line {line}: {details}")]
    Parse {
        format: FormatType,
        line: usize,
        details: String,
    },
    #[error("malformed {format} file: {details}")]
    Malformed { format: FormatType, details: String },
    #[error("{format} file references something that does not exist: {details}")]
    Reference { format: FormatType, details: String },
    #[error("invalid reader options: {0}")]
    Options(#[from] super::options::ParseOptionsError),
    #[error("designs cannot be imported from {0} files")]
    Unsupported(FormatType),
    #[error(transparent)]
    Design(#[from] DesignError),
}

/// An error that occured while writing a design to a file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize design: {0}")]
    Json(#[from] serde_json::Error),
    #[error("base {base} has no label")]
    MissingLabel { base: String },
    #[error("base {base} is not on a lattice")]
    NotOnLattice { base: String },
    #[error("the design cannot be represented: {details}")]
    Unrepresentable { details: String },
    #[error("helices are placed on different lattices")]
    MixedLattices,
    #[error("designs cannot be exported to {0} files")]
    Unsupported(FormatType),
    #[error(transparent)]
    Design(#[from] DesignError),
}
