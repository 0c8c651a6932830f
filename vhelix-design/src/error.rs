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
use super::{BaseId, HelixId};

/// An error that occured when trying to modify or query a design.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignError {
    #[error("base {0} does not exist")]
    InvalidBase(BaseId),
    #[error("helix {0} does not exist")]
    InvalidHelix(HelixId),
    #[error("the name {0:?} is already used")]
    DuplicateName(String),
    #[error("{0:?} is not a valid name, names must be non empty and contain no whitespace")]
    InvalidName(String),
    #[error("nothing is named {0:?}")]
    UnknownName(String),
}
