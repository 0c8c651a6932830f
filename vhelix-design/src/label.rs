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
use std::fmt;
use std::str::FromStr;

/// The nucleobase carried by a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    A,
    T,
    G,
    C,
    /// No nucleobase was assigned.
    Invalid,
}

impl Default for Label {
    fn default() -> Self {
        Self::Invalid
    }
}

impl Label {
    /// The Watson–Crick complement of `self`. All the label reads and writes that go through an
    /// opposite pairing use this table.
    pub fn complement(self) -> Self {
        match self {
            Self::A => Self::T,
            Self::T => Self::A,
            Self::G => Self::C,
            Self::C => Self::G,
            Self::Invalid => Self::Invalid,
        }
    }

    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }

    pub fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'A' => Self::A,
            'T' => Self::T,
            'G' => Self::G,
            'C' => Self::C,
            _ => Self::Invalid,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::T => 'T',
            Self::G => 'G',
            Self::C => 'C',
            Self::Invalid => 'N',
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid label {0:?}, expected one of A, T, G, C or N")]
pub struct ParseLabelError(pub String);

impl FromStr for Label {
    type Err = ParseLabelError;

    /// Accept a single nucleobase letter in either case. `N`, `?` and `-` denote an unassigned
    /// label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => match c.to_ascii_uppercase() {
                'N' | '?' | '-' => Ok(Self::Invalid),
                c => Some(Self::from_char(c))
                    .filter(|l| l.is_valid())
                    .ok_or_else(|| ParseLabelError(s.to_string())),
            },
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}
