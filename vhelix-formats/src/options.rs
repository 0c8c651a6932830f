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
//! Options given to the readers as a `key=value;key=value` string.

use std::str::FromStr;
use vhelix_design::design_operations::NickingParameters;
use vhelix_design::Materials;

/// An error that occured when parsing reader options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseOptionsError {
    #[error("expected key=value, got {0:?}")]
    NotAKeyValue(String),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Options of the readers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReaderOptions {
    pub nicking: NickingParameters,
    /// Force auto-nicking on or off. When `None`, the text format nicks strands if it contains
    /// an `autonick` command and the other formats never do.
    pub autonick: Option<bool>,
    pub materials: Materials,
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ParseOptionsError> {
    value.parse().map_err(|_| ParseOptionsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl FromStr for ReaderOptions {
    type Err = ParseOptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ret = Self::default();
        for token in s.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| ParseOptionsError::NotAKeyValue(token.to_string()))?;
            let (key, value) = (key.trim(), value.trim());
            match key {
                "nicking_min_length" => ret.nicking.min_length = parse_value(key, value)?,
                "nicking_max_length" => ret.nicking.max_length = parse_value(key, value)?,
                "autonick" => ret.autonick = Some(parse_value(key, value)?),
                _ => log::warn!("ignoring unknown reader option {}", key),
            }
        }
        Ok(ret)
    }
}
