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
//! This modules defines operations that can be performed on a design to modify it.
//! The functions that apply these operations take a mutable reference to the design that they
//! are modifying and return a `DesignError` if the operation could not be applied.

use super::{BaseId, Design, DesignError};
use ahash::AHashMap;

/// Parameters of the automatic insertion of nicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NickingParameters {
    /// Helices with more base pairs than this are nicked in their middle.
    pub min_length: usize,
    /// Strands longer than this are cut in pieces of about this length.
    pub max_length: usize,
}

impl NickingParameters {
    pub const DEFAULT: Self = Self {
        min_length: 38,
        max_length: 80,
    };
}

impl Default for NickingParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The result of `auto_nick`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NickReport {
    /// The bases whose backward edge was removed.
    pub nicks: Vec<BaseId>,
    /// One base of each strand created by the nicks. Callers typically give each of these
    /// strands its own material.
    pub painted: Vec<BaseId>,
}

/// Break the strands of the design so that no strand is much longer than
/// `parameters.max_length`.
///
/// Each helix ladder with more than `parameters.min_length` base pairs is nicked in its middle.
/// The middle of shorter ladders are candidates for a second pass that cuts the strands that
/// contain them when these strands are longer than `parameters.max_length`.
pub fn auto_nick(
    design: &mut Design,
    parameters: &NickingParameters,
) -> Result<NickReport, DesignError> {
    let mut report = NickReport::default();
    let mut deferred = Vec::new();

    let ladders: Vec<_> = design
        .helices()
        .filter_map(|(_, h)| h.ladder().cloned())
        .collect();
    for ladder in ladders {
        let n = ladder.len();
        if n <= 1 {
            continue;
        }
        let start = ladder.backward[n - 1];
        let site = design.strand(start).forward().nth(n / 2);
        let site = if let Some(site) = site {
            site
        } else {
            log::debug!("strand of {} is too short to be nicked", start);
            continue;
        };
        if n > parameters.min_length {
            nick(design, site, &mut report)?;
        } else {
            deferred.push(site);
        }
    }
    log::debug!(
        "{} nicks in the first pass, {} deferred",
        report.nicks.len(),
        deferred.len()
    );

    let mut groups: Vec<Vec<BaseId>> = Vec::new();
    for site in deferred {
        if let Some(group) = groups
            .iter_mut()
            .find(|g| design.strand(g[0]).contains_base(site))
        {
            group.push(site);
        } else {
            groups.push(vec![site]);
        }
    }

    for group in groups {
        let strand = design.strand(group[0]).rewind();
        let positions: AHashMap<BaseId, usize> = strand
            .forward()
            .enumerate()
            .map(|(i, b)| (b, i))
            .collect();
        let length = positions.len();
        if length <= parameters.max_length {
            continue;
        }
        let candidates = group
            .iter()
            .filter_map(|b| positions.get(b).map(|pos| (*b, *pos)))
            .collect();
        for site in choose_nick_sites(candidates, length, parameters.max_length) {
            nick(design, site, &mut report)?;
        }
    }
    log::info!("inserted {} nicks", report.nicks.len());
    Ok(report)
}

fn nick(design: &mut Design, site: BaseId, report: &mut NickReport) -> Result<(), DesignError> {
    if let Some(prev) = design.backward(site) {
        design.disconnect_backward(site)?;
        report.nicks.push(site);
        report.painted.push(site);
        report.painted.push(prev);
    }
    Ok(())
}

/// Pick `ceil(length / max_length) - 1` nick sites among `candidates`.
///
/// The `k`-th site is the remaining candidate whose position is the closest to
/// `k * max_length`. Ties are resolved in favor of the first candidate.
pub fn choose_nick_sites(
    mut candidates: Vec<(BaseId, usize)>,
    length: usize,
    max_length: usize,
) -> Vec<BaseId> {
    if max_length == 0 {
        return Vec::new();
    }
    let nb_nicks = ((length + max_length - 1) / max_length).saturating_sub(1);
    let mut ret = Vec::with_capacity(nb_nicks);
    for k in 1..=nb_nicks {
        let target = k * max_length;
        let mut best: Option<(usize, usize)> = None;
        for (i, (_, pos)) in candidates.iter().enumerate() {
            let distance = if *pos > target {
                pos - target
            } else {
                target - pos
            };
            if best.map(|(_, d)| distance < d).unwrap_or(true) {
                best = Some((i, distance));
            }
        }
        if let Some((i, _)) = best {
            ret.push(candidates.remove(i).0);
        } else {
            break;
        }
    }
    ret
}
