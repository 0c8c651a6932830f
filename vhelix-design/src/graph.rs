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
//! Edge operations of the design graph.
//!
//! Every operation updates both ends of the edges it touches, and returns the edges that it
//! removed so that the caller can restore them.
use super::*;

/// An edge of the design graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `from.forward == to` and `to.backward == from`.
    Forward { from: BaseId, to: BaseId },
    /// An opposite pairing. `source` holds the label of the pair.
    Opposite { source: BaseId, destination: BaseId },
}

impl Design {
    /// Make `to` the forward neighbour of `from`.
    ///
    /// The existing forward edge of `from` and backward edge of `to` are always removed first,
    /// whatever the value of `expected_previous`, and returned. The flag only tells whether the
    /// caller expected such edges: unexpected ones are logged as warnings, expected ones at debug
    /// level.
    pub fn connect_forward(
        &mut self,
        from: BaseId,
        to: BaseId,
        expected_previous: bool,
    ) -> Result<Vec<Edge>, DesignError> {
        self.check_base(from)?;
        self.check_base(to)?;
        let mut removed = Vec::new();
        if let Some(edge) = self.disconnect_forward(from)? {
            removed.push(edge);
        }
        if let Some(edge) = self.disconnect_backward(to)? {
            removed.push(edge);
        }
        if !removed.is_empty() {
            if expected_previous {
                log::debug!("connecting {} -> {} superseded {:?}", from, to, removed);
            } else {
                log::warn!("connecting {} -> {} superseded {:?}", from, to, removed);
            }
        }
        self.base_mut(from)?.forward = Some(to);
        self.base_mut(to)?.backward = Some(from);
        Ok(removed)
    }

    /// Remove the forward edge of `base`. Return the removed edge if there was one.
    pub fn disconnect_forward(&mut self, base: BaseId) -> Result<Option<Edge>, DesignError> {
        let to = self.base_mut(base)?.forward.take();
        if let Some(to) = to {
            if let Ok(next) = self.base_mut(to) {
                if next.backward == Some(base) {
                    next.backward = None;
                }
            }
        }
        Ok(to.map(|to| Edge::Forward { from: base, to }))
    }

    /// Remove the backward edge of `base`. Return the removed edge if there was one.
    pub fn disconnect_backward(&mut self, base: BaseId) -> Result<Option<Edge>, DesignError> {
        let from = self.base_mut(base)?.backward.take();
        if let Some(from) = from {
            if let Ok(prev) = self.base_mut(from) {
                if prev.forward == Some(base) {
                    prev.forward = None;
                }
            }
        }
        Ok(from.map(|from| Edge::Forward { from, to: base }))
    }

    /// Pair `source` with `destination`.
    ///
    /// The label of the pair is the label of `source` if it has a valid one, and the complement
    /// of the label of `destination` otherwise. Previous pairings of both bases are always
    /// removed first and returned; `expected_previous` only selects the log level of that
    /// removal, as in [`Design::connect_forward`]. Pairing a base with itself only removes its
    /// previous pairing.
    pub fn connect_opposite(
        &mut self,
        source: BaseId,
        destination: BaseId,
        expected_previous: bool,
    ) -> Result<Vec<Edge>, DesignError> {
        self.check_base(source)?;
        self.check_base(destination)?;
        let mut removed = Vec::new();
        if let Some(edge) = self.disconnect_opposite(source)? {
            removed.push(edge);
        }
        if source == destination {
            log::warn!("cannot pair {} with itself", source);
            return Ok(removed);
        }
        if let Some(edge) = self.disconnect_opposite(destination)? {
            removed.push(edge);
        }
        if !removed.is_empty() {
            if expected_previous {
                log::debug!("pairing {} with {} superseded {:?}", source, destination, removed);
            } else {
                log::warn!("pairing {} with {} superseded {:?}", source, destination, removed);
            }
        }

        let source_label = self.label(source).unwrap_or_default();
        let destination_label = self.label(destination).unwrap_or_default();
        let label = if source_label.is_valid() {
            source_label
        } else {
            destination_label.complement()
        };
        self.base_mut(source)?.label = LabelState::PairedSource {
            opposite: destination,
            label,
        };
        self.base_mut(destination)?.label = LabelState::PairedDestination { source };
        Ok(removed)
    }

    /// Remove the opposite pairing of `base`. Both bases keep their effective label.
    pub fn disconnect_opposite(&mut self, base: BaseId) -> Result<Option<Edge>, DesignError> {
        let state = self.base_mut(base)?.label;
        let (source, destination) = match state {
            LabelState::Unpaired(_) => return Ok(None),
            LabelState::PairedSource { opposite, .. } => (base, opposite),
            LabelState::PairedDestination { source } => (source, base),
        };
        let label = match self.bases.get(&source).map(|b| b.label) {
            Some(LabelState::PairedSource { label, .. }) => label,
            _ => Label::Invalid,
        };
        if let Ok(b) = self.base_mut(source) {
            b.label = LabelState::Unpaired(label);
        }
        if let Ok(b) = self.base_mut(destination) {
            b.label = LabelState::Unpaired(label.complement());
        }
        Ok(Some(Edge::Opposite {
            source,
            destination,
        }))
    }

    /// Set the label of `base`. If `base` is the destination of a pairing, the complement of
    /// `label` is written on its source.
    pub fn set_label(&mut self, base: BaseId, label: Label) -> Result<(), DesignError> {
        let state = self.base_mut(base)?.label;
        match state {
            LabelState::Unpaired(_) => self.base_mut(base)?.label = LabelState::Unpaired(label),
            LabelState::PairedSource { opposite, .. } => {
                self.base_mut(base)?.label = LabelState::PairedSource { opposite, label }
            }
            LabelState::PairedDestination { source } => {
                self.base_mut(source)?.label = LabelState::PairedSource {
                    opposite: base,
                    label: label.complement(),
                }
            }
        }
        Ok(())
    }

    /// The effective label of `base`.
    pub fn label(&self, base: BaseId) -> Option<Label> {
        match self.bases.get(&base)?.label {
            LabelState::Unpaired(label) => Some(label),
            LabelState::PairedSource { label, .. } => Some(label),
            LabelState::PairedDestination { source } => match self.bases.get(&source)?.label {
                LabelState::PairedSource { label, .. } => Some(label.complement()),
                _ => None,
            },
        }
    }

    pub fn forward(&self, base: BaseId) -> Option<BaseId> {
        self.bases.get(&base).and_then(|b| b.forward)
    }

    pub fn backward(&self, base: BaseId) -> Option<BaseId> {
        self.bases.get(&base).and_then(|b| b.backward)
    }

    pub fn opposite(&self, base: BaseId) -> Option<BaseId> {
        self.bases.get(&base).and_then(|b| b.opposite())
    }

    pub fn is_destination(&self, base: BaseId) -> bool {
        self.bases
            .get(&base)
            .map(|b| b.is_destination())
            .unwrap_or(false)
    }

    pub fn base_type(&self, base: BaseId) -> Option<BaseType> {
        self.bases.get(&base).map(Base::base_type)
    }

    /// Restore edges previously returned by a connection or disconnection operation.
    pub fn restore_edges(&mut self, edges: &[Edge]) -> Result<(), DesignError> {
        for edge in edges {
            match *edge {
                Edge::Forward { from, to } => {
                    self.connect_forward(from, to, true)?;
                }
                Edge::Opposite {
                    source,
                    destination,
                } => {
                    self.connect_opposite(source, destination, true)?;
                }
            }
        }
        Ok(())
    }
}
