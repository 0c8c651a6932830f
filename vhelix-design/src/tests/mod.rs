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

use super::design_operations::*;
use super::*;
use std::sync::Mutex;

fn design_with_bases(n: usize) -> (Design, Vec<BaseId>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut design = Design::new();
    let h = design
        .create_helix("h", Vec3::zero(), Rotor3::identity())
        .unwrap();
    let bases = (0..n)
        .map(|i| {
            design
                .create_base(format!("b{}", i), h, Vec3::new(0., 0., i as f32))
                .unwrap()
        })
        .collect();
    (design, bases)
}

fn chain(design: &mut Design, bases: &[BaseId]) {
    for w in bases.windows(2) {
        design.connect_forward(w[0], w[1], false).unwrap();
    }
}

fn base(design: &Design, name: &str) -> BaseId {
    design.base_by_name(name).unwrap()
}

#[test]
fn forward_edges_are_mutually_consistent() {
    let (mut design, b) = design_with_bases(3);
    design.connect_forward(b[0], b[1], false).unwrap();
    assert_eq!(design.forward(b[0]), Some(b[1]));
    assert_eq!(design.backward(b[1]), Some(b[0]));

    let removed = design.connect_forward(b[0], b[2], false).unwrap();
    assert_eq!(removed, vec![Edge::Forward { from: b[0], to: b[1] }]);
    assert_eq!(design.forward(b[0]), Some(b[2]));
    assert_eq!(design.backward(b[2]), Some(b[0]));
    assert_eq!(design.backward(b[1]), None);

    let removed = design.disconnect_forward(b[0]).unwrap();
    assert_eq!(removed, Some(Edge::Forward { from: b[0], to: b[2] }));
    assert_eq!(design.forward(b[0]), None);
    assert_eq!(design.backward(b[2]), None);
    assert_eq!(design.disconnect_forward(b[0]).unwrap(), None);
}

#[test]
fn superseded_edges_can_be_restored() {
    let (mut design, b) = design_with_bases(4);
    design.connect_forward(b[0], b[1], false).unwrap();
    design.connect_forward(b[2], b[3], false).unwrap();
    let removed = design.connect_forward(b[0], b[3], true).unwrap();
    assert_eq!(removed.len(), 2);
    design.disconnect_forward(b[0]).unwrap();
    design.restore_edges(&removed).unwrap();
    assert_eq!(design.forward(b[0]), Some(b[1]));
    assert_eq!(design.forward(b[2]), Some(b[3]));
}

#[test]
fn expected_edges_are_still_severed() {
    let (mut design, b) = design_with_bases(4);
    design.connect_forward(b[0], b[1], false).unwrap();
    design.connect_forward(b[2], b[3], false).unwrap();
    design.connect_forward(b[0], b[3], true).unwrap();
    assert_eq!(design.backward(b[1]), None);
    assert_eq!(design.forward(b[2]), None);

    design.connect_opposite(b[0], b[1], false).unwrap();
    let removed = design.connect_opposite(b[2], b[1], true).unwrap();
    assert_eq!(
        removed,
        vec![Edge::Opposite {
            source: b[0],
            destination: b[1]
        }]
    );
    assert_eq!(design.opposite(b[0]), None);
    assert_eq!(design.opposite(b[1]), Some(b[2]));
}

#[test]
fn invalid_handles_are_refused() {
    let (mut design, b) = design_with_bases(1);
    let ghost = BaseId(42);
    assert_eq!(
        design.connect_forward(b[0], ghost, false),
        Err(DesignError::InvalidBase(ghost))
    );
    assert_eq!(design.forward(b[0]), None);
    assert!(design
        .create_base("x", HelixId(7), Vec3::zero())
        .is_err());
    assert_eq!(
        design.create_base("b0", HelixId(0), Vec3::zero()),
        Err(DesignError::DuplicateName("b0".to_string()))
    );
    assert_eq!(
        design.create_base("with space", HelixId(0), Vec3::zero()),
        Err(DesignError::InvalidName("with space".to_string()))
    );
}

#[test]
fn base_types() {
    let (mut design, b) = design_with_bases(3);
    assert_eq!(design.base_type(b[0]), Some(BaseType::End));
    chain(&mut design, &b);
    assert_eq!(design.base_type(b[0]), Some(BaseType::FivePrimeEnd));
    assert_eq!(design.base_type(b[1]), Some(BaseType::Base));
    assert_eq!(design.base_type(b[2]), Some(BaseType::ThreePrimeEnd));
    assert!(BaseType::End.is_five_prime_end() && BaseType::End.is_three_prime_end());
}

#[test]
fn opposite_polarity() {
    let (mut design, b) = design_with_bases(2);
    design.set_label(b[0], Label::G).unwrap();
    design.connect_opposite(b[0], b[1], false).unwrap();
    assert!(!design.is_destination(b[0]));
    assert!(design.is_destination(b[1]));
    assert_eq!(design.opposite(b[0]), Some(b[1]));
    assert_eq!(design.opposite(b[1]), Some(b[0]));
    assert_eq!(design.label(b[1]), Some(Label::C));

    // Writing through the destination converges to the same pair
    design.set_label(b[1], Label::A).unwrap();
    assert_eq!(design.label(b[0]), Some(Label::T));
    assert_eq!(design.label(b[1]), Some(Label::A));
    design.set_label(b[0], Label::A).unwrap();
    assert_eq!(design.label(b[1]), Some(Label::T));
    assert!(matches!(
        design.base(b[1]).unwrap().label_state(),
        LabelState::PairedDestination { source } if source == b[0]
    ));
}

#[test]
fn pairing_keeps_the_only_valid_label() {
    let (mut design, b) = design_with_bases(2);
    design.set_label(b[1], Label::T).unwrap();
    design.connect_opposite(b[0], b[1], false).unwrap();
    assert_eq!(design.label(b[0]), Some(Label::A));
    assert_eq!(design.label(b[1]), Some(Label::T));
}

#[test]
fn repairing_severs_previous_pairs() {
    let (mut design, b) = design_with_bases(3);
    design.set_label(b[0], Label::A).unwrap();
    design.connect_opposite(b[0], b[1], false).unwrap();
    let removed = design.connect_opposite(b[2], b[1], false).unwrap();
    assert_eq!(
        removed,
        vec![Edge::Opposite {
            source: b[0],
            destination: b[1]
        }]
    );
    assert_eq!(design.opposite(b[0]), None);
    assert_eq!(design.label(b[0]), Some(Label::A));
    assert_eq!(design.opposite(b[1]), Some(b[2]));
    // b2 had no label so the pair keeps the label b1 had
    assert_eq!(design.label(b[1]), Some(Label::T));
    assert_eq!(design.label(b[2]), Some(Label::A));

    design.disconnect_opposite(b[1]).unwrap();
    assert_eq!(design.opposite(b[2]), None);
    assert_eq!(design.label(b[1]), Some(Label::T));
}

#[test]
fn linear_traversal() {
    let (mut design, b) = design_with_bases(4);
    chain(&mut design, &b);
    let strand = design.strand(b[2]);
    assert_eq!(strand.forward().collect::<Vec<_>>(), vec![b[2], b[3]]);
    assert_eq!(strand.backward().collect::<Vec<_>>(), vec![b[2], b[1], b[0]]);
    assert_eq!(strand.rewind().defining_base(), b[0]);
    assert_eq!(strand.five_prime_end(), Some(b[0]));
    assert!(!strand.is_circular());
    assert!(strand.contains_base(b[0]));
    assert!(strand.contains_base(b[3]));
    assert_eq!(strand.bases(), b);
    assert_eq!(strand.len(), 4);
}

#[test]
fn circular_traversal() {
    let (mut design, b) = design_with_bases(4);
    chain(&mut design, &b);
    design.connect_forward(b[3], b[0], false).unwrap();
    let strand = design.strand(b[1]);
    let mut iter = strand.forward();
    assert_eq!(iter.by_ref().collect::<Vec<_>>(), vec![b[1], b[2], b[3], b[0]]);
    assert!(iter.is_loop());
    assert!(strand.is_circular());
    assert_eq!(strand.rewind().defining_base(), b[1]);
    assert_eq!(strand.five_prime_end(), None);
    assert_eq!(strand.len(), 4);
}

#[test]
fn single_base_cycle() {
    let (mut design, b) = design_with_bases(1);
    design.connect_forward(b[0], b[0], false).unwrap();
    let strand = design.strand(b[0]);
    assert!(strand.is_circular());
    assert_eq!(strand.len(), 1);
}

#[test]
fn contains_base_is_false_for_other_strands() {
    let (mut design, b) = design_with_bases(4);
    chain(&mut design, &b[0..2]);
    chain(&mut design, &b[2..4]);
    assert!(!design.strand(b[0]).contains_base(b[2]));
    assert_eq!(design.strands().len(), 2);
}

struct Recorder(Mutex<Vec<BaseId>>);

impl DesignObserver for Recorder {
    fn on_base_will_be_deleted(&self, base: BaseId) {
        self.0.lock().unwrap().push(base)
    }
}

#[test]
fn deletion_severs_edges_and_notifies() {
    let (mut design, b) = design_with_bases(4);
    let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
    design.add_observer(recorder.clone());
    chain(&mut design, &b[0..3]);
    design.connect_opposite(b[1], b[3], false).unwrap();

    design.delete_base(b[1]).unwrap();
    assert_eq!(recorder.0.lock().unwrap().as_slice(), &[b[1]]);
    assert!(design.base(b[1]).is_none());
    assert_eq!(design.forward(b[0]), None);
    assert_eq!(design.backward(b[2]), None);
    assert_eq!(design.opposite(b[3]), None);
    assert_eq!(design.base_by_name("b1"), None);
    assert_eq!(design.nb_bases(), 3);
    assert_eq!(design.delete_base(b[1]), Err(DesignError::InvalidBase(b[1])));

    let h = design.resolve_helix("h").unwrap();
    design.delete_helix(h).unwrap();
    assert_eq!(design.nb_bases(), 0);
    assert_eq!(design.nb_helices(), 0);
    assert!(design.helix_by_name("h").is_none());
    assert_eq!(recorder.0.lock().unwrap().len(), 4);
}

#[test]
fn ladder_structure() {
    let mut design = Design::new();
    let h = design
        .create_helix_with_bases("h1", Vec3::zero(), Rotor3::identity(), 4)
        .unwrap();
    let ladder = design.helix(h).unwrap().ladder().unwrap().clone();
    assert_eq!(ladder.len(), 4);
    assert_eq!(ladder.endpoint(Endpoint::ForwardFivePrime), Some(base(&design, "h1_f0")));
    assert_eq!(ladder.endpoint(Endpoint::ForwardThreePrime), Some(base(&design, "h1_f3")));
    assert_eq!(ladder.endpoint(Endpoint::BackwardFivePrime), Some(base(&design, "h1_b3")));
    assert_eq!(ladder.endpoint(Endpoint::BackwardThreePrime), Some(base(&design, "h1_b0")));

    let f0 = base(&design, "h1_f0");
    let b3 = base(&design, "h1_b3");
    assert_eq!(design.strand(f0).len(), 4);
    assert_eq!(design.strand(b3).five_prime_end(), Some(b3));
    for i in 0..4 {
        let f = base(&design, &format!("h1_f{}", i));
        let b = base(&design, &format!("h1_b{}", i));
        assert_eq!(design.opposite(f), Some(b));
        assert!(design.is_destination(b));
    }
    assert_eq!(design.strands().len(), 2);
    design.delete_base(f0).unwrap();
    assert!(design.helix(h).unwrap().ladder().is_none());
    let range = design.cylinder_range(h).unwrap();
    assert!((range.height - 4. * dna::STEP).abs() < 1e-5);
}

#[test]
fn world_positions_follow_the_helix() {
    let mut design = Design::new();
    let h = design
        .create_helix("h", Vec3::new(1., 2., 3.), Rotor3::identity())
        .unwrap();
    let b = design.create_base("b", h, Vec3::new(0., 0., 1.)).unwrap();
    let pos = design.base_world_position(b).unwrap();
    assert!((pos - Vec3::new(1., 2., 4.)).mag() < 1e-5);

    design
        .set_base_translation(b, Vec3::new(0., 0., 2.))
        .unwrap();
    design
        .set_helix_transform(h, Vec3::zero(), orientation_from_normal(Vec3::unit_x()))
        .unwrap();
    let pos = design.base_world_position(b).unwrap();
    assert!((pos - Vec3::new(2., 0., 0.)).mag() < 1e-5);
}

#[test]
fn long_helices_are_nicked_in_their_middle() {
    let mut design = Design::new();
    design
        .create_helix_with_bases("h", Vec3::zero(), Rotor3::identity(), 50)
        .unwrap();
    let report = auto_nick(&mut design, &NickingParameters::DEFAULT).unwrap();
    let site = base(&design, "h_b24");
    assert_eq!(report.nicks, vec![site]);
    assert!(report.painted.contains(&site));
    assert!(report.painted.contains(&base(&design, "h_b25")));
    assert_eq!(design.backward(site), None);
    assert_eq!(design.strands().len(), 3);
    assert_eq!(design.strand(site).len(), 25);
}

#[test]
fn long_strands_of_short_helices_are_nicked() {
    let mut design = Design::new();
    design
        .create_helix_with_bases("a", Vec3::zero(), Rotor3::identity(), 20)
        .unwrap();
    design
        .create_helix_with_bases("b", Vec3::new(2., 0., 0.), Rotor3::identity(), 20)
        .unwrap();
    let a_end = base(&design, "a_b0");
    let b_start = base(&design, "b_b19");
    design.connect_forward(a_end, b_start, false).unwrap();
    assert_eq!(design.strand(a_end).len(), 40);

    let parameters = NickingParameters {
        min_length: 38,
        max_length: 30,
    };
    let report = auto_nick(&mut design, &parameters).unwrap();
    let site = base(&design, "b_b9");
    assert_eq!(report.nicks, vec![site]);
    assert_eq!(design.strand(a_end).len(), 30);
    assert_eq!(design.strand(site).len(), 10);
}

#[test]
fn short_strands_are_not_nicked() {
    let mut design = Design::new();
    design
        .create_helix_with_bases("a", Vec3::zero(), Rotor3::identity(), 20)
        .unwrap();
    let report = auto_nick(&mut design, &NickingParameters::DEFAULT).unwrap();
    assert!(report.nicks.is_empty());
    assert_eq!(design.strands().len(), 2);
}
