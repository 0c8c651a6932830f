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

use super::*;
use vhelix_design::ultraviolet::{Rotor3, Vec3};
use vhelix_design::{Label, Material, NoProgress, Progress};

fn labeled_helix() -> Design {
    let mut design = Design::new();
    let h = design
        .create_helix_with_bases("h1", Vec3::zero(), Rotor3::identity(), 4)
        .unwrap();
    let forward = design.helix(h).unwrap().ladder().unwrap().forward.clone();
    for (b, l) in forward.iter().zip([Label::A, Label::T, Label::G, Label::C]) {
        design.set_label(*b, l).unwrap();
    }
    design
}

#[test]
fn format_from_path() {
    assert_eq!(FormatType::from_path("a/b.json"), Some(FormatType::Cadnano));
    assert_eq!(FormatType::from_path("design.CONF"), Some(FormatType::Oxdna));
    assert_eq!(FormatType::from_path("mesh.rpoly"), Some(FormatType::Text));
    assert_eq!(FormatType::from_path("design"), None);
    assert_eq!("OxDNA".parse::<FormatType>().unwrap(), FormatType::Oxdna);
    assert_eq!("strands".parse::<FormatType>().unwrap(), FormatType::StrandTable);
    assert_eq!(FormatType::Cadnano.to_string(), "cadnano");
    assert!(!FormatType::Text.can_export());
    assert!(!FormatType::StrandTable.can_import());
}

#[test]
fn oxdna_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("design.conf");
    let design = labeled_helix();
    let success = export(&design, FormatType::Oxdna, &path).unwrap();
    assert!(dir.path().join("design.top").exists());
    assert!(dir.path().join("design.vhelix").exists());
    let message = success.message();
    assert!(message.contains("design.conf"));
    assert!(message.contains("design.top"));

    let imported = import(&path, FormatType::Oxdna, &Default::default()).unwrap();
    assert_eq!(imported.design.nb_bases(), 8);
    let f0 = imported.design.base_by_name("h1_f0").unwrap();
    let labels: String = imported
        .design
        .strand(f0)
        .forward()
        .filter_map(|b| imported.design.label(b))
        .map(Label::to_char)
        .collect();
    assert_eq!(labels, "ATGC");
}

#[test]
fn oxdna_import_without_glue_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("design.conf");
    export(&labeled_helix(), FormatType::Oxdna, &path).unwrap();
    std::fs::remove_file(dir.path().join("design.vhelix")).unwrap();
    let imported = import(&path, FormatType::Oxdna, &Default::default()).unwrap();
    assert_eq!(imported.design.nb_helices(), 2);
    assert!(imported.design.base_by_name("base_0").is_some());
}

#[test]
fn text_to_cadnano_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("design.txt");
    std::fs::write(&input, "hb h1 4 0 0 0 0 0 0 1\n").unwrap();
    let imported = import(&input, FormatType::Text, &Default::default()).unwrap();
    assert!(matches!(
        export(&imported.design, FormatType::Cadnano, &dir.path().join("out.json")),
        Err(ExportError::NotOnLattice { .. })
    ));
    assert!(matches!(
        export(&imported.design, FormatType::Text, &input),
        Err(ExportError::Unsupported(FormatType::Text))
    ));
    assert!(matches!(
        import(&input, FormatType::StrandTable, &Default::default()),
        Err(ImportError::Unsupported(FormatType::StrandTable))
    ));
}

#[test]
fn strand_table_accepts_unlabeled_bases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("design.strands");
    let mut design = Design::new();
    design
        .create_helix_with_bases("h", Vec3::zero(), Rotor3::identity(), 3)
        .unwrap();
    export(&design, FormatType::StrandTable, &path).unwrap();
    let table = std::fs::read_to_string(&path).unwrap();
    assert!(table.starts_with("6 2\n# strand 1: h_f0\n1 N 1 -1\n"));
}

#[test]
fn cadnano_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let json = r#"{"name": "small", "vstrands": [{
        "num": 0, "row": 0, "col": 0,
        "scaf": [[-1,-1,0,1],[0,0,-1,-1],[-1,-1,-1,-1]],
        "stap": [[0,1,-1,-1],[-1,-1,0,0],[-1,-1,-1,-1]],
        "loop": [0,0,0], "skip": [0,0,0],
        "stap_colors": [[1, 255]], "scafLoop": [], "stapLoop": []
    }]}"#;
    let input = dir.path().join("small.json");
    std::fs::write(&input, json).unwrap();
    let imported = import(&input, FormatType::Cadnano, &Default::default()).unwrap();
    assert_eq!(imported.design.nb_bases(), 4);
    assert_eq!(imported.design.strands().len(), 2);

    let output = dir.path().join("copy.json");
    export(&imported.design, FormatType::Cadnano, &output).unwrap();
    let copy = cadnano::Cadnano::from_file(&output).unwrap();
    assert_eq!(copy.name, "copy");
    assert_eq!(copy.vstrands[0].scaf.len(), 32);
    assert_eq!(copy.vstrands[0].scaf[0], [-1, -1, 0, 1]);
    assert_eq!(copy.vstrands[0].stap[1], [-1, -1, 0, 0]);
    assert_eq!(copy.vstrands[0].stap_colors, vec![[1, 255]]);
}

#[test]
fn painting_imported_strands() {
    let input = "hb h1 50 0 0 0 0 0 0 1\nautonick\n";
    let mut imported = text::read_text(input, &Default::default(), &mut NoProgress).unwrap();
    let materials = Materials::new(vec![Material::new("red"), Material::new("blue")]);
    imported.paint(&materials).unwrap();
    let design = &imported.design;
    let colors: Vec<Option<&Material>> = imported
        .painted
        .iter()
        .map(|b| design.base(*b).and_then(|b| b.material()))
        .collect();
    assert_eq!(
        colors,
        vec![Some(&Material::new("red")), Some(&Material::new("blue"))]
    );
    let f0 = design.base_by_name("h1_f0").unwrap();
    assert_eq!(design.base(f0).unwrap().material(), None);
}

#[test]
fn forced_autonick_on_other_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("design.conf");
    let mut design = Design::new();
    let h = design
        .create_helix_with_bases("h", Vec3::zero(), Rotor3::identity(), 50)
        .unwrap();
    let bases: Vec<_> = design.helix_bases(h).collect();
    for b in bases {
        if design.label(b) == Some(Label::Invalid) {
            design.set_label(b, Label::A).unwrap();
        }
    }
    export(&design, FormatType::Oxdna, &path).unwrap();
    let options: ReaderOptions = "autonick=true".parse().unwrap();
    let imported = import(&path, FormatType::Oxdna, &options).unwrap();
    // Imported helices have no ladder, so there is nothing to nick
    assert!(imported.painted.is_empty());
    assert_eq!(imported.design.strands().len(), 2);
}

#[derive(Default)]
struct CountingProgress {
    range: usize,
    steps: usize,
    done: bool,
}

impl Progress for CountingProgress {
    fn begin(&mut self, range: usize) {
        self.range = range;
        self.steps = 0;
    }

    fn step(&mut self) {
        self.steps += 1;
    }

    fn done(&mut self) {
        self.done = true;
    }
}

#[test]
fn long_operations_report_progress() {
    let design = labeled_helix();
    let mut progress = CountingProgress::default();
    let (config, topology, glue) = oxdna::to_oxdna(&design, &mut progress).unwrap();
    assert_eq!((progress.range, progress.steps, progress.done), (8, 8, true));

    let (mut config_out, mut topology_out, mut glue_out) = (Vec::new(), Vec::new(), Vec::new());
    config.write(&mut config_out).unwrap();
    topology.write(&mut topology_out).unwrap();
    glue.write(&mut glue_out).unwrap();
    let config = String::from_utf8(config_out).unwrap();
    let topology = String::from_utf8(topology_out).unwrap();
    let glue = String::from_utf8(glue_out).unwrap();
    let mut progress = CountingProgress::default();
    oxdna::from_oxdna(
        &topology,
        &config,
        Some(&glue),
        &Materials::default(),
        &mut progress,
    )
    .unwrap();
    assert_eq!((progress.range, progress.steps, progress.done), (8, 8, true));

    let mut progress = CountingProgress::default();
    let input = "hb h1 2 0 0 0 0 0 0 1\nh h2 0 0 0 0 0 0 1\nb x h2 0 0 0 - A\nc h1 f3' h2 x\n";
    text::read_text(input, &Default::default(), &mut progress).unwrap();
    assert_eq!((progress.range, progress.steps, progress.done), (4, 4, true));
}
