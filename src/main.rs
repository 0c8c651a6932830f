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
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use vhelix_formats::{export, import, FormatType, Imported, ReaderOptions};

/// Convert DNA nanostructure designs between caDNAno, oxDNA and the vHelix text format
#[derive(Parser)]
#[command(name = "vhelix", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a design and write it in another format
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Format of the input (default: guessed from its extension)
        #[arg(long)]
        from: Option<FormatType>,
        /// Format of the output (default: guessed from its extension)
        #[arg(long)]
        to: Option<FormatType>,
        /// Reader options, e.g. "nicking_min_length=30;nicking_max_length=60"
        #[arg(short, long, default_value = "")]
        options: String,
        /// Give a material to the strands that the input marks for painting
        #[arg(long)]
        paint: bool,
    },
    /// Print statistics about a design
    Info {
        input: PathBuf,
        #[arg(long)]
        from: Option<FormatType>,
        #[arg(short, long, default_value = "")]
        options: String,
    },
}

fn format_of(path: &Path, explicit: Option<FormatType>) -> anyhow::Result<FormatType> {
    explicit
        .or_else(|| FormatType::from_path(path))
        .ok_or_else(|| anyhow!("cannot guess the format of {}", path.display()))
}

fn read(input: &Path, from: Option<FormatType>, options: &str) -> anyhow::Result<Imported> {
    let format = format_of(input, from)?;
    let options: ReaderOptions = options.parse().context("invalid --options")?;
    import(input, format, &options).with_context(|| format!("failed to read {}", input.display()))
}

fn print_info(imported: &Imported) {
    let design = &imported.design;
    let strands = design.strands();
    let circular = strands.iter().filter(|s| s.is_circular()).count();
    let unlabeled = design
        .bases()
        .filter(|(id, _)| design.label(*id).map(|l| !l.is_valid()).unwrap_or(true))
        .count();
    println!("helices: {}", design.nb_helices());
    println!("bases: {}", design.nb_bases());
    println!("strands: {} ({} circular)", strands.len(), circular);
    println!("unlabeled bases: {}", unlabeled);
    if !imported.painted.is_empty() {
        println!("strands to paint: {}", imported.painted.len());
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            input,
            output,
            from,
            to,
            options,
            paint,
        } => {
            let mut imported = read(&input, from, &options)?;
            if paint {
                let options: ReaderOptions = options.parse()?;
                imported.paint(&options.materials)?;
            }
            let format = format_of(&output, to)?;
            let success = export(&imported.design, format, &output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            log::info!("{}", success.message());
            println!("{}", success.message());
        }
        Command::Info {
            input,
            from,
            options,
        } => {
            let imported = read(&input, from, &options)?;
            print_info(&imported);
        }
    }
    Ok(())
}
