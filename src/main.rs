//! Command line front end for the MUCT landmark dataset.
//!
//! Usage:
//!   muct download --yes                     # DESTRUCTIVE: wipe and re-fetch
//!   muct info --clean                       # record counts and tags
//!   muct export -o landmarks.json --clean   # all records as JSON
//!   muct image i000qa-fn -o face.png --flip # decode one image

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use muct_dataset::{DatasetConfig, MuctDataset, RecordRef};

#[derive(Parser, Debug)]
#[command(name = "muct")]
#[command(version, about = "MUCT facial landmark dataset tool", long_about = None)]
struct Cli {
    /// JSON dataset config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete the dataset directory and fetch the dataset again.
    ///
    /// DESTRUCTIVE: everything inside the dataset directory is removed
    /// before the fetch starts.
    Download {
        /// Confirm deletion of the existing dataset directory
        #[arg(long)]
        yes: bool,
    },
    /// Print record counts and the tag histogram
    Info(Curation),
    /// Write every record as JSON
    Export {
        #[command(flatten)]
        curation: Curation,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode one record image and save it
    Image {
        /// Record name, e.g. i000qa-fn
        name: String,

        /// Output image file; format follows the extension
        #[arg(short, long)]
        output: PathBuf,

        /// Mirror the image horizontally
        #[arg(long)]
        flip: bool,
    },
}

#[derive(Args, Debug)]
struct Curation {
    /// Drop records with missing landmarks
    #[arg(long)]
    clean: bool,

    /// Drop the named record (repeatable)
    #[arg(long, value_name = "NAME")]
    ignore: Vec<String>,
}

#[derive(Serialize)]
struct ExportRecord<'a> {
    name: &'a str,
    tag: &'a str,
    landmarks: Vec<f64>,
    landmarks_flip: Vec<f64>,
}

impl<'a> From<RecordRef<'a>> for ExportRecord<'a> {
    fn from(record: RecordRef<'a>) -> Self {
        Self {
            name: record.name,
            tag: record.tag,
            landmarks: record.landmarks.to_flat_vec(),
            landmarks_flip: record.landmarks_flip.to_flat_vec(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => DatasetConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => DatasetConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Command::Download { yes } => {
            let muct = MuctDataset::new(config);
            if !yes {
                bail!(
                    "download deletes {} before fetching; re-run with --yes to proceed",
                    muct.root().display()
                );
            }
            muct.download().context("downloading dataset")?;
        }
        Command::Info(curation) => {
            let muct = load(config, &curation)?;
            let complete = muct.landmarks().iter().filter(|l| l.is_complete()).count();
            println!("dataset:  {}", muct.root().display());
            println!("records:  {}", muct.len());
            println!("complete: {complete}");
            println!("tags:");
            for (tag, count) in muct.tag_counts() {
                println!("  {tag:<8} {count}");
            }
        }
        Command::Export { curation, output } => {
            let muct = load(config, &curation)?;
            let records: Vec<ExportRecord> = muct.iter_data().map(ExportRecord::from).collect();
            let writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(
                    File::create(path).with_context(|| format!("creating {}", path.display()))?,
                ),
                None => Box::new(std::io::stdout().lock()),
            };
            let mut writer = BufWriter::new(writer);
            serde_json::to_writer_pretty(&mut writer, &records).context("writing JSON")?;
            writeln!(writer)?;
            writer.flush()?;
            if let Some(path) = output {
                log::info!("exported {} records to {}", records.len(), path.display());
            }
        }
        Command::Image { name, output, flip } => {
            config.validate().context("checking dataset config")?;
            let muct = MuctDataset::new(config);
            let img = muct
                .image(&name, flip)
                .with_context(|| format!("loading image of {name}"))?;
            img.save(&output)
                .with_context(|| format!("saving {}", output.display()))?;
            log::info!("saved {}x{} image to {}", img.width(), img.height(), output.display());
        }
    }
    Ok(())
}

fn load(mut config: DatasetConfig, curation: &Curation) -> Result<MuctDataset> {
    config.clean_on_load |= curation.clean;
    config.ignore.extend(curation.ignore.iter().cloned());
    let mut muct = MuctDataset::new(config);
    muct.load().context("loading landmarks")?;
    Ok(muct)
}
