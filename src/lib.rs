//! # muct-dataset
//!
//! Access to the MUCT facial landmark dataset: 76 landmarks per face, every
//! face also present as a horizontally mirrored image with its own landmark
//! row.
//!
//! - **Acquisition**: wipe the dataset directory, clone the dataset
//!   repository and unpack its archives ([`MuctDataset::download`]).
//! - **Loading**: parse `muct-landmarks/muct76-opencv.csv` into aligned
//!   arrays of names, tags, landmarks and mirrored landmarks.
//! - **Curation**: drop incomplete faces ([`MuctDataset::clean`]) or named
//!   records ([`MuctDataset::ignore`]).
//! - **Topology**: mesh edges ([`MuctDataset::PAIRS`]) and the mirror
//!   permutation ([`MuctDataset::SYMMETRY`]).
//! - **Images**: decode a record's JPEG, optionally mirrored, one at a time
//!   or as a lazy sequence.
//!
//! ```no_run
//! use muct_dataset::{DatasetConfig, MuctDataset};
//!
//! let mut muct = MuctDataset::new(DatasetConfig::default());
//! muct.load()?;
//! muct.clean();
//! for record in muct.iter_data() {
//!     println!("{} {} {}", record.name, record.tag, record.landmarks[0]);
//! }
//! for img in muct.iter_images(true).take(2) {
//!     let img = img?;
//!     println!("{}x{}", img.width(), img.height());
//! }
//! # Ok::<(), muct_dataset::Error>(())
//! ```

pub mod acquire;
mod config;
pub mod data;
mod dataset;
mod error;
mod images;

pub use acquire::{Fetch, GitFetcher};
pub use config::{DatasetConfig, Pairing, DEFAULT_DATA_DIR, DEFAULT_URL};
pub use data::model::{Columns, Landmarks, Point, RecordRef, NUM_LANDMARKS};
pub use dataset::MuctDataset;
pub use error::{Error, Result};
pub use images::Images;
