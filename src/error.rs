use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fetching {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("extracting archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected {expected} columns, found {found}")]
    Schema {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column {column}: '{value}' is not a number")]
    Parse {
        row: usize,
        column: usize,
        value: String,
    },

    /// A canonical row found no mirrored row with its subject key. Loading
    /// fails instead of truncating to the shorter partition, so the four
    /// record arrays always stay the same length.
    #[error("record '{name}' has no mirrored counterpart")]
    Unpaired { name: String },

    /// Two canonical rows, or two mirrored rows, share one subject key.
    #[error("subject '{key}' appears in more than one {side} row")]
    DuplicateSubject { key: String, side: &'static str },

    /// Positional pairing with partitions of unequal size. Replaces the
    /// legacy zip that silently truncated to the shorter partition.
    #[error("{canonical} canonical rows cannot be paired by position with {mirrored} mirrored rows")]
    PartitionMismatch { canonical: usize, mirrored: usize },

    #[error("mirrored landmark {index} lands on the (0, 0) missing-point marker")]
    MirrorCollision { index: usize },

    #[error("invalid topology table: {0}")]
    Topology(String),

    #[error("image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
