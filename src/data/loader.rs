use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};

use super::model::{Columns, Landmarks, NUM_LANDMARKS};
use crate::config::Pairing;
use crate::error::{Error, Result};

/// Columns per row: name, tag, then x/y for every landmark.
pub const ROW_WIDTH: usize = 2 + 2 * NUM_LANDMARKS;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read the landmark table at `path` and pair every canonical row with its
/// mirrored row.
///
/// Any malformed row fails the whole load.
pub fn load_table(path: &Path, mirror_prefix: &str, pairing: Pairing) -> Result<Columns> {
    let file = std::fs::File::open(path)?;
    let rows = read_rows(file)?;
    let total = rows.len();
    let parts = partition(rows, mirror_prefix);
    debug!(
        "{}: {total} rows, {} canonical, {} mirrored",
        path.display(),
        parts.canonical.len(),
        parts.mirrored.len()
    );
    let columns = pair(parts, mirror_prefix, pairing)?;
    info!("loaded {} records from {}", columns.len(), path.display());
    Ok(columns)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// One parsed row of the landmark table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub tag: String,
    pub landmarks: Landmarks,
}

/// CSV layout: one header row, then
/// `name,tag,x00,y00,x01,y01,...,x75,y75` per record.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // header is line 1
        let row_no = record.position().map_or(idx + 2, |p| p.line() as usize);

        if record.len() != ROW_WIDTH {
            return Err(Error::Schema {
                row: row_no,
                expected: ROW_WIDTH,
                found: record.len(),
            });
        }

        let coords = record
            .iter()
            .enumerate()
            .skip(2)
            .map(|(column, tok)| {
                tok.parse::<f64>().map_err(|_| Error::Parse {
                    row: row_no,
                    column,
                    value: tok.to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let landmarks = Landmarks::from_flat(&coords).ok_or(Error::Schema {
            row: row_no,
            expected: ROW_WIDTH,
            found: record.len(),
        })?;

        rows.push(Row {
            name: record[0].to_string(),
            tag: record[1].to_string(),
            landmarks,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Partitioning & pairing
// ---------------------------------------------------------------------------

/// Rows split by naming convention, each half in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitioned {
    pub canonical: Vec<Row>,
    pub mirrored: Vec<Row>,
}

/// Split rows on whether their name starts with `mirror_prefix`.
pub fn partition(rows: Vec<Row>, mirror_prefix: &str) -> Partitioned {
    let (mirrored, canonical): (Vec<Row>, Vec<Row>) = rows
        .into_iter()
        .partition(|row| row.name.starts_with(mirror_prefix));
    Partitioned {
        canonical,
        mirrored,
    }
}

/// Key shared by a canonical row and its mirrored row.
///
/// Mirrored names lose the mirror prefix, canonical names their first
/// character: `ir000qa-fn` and `i000qa-fn` both give `000qa-fn`.
pub fn subject_key<'a>(name: &'a str, mirror_prefix: &str) -> &'a str {
    match name.strip_prefix(mirror_prefix) {
        Some(rest) => rest,
        None => {
            let mut chars = name.chars();
            chars.next();
            chars.as_str()
        }
    }
}

/// Attach mirrored landmarks to every canonical row.
pub fn pair(parts: Partitioned, mirror_prefix: &str, pairing: Pairing) -> Result<Columns> {
    match pairing {
        Pairing::BySubject => pair_by_subject(parts, mirror_prefix),
        Pairing::Positional => pair_by_position(parts),
    }
}

fn pair_by_subject(parts: Partitioned, mirror_prefix: &str) -> Result<Columns> {
    let mut mirrors: HashMap<String, Landmarks> = HashMap::with_capacity(parts.mirrored.len());
    for row in parts.mirrored {
        let key = subject_key(&row.name, mirror_prefix).to_string();
        if mirrors.contains_key(&key) {
            return Err(Error::DuplicateSubject {
                key,
                side: "mirrored",
            });
        }
        mirrors.insert(key, row.landmarks);
    }

    let mut used: HashSet<&str> = HashSet::new();
    let mut columns = Columns::with_capacity(parts.canonical.len());
    for row in &parts.canonical {
        let key = subject_key(&row.name, mirror_prefix);
        let (key, flip) = mirrors
            .get_key_value(key)
            .ok_or_else(|| Error::Unpaired {
                name: row.name.clone(),
            })?;
        // each mirror pairs with exactly one canonical row
        if !used.insert(key.as_str()) {
            return Err(Error::DuplicateSubject {
                key: key.clone(),
                side: "canonical",
            });
        }
        columns.push(
            row.name.clone(),
            row.tag.clone(),
            row.landmarks.clone(),
            flip.clone(),
        );
    }

    let orphans = mirrors.len() - used.len();
    if orphans > 0 {
        warn!("{orphans} mirrored rows have no canonical counterpart and were skipped");
    }
    Ok(columns)
}

fn pair_by_position(parts: Partitioned) -> Result<Columns> {
    if parts.canonical.len() != parts.mirrored.len() {
        return Err(Error::PartitionMismatch {
            canonical: parts.canonical.len(),
            mirrored: parts.mirrored.len(),
        });
    }
    let mut columns = Columns::with_capacity(parts.canonical.len());
    for (row, mirror) in parts.canonical.into_iter().zip(parts.mirrored) {
        columns.push(row.name, row.tag, row.landmarks, mirror.landmarks);
    }
    Ok(columns)
}
