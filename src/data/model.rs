use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of landmark points per face in the MUCT 76-point layout.
pub const NUM_LANDMARKS: usize = 76;

// ---------------------------------------------------------------------------
// Point – a single landmark coordinate
// ---------------------------------------------------------------------------

/// A 2D landmark in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unavailable points are stored as the exact origin.
    ///
    /// Only `(0, 0)` counts; a point with a single zero coordinate such as
    /// `(0, 3)` is a real measurement.
    pub fn is_missing(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Landmarks – the full point set of one face
// ---------------------------------------------------------------------------

/// The ordered landmark set of one face, always [`NUM_LANDMARKS`] points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landmarks {
    pub(crate) points: Vec<Point>,
}

impl Landmarks {
    /// Build from a flat `[x0, y0, x1, y1, ...]` slice.
    ///
    /// Returns `None` unless the slice holds exactly `2 * NUM_LANDMARKS` values.
    pub fn from_flat(values: &[f64]) -> Option<Self> {
        if values.len() != 2 * NUM_LANDMARKS {
            return None;
        }
        let points = values
            .chunks_exact(2)
            .map(|xy| Point::new(xy[0], xy[1]))
            .collect();
        Some(Self { points })
    }

    /// Build from points. Returns `None` on a wrong point count.
    pub fn from_points(points: Vec<Point>) -> Option<Self> {
        (points.len() == NUM_LANDMARKS).then_some(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A face is complete when none of its points is missing.
    pub fn is_complete(&self) -> bool {
        !self.points.iter().any(Point::is_missing)
    }

    /// Number of missing points.
    pub fn missing_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_missing()).count()
    }

    /// Flatten back to `[x0, y0, x1, y1, ...]`.
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }
}

impl std::ops::Index<usize> for Landmarks {
    type Output = Point;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

// ---------------------------------------------------------------------------
// RecordRef – one row of the dataset, borrowed across the parallel arrays
// ---------------------------------------------------------------------------

/// A view of one record, zipped from the dataset's parallel arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordRef<'a> {
    pub name: &'a str,
    pub tag: &'a str,
    pub landmarks: &'a Landmarks,
    pub landmarks_flip: &'a Landmarks,
}

// ---------------------------------------------------------------------------
// Columns – the dataset as aligned parallel arrays
// ---------------------------------------------------------------------------

/// Records stored column-wise. All four vectors always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub names: Vec<String>,
    pub tags: Vec<String>,
    pub landmarks: Vec<Landmarks>,
    pub landmarks_flip: Vec<Landmarks>,
}

impl Columns {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            names: Vec::with_capacity(n),
            tags: Vec::with_capacity(n),
            landmarks: Vec::with_capacity(n),
            landmarks_flip: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, name: String, tag: String, landmarks: Landmarks, landmarks_flip: Landmarks) {
        self.names.push(name);
        self.tags.push(tag);
        self.landmarks.push(landmarks);
        self.landmarks_flip.push(landmarks_flip);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        debug_assert!(self.is_aligned());
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the four arrays have equal length.
    pub fn is_aligned(&self) -> bool {
        let n = self.names.len();
        self.tags.len() == n && self.landmarks.len() == n && self.landmarks_flip.len() == n
    }

    /// Borrow record `idx`.
    pub fn get(&self, idx: usize) -> Option<RecordRef<'_>> {
        Some(RecordRef {
            name: self.names.get(idx)?,
            tag: self.tags.get(idx)?,
            landmarks: self.landmarks.get(idx)?,
            landmarks_flip: self.landmarks_flip.get(idx)?,
        })
    }
}

/// Count how often each tag occurs, sorted by tag.
pub fn tag_counts<'a>(tags: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for tag in tags {
        *counts.entry(tag.to_string()).or_insert(0) += 1;
    }
    counts
}
