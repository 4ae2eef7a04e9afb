//! Static landmark topology of the MUCT 76-point layout.
//!
//! [`PAIRS`] lists the mesh edges used to draw a face (jaw, eyebrows, eyes,
//! nose, lips). [`SYMMETRY`] maps every point index to the index it takes
//! under a horizontal mirror. Points without a counterpart (nose ridge,
//! lip centres) map to themselves.

use std::sync::OnceLock;

use super::model::{Landmarks, Point, NUM_LANDMARKS};
use crate::error::{Error, Result};

/// Mesh edges between landmark indices.
#[rustfmt::skip]
pub const PAIRS: [(usize, usize); 74] = [
    // jaw
    (0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7),
    (7, 8), (8, 9), (9, 10), (10, 11), (11, 12), (12, 13), (13, 14),
    // right eyebrow
    (15, 16), (16, 17), (17, 18), (18, 19), (19, 20), (20, 15),
    // left eyebrow
    (21, 22), (22, 23), (23, 24), (24, 25), (25, 26), (26, 21),
    // left eye
    (27, 68), (68, 28), (28, 69), (69, 29),
    (29, 70), (70, 30), (30, 71), (71, 27),
    // right eye
    (32, 72), (72, 33), (33, 73), (73, 34),
    (34, 74), (74, 35), (35, 75), (75, 32),
    // nose
    (37, 38), (38, 39), (39, 40), (40, 41),
    (41, 42), (42, 43), (43, 44), (44, 45),
    // nose tip
    (41, 46), (46, 67), (67, 47), (47, 41),
    // upper lip
    (48, 49), (49, 50), (50, 51), (51, 52), (52, 53), (53, 54),
    (48, 65), (65, 64), (64, 63), (63, 54),
    // lower lip
    (54, 55), (55, 56), (56, 57), (57, 58), (58, 59), (59, 48),
    (48, 60), (60, 61), (61, 62), (62, 54),
];

/// `SYMMETRY[i]` is the index point `i` moves to in the mirrored face.
#[rustfmt::skip]
pub const SYMMETRY: [usize; NUM_LANDMARKS] = [
    14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 21,
    22, 23, 24, 25, 26, 15, 16, 17, 18, 19, 20, 32, 33, 34,
    35, 36, 27, 28, 29, 30, 31, 45, 44, 43, 42, 41, 40, 39,
    38, 37, 47, 46, 54, 53, 52, 51, 50, 49, 48, 59, 58, 57,
    56, 55, 62, 61, 60, 65, 64, 63, 66, 67, 72, 73, 74, 75,
    68, 69, 70, 71,
];

/// Check that `symmetry` is a self-inverse permutation of `0..len`.
pub fn validate_symmetry(symmetry: &[usize]) -> Result<()> {
    let n = symmetry.len();
    let mut seen = vec![false; n];
    for (i, &j) in symmetry.iter().enumerate() {
        if j >= n {
            return Err(Error::Topology(format!(
                "symmetry[{i}] = {j} is out of range 0..{n}"
            )));
        }
        if std::mem::replace(&mut seen[j], true) {
            return Err(Error::Topology(format!("index {j} appears twice in symmetry")));
        }
    }
    for (i, &j) in symmetry.iter().enumerate() {
        if symmetry[j] != i {
            return Err(Error::Topology(format!(
                "symmetry is not self-inverse at {i}: {i} -> {j} -> {}",
                symmetry[j]
            )));
        }
    }
    Ok(())
}

/// Check that every edge joins two distinct in-range points.
pub fn validate_pairs(pairs: &[(usize, usize)], num_points: usize) -> Result<()> {
    for &(a, b) in pairs {
        if a >= num_points || b >= num_points {
            return Err(Error::Topology(format!(
                "edge ({a}, {b}) references a point outside 0..{num_points}"
            )));
        }
        if a == b {
            return Err(Error::Topology(format!("edge ({a}, {b}) is a self loop")));
        }
    }
    Ok(())
}

/// Validate the static tables once per process.
pub fn ensure_valid() -> Result<()> {
    static CHECKED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    CHECKED
        .get_or_init(|| {
            validate_symmetry(&SYMMETRY)
                .and_then(|()| validate_pairs(&PAIRS, NUM_LANDMARKS))
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(Error::Topology)
}

impl Landmarks {
    /// Landmarks of the horizontally mirrored image.
    ///
    /// Point `i` of the result is point `SYMMETRY[i]` reflected about the
    /// vertical centre line of an image `image_width` pixels wide. Missing
    /// points stay at the origin. Missingness is read from the source point
    /// only: a real point at `(image_width - 1, 0)` would reflect onto the
    /// missing-point marker and is reported as [`Error::MirrorCollision`].
    pub fn mirrored(&self, image_width: u32) -> Result<Landmarks> {
        let max_x = f64::from(image_width) - 1.0;
        let points = SYMMETRY
            .iter()
            .map(|&src| {
                let p = self[src];
                if p.is_missing() {
                    return Ok(p);
                }
                let q = Point::new(max_x - p.x, p.y);
                if q.is_missing() {
                    return Err(Error::MirrorCollision { index: src });
                }
                Ok(q)
            })
            .collect::<Result<Vec<Point>>>()?;
        Ok(Landmarks { points })
    }
}
