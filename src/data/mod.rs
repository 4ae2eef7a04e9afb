/// Data layer: core types, loading, curation and landmark topology.
///
/// Architecture:
/// ```text
///  muct76-opencv.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → partition by name → pair with mirrors
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Columns  │  names / tags / landmarks / landmarks_flip, aligned
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep-mask over records → applied to all four arrays
///   └──────────┘
/// ```
///
/// `topology` holds the static mesh and mirror tables used on the way out.

pub mod filter;
pub mod loader;
pub mod model;
pub mod topology;
