use super::model::{Columns, RecordRef};

// ---------------------------------------------------------------------------
// Keep-masks: which records survive a curation step
// ---------------------------------------------------------------------------

/// One flag per record; `true` keeps the record.
pub type KeepMask = Vec<bool>;

/// Evaluate `keep` on every record.
pub fn keep_mask<F>(columns: &Columns, mut keep: F) -> KeepMask
where
    F: FnMut(RecordRef<'_>) -> bool,
{
    (0..columns.len())
        .filter_map(|i| columns.get(i))
        .map(|record| keep(record))
        .collect()
}

/// Keep records whose canonical landmarks are complete.
///
/// The mirrored landmarks are not inspected; they follow their canonical
/// record in or out.
pub fn complete_mask(columns: &Columns) -> KeepMask {
    keep_mask(columns, |record| record.landmarks.is_complete())
}

/// Keep every record not called `name`.
pub fn not_named_mask(columns: &Columns, name: &str) -> KeepMask {
    keep_mask(columns, |record| record.name != name)
}

/// Apply `mask` to all four arrays at once. Returns the number of dropped
/// records.
pub fn apply_mask(columns: &mut Columns, mask: &[bool]) -> usize {
    debug_assert_eq!(mask.len(), columns.len());
    let before = columns.len();
    retain_by(&mut columns.names, mask);
    retain_by(&mut columns.tags, mask);
    retain_by(&mut columns.landmarks, mask);
    retain_by(&mut columns.landmarks_flip, mask);
    before - columns.len()
}

fn retain_by<T>(values: &mut Vec<T>, mask: &[bool]) {
    let mut flags = mask.iter();
    values.retain(|_| flags.next().copied().unwrap_or(false));
}
