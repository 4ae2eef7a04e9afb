use std::collections::BTreeMap;
use std::path::PathBuf;

use image::DynamicImage;
use log::{debug, info};

use crate::acquire::{self, Fetch};
use crate::config::DatasetConfig;
use crate::data::filter::{apply_mask, complete_mask, keep_mask, not_named_mask};
use crate::data::loader;
use crate::data::model::{tag_counts, Columns, Landmarks, RecordRef, NUM_LANDMARKS};
use crate::data::topology;
use crate::error::Result;
use crate::images::{self, Images};

// ---------------------------------------------------------------------------
// MuctDataset – the landmark dataset and everything done to it
// ---------------------------------------------------------------------------

/// The MUCT landmark dataset.
///
/// Records are kept as four aligned arrays (names, tags, canonical landmarks,
/// mirrored landmarks). `load` fills them from the landmark table, `clean`
/// and `ignore` shrink all four together.
///
/// Not meant for concurrent use: curation mutates the arrays in place, and
/// the borrow checker keeps iterators and mutation apart.
#[derive(Debug, Clone, Default)]
pub struct MuctDataset {
    config: DatasetConfig,
    columns: Columns,
}

impl MuctDataset {
    /// Mesh edges between landmark indices, for drawing.
    pub const PAIRS: &'static [(usize, usize)] = &topology::PAIRS;

    /// `SYMMETRY[i]` is the index point `i` takes in the mirrored face.
    pub const SYMMETRY: &'static [usize; NUM_LANDMARKS] = &topology::SYMMETRY;

    pub fn new(config: DatasetConfig) -> Self {
        Self {
            config,
            columns: Columns::default(),
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Absolute dataset root.
    pub fn root(&self) -> PathBuf {
        self.config.root()
    }

    // -- acquisition --

    /// Delete the dataset directory, fetch it anew and unpack its archives.
    ///
    /// Destructive: everything under [`root`](Self::root) is removed first.
    pub fn download(&self) -> Result<()> {
        self.download_with(&acquire::GitFetcher::default())
    }

    /// [`download`](Self::download) with a custom fetch mechanism.
    pub fn download_with(&self, fetcher: &dyn Fetch) -> Result<()> {
        acquire::download(&self.root(), &self.config.url, fetcher)
    }

    // -- loading --

    /// Replace all records with the contents of the landmark table.
    ///
    /// Afterwards runs `clean` when `clean_on_load` is set and drops every
    /// name listed in `ignore`.
    pub fn load(&mut self) -> Result<()> {
        topology::ensure_valid()?;
        self.config.validate()?;
        self.columns = loader::load_table(
            &self.config.landmarks_path(),
            &self.config.mirror_prefix,
            self.config.pairing,
        )?;
        if self.config.clean_on_load {
            self.clean();
        }
        let ignored = self.config.ignore.clone();
        self.ignore_all(ignored.iter().map(String::as_str));
        Ok(())
    }

    // -- curation --

    /// Keep only records matching `keep`. Returns the number removed.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(RecordRef<'_>) -> bool,
    {
        let mask = keep_mask(&self.columns, keep);
        apply_mask(&mut self.columns, &mask)
    }

    /// Drop records whose canonical landmarks contain a missing point.
    ///
    /// Only the canonical landmarks decide; a record's mirrored landmarks
    /// leave with it but are never inspected themselves.
    pub fn clean(&mut self) -> usize {
        let mask = complete_mask(&self.columns);
        let removed = apply_mask(&mut self.columns, &mask);
        info!("clean: removed {removed} incomplete records, {} left", self.len());
        removed
    }

    /// Drop every record called `name`. Absent names are a no-op.
    pub fn ignore(&mut self, name: &str) -> usize {
        let mask = not_named_mask(&self.columns, name);
        let removed = apply_mask(&mut self.columns, &mask);
        debug!("ignore {name}: removed {removed}");
        removed
    }

    pub fn ignore_all<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) -> usize {
        names.into_iter().map(|name| self.ignore(name)).sum()
    }

    // -- access --

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.columns.names
    }

    pub fn tags(&self) -> &[String] {
        &self.columns.tags
    }

    pub fn landmarks(&self) -> &[Landmarks] {
        &self.columns.landmarks
    }

    pub fn landmarks_flip(&self) -> &[Landmarks] {
        &self.columns.landmarks_flip
    }

    pub fn get(&self, idx: usize) -> Option<RecordRef<'_>> {
        self.columns.get(idx)
    }

    /// Records in order, zipped across the four arrays.
    pub fn iter_data(&self) -> impl ExactSizeIterator<Item = RecordRef<'_>> + '_ {
        let c = &self.columns;
        c.names
            .iter()
            .zip(&c.tags)
            .zip(&c.landmarks)
            .zip(&c.landmarks_flip)
            .map(|(((name, tag), landmarks), landmarks_flip)| RecordRef {
                name: name.as_str(),
                tag: tag.as_str(),
                landmarks,
                landmarks_flip,
            })
    }

    /// Canonical landmarks of every record followed by their mirrored
    /// landmarks: `2 * len()` entries.
    pub fn all_landmarks(&self) -> Vec<Landmarks> {
        self.columns
            .landmarks
            .iter()
            .chain(&self.columns.landmarks_flip)
            .cloned()
            .collect()
    }

    /// How many records carry each tag.
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        tag_counts(self.columns.tags.iter().map(String::as_str))
    }

    /// Decode the image of record `name`, mirrored when `flip` is set.
    ///
    /// Works without a prior `load`, so the config is checked here too.
    pub fn image(&self, name: &str, flip: bool) -> Result<DynamicImage> {
        self.config.validate()?;
        images::open_image(&self.config.image_path(name), flip)
    }

    /// Lazily decode every record image, then every mirrored image when
    /// `mirror` is set. See [`Images`].
    pub fn iter_images(&self, mirror: bool) -> Images<'_> {
        Images::new(&self.config, &self.columns.names, mirror)
    }
}
