//! Record images: decode on demand, optionally mirrored.
//!
//! Nothing is cached. Every call and every iterator step reads and decodes
//! the file again.

use std::path::Path;

use image::DynamicImage;

use crate::config::DatasetConfig;
use crate::error::{Error, Result};

/// Decode the image at `path`, mirrored horizontally when `flip` is set.
pub fn open_image(path: &Path, flip: bool) -> Result<DynamicImage> {
    let img = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(if flip { img.fliph() } else { img })
}

/// Lazy, single-pass sequence of record images.
///
/// Yields every record's image in order, then, when mirroring was requested,
/// every record's mirrored image in the same order. Once drained it stays
/// empty; ask the dataset for a new one to start over.
pub struct Images<'a> {
    config: &'a DatasetConfig,
    names: &'a [String],
    mirror: bool,
    next: usize,
}

impl<'a> Images<'a> {
    pub(crate) fn new(config: &'a DatasetConfig, names: &'a [String], mirror: bool) -> Self {
        Self {
            config,
            names,
            mirror,
            next: 0,
        }
    }

    fn total(&self) -> usize {
        if self.mirror {
            2 * self.names.len()
        } else {
            self.names.len()
        }
    }
}

impl Iterator for Images<'_> {
    type Item = Result<DynamicImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }
        let n = self.names.len();
        let (idx, flip) = if self.next < n {
            (self.next, false)
        } else {
            (self.next - n, true)
        };
        self.next += 1;
        let path = self.config.image_path(&self.names[idx]);
        Some(open_image(&path, flip))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total() - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Images<'_> {}
