use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dataset directory used when none is configured.
pub const DEFAULT_DATA_DIR: &str = "data/muct";

/// Repository the MUCT dataset is cloned from.
pub const DEFAULT_URL: &str = "https://github.com/StephenMilborrow/muct.git";

/// How canonical rows are matched with their mirrored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    /// Join on the subject key shared by both names (`i000qa-fn` / `ir000qa-fn`).
    #[default]
    BySubject,
    /// Pair the n-th canonical row with the n-th mirrored row.
    Positional,
}

/// Where the dataset lives and how it is read.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Dataset root. Relative paths are resolved against the crate root.
    pub data_dir: PathBuf,
    pub url: String,
    /// Landmark table, relative to the dataset root.
    pub landmarks_file: PathBuf,
    /// Image directory, relative to the dataset root.
    pub image_dir: PathBuf,
    pub image_ext: String,
    /// Names starting with this prefix are mirrored-image rows.
    pub mirror_prefix: String,
    pub pairing: Pairing,
    /// Run `clean()` right after every load.
    pub clean_on_load: bool,
    /// Record names dropped right after every load.
    pub ignore: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            url: DEFAULT_URL.to_string(),
            landmarks_file: PathBuf::from("muct-landmarks/muct76-opencv.csv"),
            image_dir: PathBuf::from("jpg"),
            image_ext: "jpg".to_string(),
            mirror_prefix: "ir".to_string(),
            pairing: Pairing::default(),
            clean_on_load: false,
            ignore: Vec::new(),
        }
    }
}

impl DatasetConfig {
    /// Config rooted at `data_dir`, everything else default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Read a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mirror_prefix.is_empty() {
            return Err(Error::Config("mirror_prefix must not be empty".into()));
        }
        if self.landmarks_file.is_absolute() || self.image_dir.is_absolute() {
            return Err(Error::Config(
                "landmarks_file and image_dir must be relative to data_dir".into(),
            ));
        }
        Ok(())
    }

    /// Absolute dataset root.
    ///
    /// A relative `data_dir` is anchored at the crate manifest directory so the
    /// result never depends on the process working directory.
    pub fn root(&self) -> PathBuf {
        if self.data_dir.is_absolute() {
            self.data_dir.clone()
        } else {
            Path::new(env!("CARGO_MANIFEST_DIR")).join(&self.data_dir)
        }
    }

    pub fn landmarks_path(&self) -> PathBuf {
        self.root().join(&self.landmarks_file)
    }

    /// Image file of the record called `name`.
    pub fn image_path(&self, name: &str) -> PathBuf {
        self.root()
            .join(&self.image_dir)
            .join(format!("{name}.{}", self.image_ext))
    }
}
