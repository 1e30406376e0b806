use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::augment::AugmentationSpec;
use crate::error::{Error, Result};
use crate::window::WindowSpec;

/// Identifier shared by all tiles of one geographic area across collections.
/// Substituted into each collection's filename template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TileId {
    Number(i64),
    Name(String),
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileId::Number(n) => write!(f, "{}", n),
            TileId::Name(s) => write!(f, "{}", s),
        }
    }
}

/// One named group of same-purpose tiles, e.g. "rgb" or "ground_truth".
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    pub source_dir: PathBuf,
    /// Filename pattern with a `{}` placeholder for the tile id,
    /// e.g. `top_mosaic_09cm_area{}.png`.
    pub filename_template: String,
}

impl CollectionConfig {
    /// Path of the tile file for `id` inside this collection.
    pub fn tile_path(&self, id: &TileId) -> PathBuf {
        let file = self.filename_template.replace("{}", &id.to_string());
        self.source_dir.join(file)
    }
}

/// Full run description, loaded from a TOML file before any processing.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub dataset_name: String,
    pub output_dir: PathBuf,
    /// Spatial patch size as (height, width).
    pub patch_size: (usize, usize),
    /// Corner step for the train split; the test split always tiles with
    /// stride = patch width.
    pub stride: usize,
    #[serde(default)]
    pub rotation_angles: Vec<f32>,
    #[serde(default)]
    pub vertical_flip: bool,
    #[serde(default)]
    pub horizontal_flip: bool,
    pub collections: Vec<CollectionConfig>,
    pub train_ids: Vec<TileId>,
    pub test_ids: Vec<TileId>,
}

impl DatasetConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::InvalidConfig {
            field: "toml",
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject malformed values before any image I/O happens, so a bad run
    /// never leaves a partial output directory behind.
    pub fn validate(&self) -> Result<()> {
        if self.dataset_name.is_empty() {
            return invalid("dataset_name", "must not be empty");
        }
        let (h, w) = self.patch_size;
        if h == 0 || w == 0 {
            return invalid("patch_size", format!("both dimensions must be >= 1, got ({}, {})", h, w));
        }
        if self.stride == 0 {
            return invalid("stride", "must be >= 1");
        }
        if self.collections.is_empty() {
            return invalid("collections", "at least one collection is required");
        }
        for collection in &self.collections {
            if collection.name.is_empty() {
                return invalid("collections.name", "must not be empty");
            }
            if !collection.filename_template.contains("{}") {
                return invalid(
                    "collections.filename_template",
                    format!("missing {{}} placeholder in {:?}", collection.filename_template),
                );
            }
            let duplicates = self
                .collections
                .iter()
                .filter(|c| c.name == collection.name)
                .count();
            if duplicates > 1 {
                return invalid(
                    "collections.name",
                    format!("duplicate collection name {:?}", collection.name),
                );
            }
        }
        for &angle in &self.rotation_angles {
            if !angle.is_finite() {
                return invalid("rotation_angles", format!("angle must be finite, got {}", angle));
            }
        }
        Ok(())
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Overlapping scan geometry for the train split.
    pub fn train_window(&self) -> WindowSpec {
        WindowSpec::overlapping(self.patch_size.0, self.patch_size.1, self.stride)
    }

    /// Non-overlapping tiling geometry for the test split.
    pub fn test_window(&self) -> WindowSpec {
        WindowSpec::tiling(self.patch_size.0, self.patch_size.1)
    }

    /// Full augmentation applied to train patches.
    pub fn train_augmentation(&self) -> AugmentationSpec {
        AugmentationSpec {
            rotation_angles: self.rotation_angles.clone(),
            vertical_flip: self.vertical_flip,
            horizontal_flip: self.horizontal_flip,
        }
    }
}

fn invalid<T>(field: &'static str, reason: impl Into<String>) -> Result<T> {
    Err(Error::InvalidConfig {
        field,
        reason: reason.into(),
    })
}
