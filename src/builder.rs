use std::fmt;
use std::fs;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::augment::{self, AugmentationSpec};
use crate::config::{CollectionConfig, DatasetConfig, TileId};
use crate::error::{Error, Result};
use crate::imageio;
use crate::window::{self, WindowSpec};
use crate::Patch;

/// Train/test subset of tile ids; each produces one output subdirectory per
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for finished patches. Patches arrive one at a time in
/// production order, so storage never has to hold a whole split in memory and
/// a future writer (parallel, archive-backed, ...) can be swapped in without
/// touching extraction or augmentation.
pub trait PatchSink {
    fn accept(&mut self, patch: &Patch) -> Result<()>;
}

/// Writes each accepted patch as `<dir>/<index>.png`, numbering from 0 in
/// arrival order.
pub struct DirectorySink {
    dir: PathBuf,
    next_index: usize,
}

impl DirectorySink {
    /// Creates `dir` and an empty sink. The parent run directory must already
    /// exist; `dir` itself must not.
    pub fn create(dir: PathBuf) -> Result<Self> {
        fs::create_dir(&dir)?;
        Ok(Self { dir, next_index: 0 })
    }

    pub fn patches_written(&self) -> usize {
        self.next_index
    }
}

impl PatchSink for DirectorySink {
    fn accept(&mut self, patch: &Patch) -> Result<()> {
        let path = self.dir.join(format!("{}.png", self.next_index));
        imageio::write_image(&path, patch)?;
        self.next_index += 1;
        Ok(())
    }
}

/// Drives the whole run: per collection, per split, read tiles, window them,
/// expand train patches, and stream every variant to the split's sink.
#[derive(Debug)]
pub struct DatasetBuilder {
    config: DatasetConfig,
}

impl DatasetBuilder {
    /// Validates the configuration eagerly; a builder only exists for a
    /// well-formed config.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs the full pipeline. Aborts before creating anything if the output
    /// directory already exists; any later I/O error aborts the run with the
    /// partial output left in place.
    pub fn run(&self) -> Result<()> {
        let out_dir = &self.config.output_dir;
        if out_dir.exists() {
            return Err(Error::OutputDirExists {
                path: out_dir.clone(),
            });
        }
        fs::create_dir_all(out_dir)?;
        self.write_details()?;

        let train_window = self.config.train_window();
        let test_window = self.config.test_window();
        let train_augmentation = self.config.train_augmentation();

        for collection in &self.config.collections {
            info!("==== collection {:?} ====", collection.name);
            self.process_split(
                collection,
                Split::Train,
                &self.config.train_ids,
                &train_window,
                &train_augmentation,
            )?;
            self.process_split(
                collection,
                Split::Test,
                &self.config.test_ids,
                &test_window,
                &AugmentationSpec::identity(),
            )?;
        }
        info!("dataset {:?} complete under {:?}", self.config.dataset_name, out_dir);
        Ok(())
    }

    fn process_split(
        &self,
        collection: &CollectionConfig,
        split: Split,
        ids: &[TileId],
        window: &WindowSpec,
        augmentation: &AugmentationSpec,
    ) -> Result<()> {
        let dir = self
            .config
            .output_dir
            .join(format!("{}_{}", collection.name, split));
        info!(
            "collection {:?} {} split => {} tiles, window {}x{} stride {}, {} variants per patch",
            collection.name,
            split,
            ids.len(),
            window.height,
            window.width,
            window.stride,
            augmentation.variants_per_patch(),
        );
        let mut sink = DirectorySink::create(dir)?;
        produce_split(collection, ids, window, augmentation, &mut sink)?;
        info!(
            "collection {:?} {} split => wrote {} patches",
            collection.name,
            split,
            sink.patches_written(),
        );
        Ok(())
    }

    /// Plain-text run summary at the output root.
    fn write_details(&self) -> Result<()> {
        let config = &self.config;
        let details = format!(
            "dataset: {}\ntrain ids: {}\ntest ids: {}\npatch size: {}x{}\nstride: {}\n",
            config.dataset_name,
            join_ids(&config.train_ids),
            join_ids(&config.test_ids),
            config.patch_size.0,
            config.patch_size.1,
            config.stride,
        );
        fs::write(config.output_dir.join("details.txt"), details)?;
        Ok(())
    }
}

/// Extraction/augmentation loop for one collection split, streaming each
/// finished patch straight into `sink`. Tiles are read one at a time and
/// dropped before the next is decoded, so memory is bounded by a single tile
/// plus one patch.
fn produce_split<S: PatchSink>(
    collection: &CollectionConfig,
    ids: &[TileId],
    window: &WindowSpec,
    augmentation: &AugmentationSpec,
    sink: &mut S,
) -> Result<()> {
    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    for id in ids {
        let path = collection.tile_path(id);
        debug!("reading tile id={} from {:?}", id, path);
        let tile = imageio::read_image(&path)?;
        let patches = window::extract(&tile, window);
        if patches.is_empty() {
            // Window larger than the tile: not fatal, the tile just
            // contributes nothing.
            warn!(
                "tile id={} ({:?}) is {}x{}, smaller than the {}x{} window => no patches",
                id,
                path,
                tile.dim().0,
                tile.dim().1,
                window.height,
                window.width,
            );
        }
        for patch in &patches {
            for variant in augment::expand(patch, augmentation) {
                sink.accept(&variant)?;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

fn join_ids(ids: &[TileId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
