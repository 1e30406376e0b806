use std::path::PathBuf;

use thiserror::Error;

/// Error taxonomy for the dataset pipeline.
///
/// None of these are retried: configuration and precondition failures are
/// raised before any image I/O begins, and I/O failures abort the run.
#[derive(Error, Debug)]
pub enum Error {
    /// The output directory already exists. Refusing to write prevents a new
    /// dataset from being mixed into (or overwriting) a previous one.
    #[error("output directory {path} already exists, refusing to overwrite")]
    OutputDirExists { path: PathBuf },

    /// A configuration value that can never produce a valid dataset.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Failed to decode a tile image.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode a patch image.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Patch channel count the encoder has no raster format for.
    #[error("cannot encode image with {channels} channels")]
    UnsupportedChannels { channels: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
