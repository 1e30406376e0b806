pub mod augment;
pub mod builder;
pub mod config;
pub mod error;
pub mod imageio;
pub mod window;

/// Decoded raster tile, shape = (height, width, channels), row-major, 8-bit.
pub type Image = ndarray::Array3<u8>;

/// Fixed-size crop of an [`Image`]; same layout, owns its samples.
pub type Patch = ndarray::Array3<u8>;

pub use builder::{DatasetBuilder, DirectorySink, PatchSink, Split};
pub use config::{CollectionConfig, DatasetConfig, TileId};
pub use error::{Error, Result};
