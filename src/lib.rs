//! occupancy-grid - occupancy voxel grid codec and inspection views
//!
//! Converts a 3D occupancy grid into a pair of artifacts a lightweight client
//! can load directly, and derives 2D views of the same grid for inspection.
//!
//! # Artifacts
//!
//! - `<name>.bin`: raw little-endian f32 values, no header, exactly
//!   `4 * nx * ny * nz` bytes, z varying fastest (see [`layout`])
//! - `<name>.json`: [`OccupancyMetadata`] naming the binary by base file name,
//!   with grid shape, spatial bounds, voxel size and value range
//!
//! # Views
//!
//! Max and mean projections along z, z slices, and a value histogram, all
//! computed from a shared borrow of an [`OccupancyVolume`].
//!
//! # Example
//!
//! ```rust,ignore
//! use occupancy_grid::{codec, FileSystemStore};
//! use std::path::Path;
//!
//! # fn example() -> occupancy_grid::Result<()> {
//! let store = FileSystemStore::default();
//! let report = codec::convert_file(&store, Path::new("scene.npz"), None)?;
//! let (_metadata, volume) = codec::load_grid(&store, &report.paths.metadata)?;
//! let top_down = volume.max_projection();
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod codec;
pub mod config;
pub mod error;
pub mod inspect;
pub mod io;
pub mod layout;
pub mod metadata;
pub mod render;
pub mod source;
pub mod types;
pub mod utils;
pub mod views;
pub mod volume;

// Re-exports
pub use bounds::{resolve_bounds, resolve_bounds_with, ResolvedGrid, SpatialBounds};
pub use codec::{decode, encode, ArtifactPaths, ConversionReport, EncodedGrid};
pub use config::{SourceDefaults, ViewConfig};
pub use error::{OccupancyError, Result};
pub use io::{ArtifactStore, FileSystemStore, MemoryStore};
pub use metadata::OccupancyMetadata;
pub use render::{InspectionReport, Renderer, ReportRenderer};
pub use source::{OccupancyArchive, VolumeSource};
pub use types::{AxisBounds, GridShape, ValueRange};
pub use views::{Histogram, VolumeStats};
pub use volume::OccupancyVolume;

/// Version of the occupancy-grid implementation
pub const OCCUPANCY_GRID_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!OCCUPANCY_GRID_VERSION.is_empty());
    }
}
