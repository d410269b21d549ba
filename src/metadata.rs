//! Metadata document paired with a binary occupancy payload

use crate::bounds::{ResolvedGrid, SpatialBounds};
use crate::error::{OccupancyError, Result};
use crate::types::{GridShape, ValueRange};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Companion record describing a binary occupancy payload.
///
/// The payload itself is never embedded; `occupancy_file` names it by base
/// file name so the pair can be moved together. Field order in the JSON
/// document is not significant, field names and types are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyMetadata {
    /// Base name of the paired binary artifact
    pub occupancy_file: String,

    /// Declared grid shape `(nx, ny, nz)`
    pub grid_shape: GridShape,

    /// Physical extent along each axis
    pub bounds: SpatialBounds,

    /// Edge length of one voxel
    pub voxel_size: f64,

    /// Observed `[min, max]` over all payload values
    pub occupancy_range: ValueRange,
}

impl OccupancyMetadata {
    /// Create metadata for a resolved grid
    pub fn new(
        occupancy_file: impl Into<String>,
        grid: &ResolvedGrid,
        occupancy_range: ValueRange,
    ) -> Self {
        Self {
            occupancy_file: occupancy_file.into(),
            grid_shape: grid.grid_shape,
            bounds: grid.bounds,
            voxel_size: grid.voxel_size,
            occupancy_range,
        }
    }

    /// Point the record at a different binary artifact
    pub fn with_occupancy_file(mut self, occupancy_file: impl Into<String>) -> Self {
        self.occupancy_file = occupancy_file.into();
        self
    }

    /// Byte length the paired payload must have, `None` when `grid_shape`
    /// describes more bytes than the platform can address
    pub fn expected_payload_len(&self) -> Option<usize> {
        self.grid_shape.checked_byte_len()
    }

    /// The spatial fields as a [`ResolvedGrid`]
    pub fn grid(&self) -> ResolvedGrid {
        ResolvedGrid {
            bounds: self.bounds,
            voxel_size: self.voxel_size,
            grid_shape: self.grid_shape,
        }
    }

    /// Check that `occupancy_file` is a bare file name, not a path
    pub fn validate_file_name(&self) -> Result<()> {
        let is_base_name = Path::new(&self.occupancy_file)
            .file_name()
            .is_some_and(|name| name == self.occupancy_file.as_str());
        if is_base_name {
            Ok(())
        } else {
            Err(OccupancyError::InvalidField {
                field: "occupancy_file".to_string(),
                reason: format!("'{}' is not a base file name", self.occupancy_file),
            })
        }
    }

    /// Serialize as an indented JSON document
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse a JSON metadata document
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
