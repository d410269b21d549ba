//! Bounds resolution - fills in the spatial fields of a volume source

use crate::config::SourceDefaults;
use crate::error::{OccupancyError, Result};
use crate::source::{VolumeSource, OCCUPANCY_FIELD};
use crate::types::{AxisBounds, GridShape};
use serde::{Deserialize, Serialize};

/// Physical extent of a grid along x, y and z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialBounds {
    pub x: AxisBounds,
    pub y: AxisBounds,
    pub z: AxisBounds,
}

/// Fully populated spatial description of a volume source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGrid {
    pub bounds: SpatialBounds,
    pub voxel_size: f64,
    /// Declared shape. Taken verbatim from the source when present; it is
    /// not reconciled with the occupancy array.
    pub grid_shape: GridShape,
}

impl ResolvedGrid {
    /// Check the declared shape against an actual array shape
    pub fn is_consistent_with(&self, shape: GridShape) -> bool {
        self.grid_shape == shape
    }
}

/// Resolve bounds, voxel size and grid shape using the standard defaults
pub fn resolve_bounds<S: VolumeSource + ?Sized>(source: &S) -> Result<ResolvedGrid> {
    resolve_bounds_with(source, &SourceDefaults::default())
}

/// Resolve bounds, voxel size and grid shape, substituting `defaults` for
/// absent fields. Present values are passed through without validation.
pub fn resolve_bounds_with<S: VolumeSource + ?Sized>(
    source: &S,
    defaults: &SourceDefaults,
) -> Result<ResolvedGrid> {
    let occupancy = source
        .occupancy()
        .ok_or_else(|| OccupancyError::MissingField(OCCUPANCY_FIELD.to_string()))?;

    Ok(ResolvedGrid {
        bounds: SpatialBounds {
            x: source.x_bounds().unwrap_or(defaults.x_bounds),
            y: source.y_bounds().unwrap_or(defaults.y_bounds),
            z: source.z_bounds().unwrap_or(defaults.z_bounds),
        },
        voxel_size: source.voxel_size().unwrap_or(defaults.voxel_size),
        grid_shape: source.grid_shape().unwrap_or_else(|| occupancy.shape()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::OccupancyArchive;
    use crate::volume::OccupancyVolume;

    fn archive() -> OccupancyArchive {
        OccupancyArchive::new(OccupancyVolume::filled(GridShape::new(4, 5, 6), 0.0))
    }

    #[test]
    fn test_defaults_applied() {
        let resolved = resolve_bounds(&archive()).unwrap();
        assert_eq!(resolved.bounds.x, AxisBounds::new(-40.0, 40.0));
        assert_eq!(resolved.bounds.y, AxisBounds::new(-40.0, 40.0));
        assert_eq!(resolved.bounds.z, AxisBounds::new(-1.0, 5.4));
        assert_eq!(resolved.voxel_size, 0.2);
        assert_eq!(resolved.grid_shape, GridShape::new(4, 5, 6));
    }

    #[test]
    fn test_present_fields_pass_through() {
        let source = archive()
            .with_bounds(
                AxisBounds::new(10.0, -10.0),
                AxisBounds::new(0.0, 1.0),
                AxisBounds::new(-3.0, 3.0),
            )
            .with_voxel_size(-1.0);
        let resolved = resolve_bounds(&source).unwrap();
        assert_eq!(resolved.bounds.x, AxisBounds::new(10.0, -10.0));
        assert_eq!(resolved.bounds.z, AxisBounds::new(-3.0, 3.0));
        assert_eq!(resolved.voxel_size, -1.0);
    }

    #[test]
    fn test_declared_shape_is_authoritative() {
        let source = archive().with_grid_shape(GridShape::new(8, 8, 8));
        let resolved = resolve_bounds(&source).unwrap();
        assert_eq!(resolved.grid_shape, GridShape::new(8, 8, 8));
        assert!(!resolved.is_consistent_with(GridShape::new(4, 5, 6)));
    }

    #[test]
    fn test_missing_occupancy() {
        let source = OccupancyArchive::default().with_voxel_size(0.1);
        match resolve_bounds(&source) {
            Err(OccupancyError::MissingField(field)) => assert_eq!(field, "occupancy"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = SourceDefaults::default().with_voxel_size(0.4);
        let resolved = resolve_bounds_with(&archive(), &defaults).unwrap();
        assert_eq!(resolved.voxel_size, 0.4);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let source = archive();
        assert_eq!(resolve_bounds(&source).unwrap(), resolve_bounds(&source).unwrap());
    }
}
