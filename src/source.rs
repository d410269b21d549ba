//! Volume sources - where an occupancy grid and its spatial fields come from

use crate::error::{OccupancyError, Result};
use crate::types::{AxisBounds, GridShape};
use crate::volume::OccupancyVolume;
use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError, ReadableElement};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

/// Archive entry holding the mandatory 3D grid
pub const OCCUPANCY_FIELD: &str = "occupancy";
pub const X_BOUNDS_FIELD: &str = "x_bounds";
pub const Y_BOUNDS_FIELD: &str = "y_bounds";
pub const Z_BOUNDS_FIELD: &str = "z_bounds";
pub const VOXEL_SIZE_FIELD: &str = "voxel_size";
pub const GRID_SHAPE_FIELD: &str = "grid_shape";

/// A provider of an occupancy grid plus optional spatial metadata.
///
/// Only `occupancy` is mandatory. Every other accessor returns `None` when
/// the source does not carry the field; defaults are applied by
/// [`crate::bounds::resolve_bounds`], not here.
pub trait VolumeSource {
    fn occupancy(&self) -> Option<&OccupancyVolume>;

    fn x_bounds(&self) -> Option<AxisBounds> {
        None
    }

    fn y_bounds(&self) -> Option<AxisBounds> {
        None
    }

    fn z_bounds(&self) -> Option<AxisBounds> {
        None
    }

    fn voxel_size(&self) -> Option<f64> {
        None
    }

    /// Declared grid shape, authoritative when present even if it differs
    /// from the occupancy array's shape
    fn grid_shape(&self) -> Option<GridShape> {
        None
    }
}

/// Fully loaded contents of a source archive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupancyArchive {
    pub occupancy: Option<OccupancyVolume>,
    pub x_bounds: Option<AxisBounds>,
    pub y_bounds: Option<AxisBounds>,
    pub z_bounds: Option<AxisBounds>,
    pub voxel_size: Option<f64>,
    pub grid_shape: Option<GridShape>,
}

impl OccupancyArchive {
    /// An archive carrying only the occupancy grid
    pub fn new(occupancy: OccupancyVolume) -> Self {
        Self {
            occupancy: Some(occupancy),
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, x: AxisBounds, y: AxisBounds, z: AxisBounds) -> Self {
        self.x_bounds = Some(x);
        self.y_bounds = Some(y);
        self.z_bounds = Some(z);
        self
    }

    pub fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = Some(voxel_size);
        self
    }

    pub fn with_grid_shape(mut self, grid_shape: GridShape) -> Self {
        self.grid_shape = Some(grid_shape);
        self
    }

    /// Load an `.npz` archive from disk.
    ///
    /// Fails with `NotFound` before opening anything if `path` does not exist.
    pub fn load_npz(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OccupancyError::NotFound(format!(
                "occupancy file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "loading occupancy archive");
        Self::read_npz(File::open(path)?)
    }

    /// Read an `.npz` archive from any seekable reader
    pub fn read_npz<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut npz = NpzReader::new(reader)?;
        let names = npz.names()?;

        let occupancy = match entry_name(&names, OCCUPANCY_FIELD) {
            Some(entry) => Some(read_occupancy(&mut npz, &entry)?),
            None => None,
        };

        let archive = Self {
            occupancy,
            x_bounds: read_pair(&mut npz, &names, X_BOUNDS_FIELD)?,
            y_bounds: read_pair(&mut npz, &names, Y_BOUNDS_FIELD)?,
            z_bounds: read_pair(&mut npz, &names, Z_BOUNDS_FIELD)?,
            voxel_size: read_scalar(&mut npz, &names, VOXEL_SIZE_FIELD)?,
            grid_shape: read_shape(&mut npz, &names, GRID_SHAPE_FIELD)?,
        };

        if let Some(volume) = &archive.occupancy {
            debug!(shape = %volume.shape(), entries = names.len(), "archive loaded");
        }
        Ok(archive)
    }
}

impl VolumeSource for OccupancyArchive {
    fn occupancy(&self) -> Option<&OccupancyVolume> {
        self.occupancy.as_ref()
    }

    fn x_bounds(&self) -> Option<AxisBounds> {
        self.x_bounds
    }

    fn y_bounds(&self) -> Option<AxisBounds> {
        self.y_bounds
    }

    fn z_bounds(&self) -> Option<AxisBounds> {
        self.z_bounds
    }

    fn voxel_size(&self) -> Option<f64> {
        self.voxel_size
    }

    fn grid_shape(&self) -> Option<GridShape> {
        self.grid_shape
    }
}

/// Find the zip entry for `field`, with or without the `.npy` suffix
fn entry_name(names: &[String], field: &str) -> Option<String> {
    let with_suffix = format!("{}.npy", field);
    names
        .iter()
        .find(|name| name.as_str() == field || *name == &with_suffix)
        .cloned()
}

/// Read `entry` as element type `T`.
///
/// `Ok(None)` means the entry holds a different dtype and the caller may try
/// another one. Every other failure (corrupt zip data, bad header) is an error.
fn read_as<R, T>(npz: &mut NpzReader<R>, entry: &str) -> Result<Option<ArrayD<T>>>
where
    R: Read + Seek,
    T: ReadableElement,
{
    match npz.by_name::<OwnedRepr<T>, IxDyn>(entry) {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Read the occupancy entry from any supported element type, cast to `f32`
fn read_occupancy<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    entry: &str,
) -> Result<OccupancyVolume> {
    if let Some(array) = read_as::<R, f32>(npz, entry)? {
        return OccupancyVolume::from_dyn(&array);
    }
    if let Some(array) = read_as::<R, f64>(npz, entry)? {
        return OccupancyVolume::from_dyn(&array);
    }
    if let Some(array) = read_as::<R, i64>(npz, entry)? {
        return OccupancyVolume::from_dyn(&array);
    }
    if let Some(array) = read_as::<R, i32>(npz, entry)? {
        return OccupancyVolume::from_dyn(&array);
    }
    if let Some(array) = read_as::<R, u8>(npz, entry)? {
        return OccupancyVolume::from_dyn(&array);
    }
    if let Some(array) = read_as::<R, bool>(npz, entry)? {
        return OccupancyVolume::from_dyn(&array.mapv(u8::from));
    }
    Err(invalid(OCCUPANCY_FIELD, "unsupported element type".to_string()))
}

/// Read a numeric entry as flat `f64` values
fn read_values<R: Read + Seek>(npz: &mut NpzReader<R>, entry: &str) -> Result<Vec<f64>> {
    if let Some(array) = read_as::<R, f64>(npz, entry)? {
        return Ok(array.iter().copied().collect());
    }
    if let Some(array) = read_as::<R, f32>(npz, entry)? {
        return Ok(array.iter().map(|&v| v as f64).collect());
    }
    if let Some(array) = read_as::<R, i32>(npz, entry)? {
        return Ok(array.iter().map(|&v| v as f64).collect());
    }
    if let Some(array) = read_as::<R, i64>(npz, entry)? {
        return Ok(array.iter().map(|&v| v as f64).collect());
    }
    Err(invalid(entry, "expected a numeric entry".to_string()))
}

fn read_pair<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    names: &[String],
    field: &str,
) -> Result<Option<AxisBounds>> {
    let Some(entry) = entry_name(names, field) else {
        return Ok(None);
    };
    match read_values(npz, &entry)?.as_slice() {
        &[min, max] => Ok(Some(AxisBounds::new(min, max))),
        other => Err(invalid(field, format!("expected 2 values, got {}", other.len()))),
    }
}

fn read_scalar<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    names: &[String],
    field: &str,
) -> Result<Option<f64>> {
    let Some(entry) = entry_name(names, field) else {
        return Ok(None);
    };
    match read_values(npz, &entry)?.as_slice() {
        &[value] => Ok(Some(value)),
        other => Err(invalid(field, format!("expected a scalar, got {} values", other.len()))),
    }
}

fn read_shape<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    names: &[String],
    field: &str,
) -> Result<Option<GridShape>> {
    let Some(entry) = entry_name(names, field) else {
        return Ok(None);
    };
    let values = read_values(npz, &entry)?;
    let dims: Vec<usize> = values
        .iter()
        .map(|&v| {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(invalid(field, format!("{} is not a valid axis length", v)))
            }
        })
        .collect::<Result<_>>()?;
    match dims.as_slice() {
        &[nx, ny, nz] => Ok(Some(GridShape::new(nx, ny, nz))),
        other => Err(invalid(field, format!("expected 3 values, got {}", other.len()))),
    }
}

fn invalid(field: &str, reason: String) -> OccupancyError {
    OccupancyError::InvalidField {
        field: field.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr0, arr1, Array3};
    use ndarray_npy::NpzWriter;
    use std::io::Cursor;

    fn npz_bytes(write: impl FnOnce(&mut NpzWriter<Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut writer = NpzWriter::new(Cursor::new(Vec::new()));
        write(&mut writer);
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_full_archive() {
        let bytes = npz_bytes(|npz| {
            npz.add_array("occupancy", &Array3::<f64>::from_elem((2, 3, 4), 0.25))
                .unwrap();
            npz.add_array("x_bounds", &arr1(&[-10.0f64, 10.0])).unwrap();
            npz.add_array("y_bounds", &arr1(&[-5.0f64, 5.0])).unwrap();
            npz.add_array("z_bounds", &arr1(&[0.0f64, 2.0])).unwrap();
            npz.add_array("voxel_size", &arr0(0.5f64)).unwrap();
            npz.add_array("grid_shape", &arr1(&[2i64, 3, 4])).unwrap();
        });

        let archive = OccupancyArchive::read_npz(Cursor::new(bytes)).unwrap();
        let volume = archive.occupancy().unwrap();
        assert_eq!(volume.shape(), GridShape::new(2, 3, 4));
        assert_eq!(volume.get(1, 2, 3), Some(0.25));
        assert_eq!(archive.x_bounds(), Some(AxisBounds::new(-10.0, 10.0)));
        assert_eq!(archive.z_bounds(), Some(AxisBounds::new(0.0, 2.0)));
        assert_eq!(archive.voxel_size(), Some(0.5));
        assert_eq!(archive.grid_shape(), Some(GridShape::new(2, 3, 4)));
    }

    #[test]
    fn test_read_occupancy_only() {
        let bytes = npz_bytes(|npz| {
            npz.add_array("occupancy", &Array3::<u8>::ones((1, 1, 2))).unwrap();
        });
        let archive = OccupancyArchive::read_npz(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.occupancy().unwrap().get(0, 0, 1), Some(1.0));
        assert_eq!(archive.x_bounds(), None);
        assert_eq!(archive.voxel_size(), None);
        assert_eq!(archive.grid_shape(), None);
    }

    #[test]
    fn test_missing_occupancy_is_not_an_archive_error() {
        let bytes = npz_bytes(|npz| {
            npz.add_array("voxel_size", &arr0(0.1f64)).unwrap();
        });
        let archive = OccupancyArchive::read_npz(Cursor::new(bytes)).unwrap();
        assert!(archive.occupancy().is_none());
    }

    #[test]
    fn test_malformed_bounds() {
        let bytes = npz_bytes(|npz| {
            npz.add_array("occupancy", &Array3::<f32>::zeros((1, 1, 1))).unwrap();
            npz.add_array("x_bounds", &arr1(&[1.0f64, 2.0, 3.0])).unwrap();
        });
        let result = OccupancyArchive::read_npz(Cursor::new(bytes));
        assert!(matches!(result, Err(OccupancyError::InvalidField { .. })));
    }

    #[test]
    fn test_occupancy_element_types() {
        let bytes = npz_bytes(|npz| {
            npz.add_array("occupancy", &Array3::<i64>::from_elem((2, 1, 1), 3))
                .unwrap();
        });
        let archive = OccupancyArchive::read_npz(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.occupancy().unwrap().get(1, 0, 0), Some(3.0));

        let mut mask = Array3::<bool>::from_elem((1, 2, 2), false);
        mask[(0, 1, 0)] = true;
        let bytes = npz_bytes(|npz| npz.add_array("occupancy", &mask).unwrap());
        let volume = OccupancyArchive::read_npz(Cursor::new(bytes))
            .unwrap()
            .occupancy
            .unwrap();
        assert_eq!(volume.get(0, 1, 0), Some(1.0));
        assert_eq!(volume.count_non_zero(), 1);
    }

    #[test]
    fn test_occupancy_must_be_three_dimensional() {
        let bytes = npz_bytes(|npz| {
            npz.add_array("occupancy", &ndarray::Array2::<f64>::zeros((4, 4)))
                .unwrap();
        });
        let result = OccupancyArchive::read_npz(Cursor::new(bytes));
        assert!(matches!(result, Err(OccupancyError::InvalidDimensions(_))));
    }

    #[test]
    fn test_unsupported_occupancy_dtype() {
        let bytes = npz_bytes(|npz| {
            npz.add_array("occupancy", &Array3::<u16>::zeros((1, 1, 1))).unwrap();
        });
        let result = OccupancyArchive::read_npz(Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(OccupancyError::InvalidField { ref field, .. }) if field == OCCUPANCY_FIELD
        ));
    }

    #[test]
    fn test_corrupt_entry_is_not_a_dtype_mismatch() {
        let mut bytes = npz_bytes(|npz| {
            npz.add_array("occupancy", &Array3::<f64>::zeros((2, 3, 4))).unwrap();
        });
        // The header now declares more elements than the entry stores.
        let at = bytes.windows(9).position(|w| w == b"(2, 3, 4)").unwrap();
        bytes[at..at + 9].copy_from_slice(b"(2, 3, 5)");

        match OccupancyArchive::read_npz(Cursor::new(bytes)) {
            Err(OccupancyError::Archive(message)) => assert!(!message.contains("descriptor")),
            other => panic!("expected an archive error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_npz_missing_file() {
        let result = OccupancyArchive::load_npz("/nonexistent/occupancy.npz");
        assert!(matches!(result, Err(OccupancyError::NotFound(_))));
    }

    #[test]
    fn test_entry_name_suffix() {
        let names = vec!["occupancy.npy".to_string(), "voxel_size".to_string()];
        assert_eq!(entry_name(&names, "occupancy").as_deref(), Some("occupancy.npy"));
        assert_eq!(entry_name(&names, "voxel_size").as_deref(), Some("voxel_size"));
        assert_eq!(entry_name(&names, "grid_shape"), None);
    }
}
