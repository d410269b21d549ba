//! In-memory occupancy volume

use crate::error::{OccupancyError, Result};
use crate::types::{GridShape, ValueRange};
use ndarray::{Array3, ArrayView3, Ix3, IxDyn};
use num_traits::AsPrimitive;
use std::borrow::Cow;

/// A 3D grid of per-voxel occupancy values, shape `(nx, ny, nz)`
///
/// Values are stored as `f32`. Construction from wider element types casts
/// each value; the precision loss is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyVolume {
    data: Array3<f32>,
}

impl OccupancyVolume {
    /// Wrap an existing `f32` array
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Build a volume from any numeric array, casting each element to `f32`
    pub fn from_array<T, S>(array: &ndarray::ArrayBase<S, Ix3>) -> Self
    where
        T: AsPrimitive<f32>,
        S: ndarray::Data<Elem = T>,
    {
        Self {
            data: array.mapv(|v| v.as_()),
        }
    }

    /// Build a volume from a dynamic-rank numeric array, casting each element
    /// to `f32`. Fails with `InvalidDimensions` unless the array has 3 axes.
    pub fn from_dyn<T, S>(array: &ndarray::ArrayBase<S, IxDyn>) -> Result<Self>
    where
        T: AsPrimitive<f32>,
        S: ndarray::Data<Elem = T>,
    {
        let cube = array.view().into_dimensionality::<Ix3>().map_err(|_| {
            OccupancyError::InvalidDimensions(format!(
                "occupancy must be 3-dimensional, got {} dimension(s)",
                array.ndim()
            ))
        })?;
        Ok(Self::from_array(&cube))
    }

    /// Build a volume from values already in flat index-law order
    pub fn from_flat(shape: GridShape, values: Vec<f32>) -> Result<Self> {
        if shape.checked_voxel_count() != Some(values.len()) {
            return Err(OccupancyError::InvalidDimensions(format!(
                "shape {} does not hold {} values",
                shape,
                values.len()
            )));
        }
        let [nx, ny, nz] = shape.dims();
        let data = Array3::from_shape_vec((nx, ny, nz), values)?;
        Ok(Self { data })
    }

    /// A volume of `shape` filled with `value`
    pub fn filled(shape: GridShape, value: f32) -> Self {
        let [nx, ny, nz] = shape.dims();
        Self {
            data: Array3::from_elem((nx, ny, nz), value),
        }
    }

    pub fn shape(&self) -> GridShape {
        let (nx, ny, nz) = self.data.dim();
        GridShape::new(nx, ny, nz)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.data.get((x, y, z)).copied()
    }

    /// Values in flat index-law order. Borrows when the backing array is
    /// already in standard layout.
    pub fn as_flat(&self) -> Cow<'_, [f32]> {
        match self.data.as_slice() {
            Some(slice) => Cow::Borrowed(slice),
            None => Cow::Owned(self.data.iter().copied().collect()),
        }
    }

    /// Observed `[min, max]` over all values, NaNs skipped
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.data.iter().copied())
    }

    /// Number of voxels with a value other than zero
    pub fn count_non_zero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0.0).count()
    }

    pub fn into_array(self) -> Array3<f32> {
        self.data
    }
}

impl From<Array3<f32>> for OccupancyVolume {
    fn from(data: Array3<f32>) -> Self {
        Self::new(data)
    }
}
