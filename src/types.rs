//! Core data types for occupancy grids

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size in bytes of one encoded voxel (little-endian f32)
pub const VOXEL_BYTES: usize = std::mem::size_of::<f32>();

/// Logical shape of an occupancy grid, `(nx, ny, nz)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridShape([usize; 3]);

impl GridShape {
    /// Create a new grid shape
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self([nx, ny, nz])
    }

    pub fn nx(&self) -> usize {
        self.0[0]
    }

    pub fn ny(&self) -> usize {
        self.0[1]
    }

    pub fn nz(&self) -> usize {
        self.0[2]
    }

    /// Shape as `[nx, ny, nz]`
    pub fn dims(&self) -> [usize; 3] {
        self.0
    }

    /// Total number of voxels.
    ///
    /// Only for shapes backed by an allocated array. Shapes read from a
    /// metadata document go through [`GridShape::checked_voxel_count`].
    pub fn voxel_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Total number of voxels, `None` if it does not fit in `usize`
    pub fn checked_voxel_count(&self) -> Option<usize> {
        if self.is_empty() {
            return Some(0);
        }
        self.0.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    /// Size of the encoded payload in bytes
    pub fn byte_len(&self) -> usize {
        self.voxel_count() * VOXEL_BYTES
    }

    /// Size of the encoded payload in bytes, `None` on overflow
    pub fn checked_byte_len(&self) -> Option<usize> {
        self.checked_voxel_count()?.checked_mul(VOXEL_BYTES)
    }

    /// Check if any axis has zero length
    pub fn is_empty(&self) -> bool {
        self.0.contains(&0)
    }
}

impl From<[usize; 3]> for GridShape {
    fn from(dims: [usize; 3]) -> Self {
        Self(dims)
    }
}

impl From<(usize, usize, usize)> for GridShape {
    fn from((nx, ny, nz): (usize, usize, usize)) -> Self {
        Self([nx, ny, nz])
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} x {}", self.0[0], self.0[1], self.0[2])
    }
}

/// Physical extent along one axis, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Length of the extent (may be negative for inverted bounds)
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    /// Coordinate of the lower face of voxel `index` for a given voxel size
    pub fn index_to_coord(&self, index: usize, voxel_size: f64) -> f64 {
        self.min + index as f64 * voxel_size
    }
}

impl From<[f64; 2]> for AxisBounds {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<AxisBounds> for [f64; 2] {
    fn from(bounds: AxisBounds) -> Self {
        [bounds.min, bounds.max]
    }
}

impl fmt::Display for AxisBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.min, self.max)
    }
}

/// Observed value range of a volume, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Min/max over a sequence of values. NaNs are skipped; returns `None`
    /// when no comparable value is present.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .map(|(lo, hi)| Self::new(lo as f64, hi as f64))
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// True when every value in the range is identical
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

impl From<[f64; 2]> for ValueRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<ValueRange> for [f64; 2] {
    fn from(range: ValueRange) -> Self {
        [range.min, range.max]
    }
}
