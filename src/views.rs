//! Derived views - projections, slices and value distributions of a volume
//!
//! Every view is computed from a shared borrow of the volume and returns a
//! new array; the volume itself is never modified. 2D views have shape
//! `(nx, ny)`.

use crate::error::{OccupancyError, Result};
use crate::types::ValueRange;
use crate::volume::OccupancyVolume;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

const Z_AXIS: Axis = Axis(2);

impl OccupancyVolume {
    /// Maximum over z for each `(x, y)` column. NaNs are ignored; a column
    /// with `nz == 0` yields negative infinity.
    pub fn max_projection(&self) -> Array2<f32> {
        self.view()
            .fold_axis(Z_AXIS, f32::NEG_INFINITY, |&acc, &v| acc.max(v))
    }

    /// Arithmetic mean over z for each `(x, y)` column, accumulated in f64.
    /// A column with `nz == 0` yields NaN.
    pub fn mean_projection(&self) -> Array2<f32> {
        self.view().map_axis(Z_AXIS, |column| {
            let sum: f64 = column.iter().map(|&v| v as f64).sum();
            (sum / column.len() as f64) as f32
        })
    }

    /// The `(nx, ny)` cross-section at `z_index`
    pub fn slice_at(&self, z_index: isize) -> Result<Array2<f32>> {
        let nz = self.shape().nz();
        if z_index < 0 || z_index as usize >= nz {
            return Err(OccupancyError::IndexOutOfRange {
                index: z_index,
                len: nz,
            });
        }
        Ok(self.view().index_axis(Z_AXIS, z_index as usize).to_owned())
    }

    /// Distribution of all voxel values over `bin_count` linear bins between
    /// the observed min and max. NaNs are excluded.
    ///
    /// A constant volume collapses to a single bin spanning the constant
    /// value. An empty volume gives `bin_count` empty bins over `[0, 1]` and
    /// a NaN mean.
    pub fn histogram(&self, bin_count: usize) -> Result<Histogram> {
        if bin_count == 0 {
            return Err(OccupancyError::InvalidArgument(
                "histogram needs at least one bin".to_string(),
            ));
        }

        let values: Vec<f64> = self
            .view()
            .iter()
            .filter(|v| !v.is_nan())
            .map(|&v| v as f64)
            .collect();

        let Some(range) = self.value_range() else {
            return Ok(Histogram {
                counts: vec![0; bin_count],
                edges: linear_edges(0.0, 1.0, bin_count),
                mean: f64::NAN,
            });
        };
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        if range.is_degenerate() {
            return Ok(Histogram {
                counts: vec![values.len() as u64],
                edges: vec![range.min, range.max],
                mean,
            });
        }

        let edges = linear_edges(range.min, range.max, bin_count);
        let scale = bin_count as f64 / (range.max - range.min);
        let last = bin_count - 1;
        let mut counts = vec![0u64; bin_count];

        for v in values {
            let mut bin = (((v - range.min) * scale) as usize).min(last);
            // Keep the bin consistent with the reported edges under rounding.
            if v < edges[bin] {
                bin -= 1;
            } else if bin != last && v >= edges[bin + 1] {
                bin += 1;
            }
            counts[bin] += 1;
        }

        Ok(Histogram {
            counts,
            edges,
            mean,
        })
    }

    /// Summary statistics over all voxels
    pub fn stats(&self) -> VolumeStats {
        let n = self.len();
        let sum: f64 = self.view().iter().map(|&v| v as f64).sum();
        let mean = sum / n as f64;
        let variance = self
            .view()
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;

        VolumeStats {
            range: self.value_range(),
            mean,
            std: variance.sqrt(),
            non_zero: self.count_non_zero(),
            total: n,
        }
    }
}

/// `bin_count + 1` evenly spaced edges from `min` to exactly `max`
fn linear_edges(min: f64, max: f64, bin_count: usize) -> Vec<f64> {
    let step = (max - min) / bin_count as f64;
    (0..=bin_count)
        .map(|i| if i == bin_count { max } else { min + step * i as f64 })
        .collect()
}

/// Value distribution of a volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Voxel count per bin
    pub counts: Vec<u64>,
    /// Bin edges, one more than `counts`; the last bin is closed on the right
    pub edges: Vec<f64>,
    /// Mean of all counted values, drawn as a reference marker
    pub mean: f64,
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    /// Total number of counted values
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Index of the fullest bin (first one on ties)
    pub fn peak_bin(&self) -> Option<usize> {
        self.counts
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|&(_, &count)| count)
            .map(|(i, _)| i)
    }

    /// Number of bins holding at least one value
    pub fn occupied_bins(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Summary statistics of a volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    /// Observed min/max, `None` for an empty volume
    pub range: Option<ValueRange>,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub non_zero: usize,
    pub total: usize,
}

impl VolumeStats {
    /// Share of voxels with a non-zero value, in percent
    pub fn non_zero_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.non_zero as f64 / self.total as f64
        }
    }
}
