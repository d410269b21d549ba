//! Configuration: defaults applied to incomplete volume sources and options
//! for derived views

use crate::types::AxisBounds;
use serde::{Deserialize, Serialize};

/// Default x extent in metres when a source carries no `x_bounds`
pub const DEFAULT_X_BOUNDS: (f64, f64) = (-40.0, 40.0);
/// Default y extent in metres when a source carries no `y_bounds`
pub const DEFAULT_Y_BOUNDS: (f64, f64) = (-40.0, 40.0);
/// Default z extent in metres when a source carries no `z_bounds`
pub const DEFAULT_Z_BOUNDS: (f64, f64) = (-1.0, 5.4);
/// Default voxel edge length in metres
pub const DEFAULT_VOXEL_SIZE: f64 = 0.2;
/// Histogram bin count used by the inspection views
pub const DEFAULT_HISTOGRAM_BINS: usize = 100;
/// Colormap identifier handed to renderers
pub const DEFAULT_COLORMAP: &str = "turbo";

/// Values substituted for optional fields a volume source does not carry.
/// `grid_shape` has no fixed default: it falls back to the occupancy
/// array's own shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceDefaults {
    pub x_bounds: AxisBounds,
    pub y_bounds: AxisBounds,
    pub z_bounds: AxisBounds,
    pub voxel_size: f64,
}

impl SourceDefaults {
    pub fn with_x_bounds(mut self, bounds: AxisBounds) -> Self {
        self.x_bounds = bounds;
        self
    }

    pub fn with_y_bounds(mut self, bounds: AxisBounds) -> Self {
        self.y_bounds = bounds;
        self
    }

    pub fn with_z_bounds(mut self, bounds: AxisBounds) -> Self {
        self.z_bounds = bounds;
        self
    }

    pub fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }
}

impl Default for SourceDefaults {
    fn default() -> Self {
        Self {
            x_bounds: AxisBounds::new(DEFAULT_X_BOUNDS.0, DEFAULT_X_BOUNDS.1),
            y_bounds: AxisBounds::new(DEFAULT_Y_BOUNDS.0, DEFAULT_Y_BOUNDS.1),
            z_bounds: AxisBounds::new(DEFAULT_Z_BOUNDS.0, DEFAULT_Z_BOUNDS.1),
            voxel_size: DEFAULT_VOXEL_SIZE,
        }
    }
}

/// Options for the inspection panel set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Number of histogram bins
    pub histogram_bins: usize,
    /// Colormap identifier for 2D panels
    pub colormap: String,
}

impl ViewConfig {
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    pub fn with_colormap(mut self, colormap: impl Into<String>) -> Self {
        self.colormap = colormap.into();
        self
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            colormap: DEFAULT_COLORMAP.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_defaults() {
        let defaults = SourceDefaults::default();
        assert_eq!(defaults.x_bounds, AxisBounds::new(-40.0, 40.0));
        assert_eq!(defaults.y_bounds, AxisBounds::new(-40.0, 40.0));
        assert_eq!(defaults.z_bounds, AxisBounds::new(-1.0, 5.4));
        assert_eq!(defaults.voxel_size, 0.2);

        let custom = defaults.with_voxel_size(0.5);
        assert_eq!(custom.voxel_size, 0.5);
    }

    #[test]
    fn test_view_config() {
        let config = ViewConfig::default();
        assert_eq!(config.histogram_bins, 100);
        assert_eq!(config.colormap, "turbo");
        assert_eq!(config.with_histogram_bins(20).histogram_bins, 20);
    }
}
