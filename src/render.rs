//! Renderer interface for derived views
//!
//! The crate does not draw anything. A [`Renderer`] receives each 2D field
//! together with presentation hints, and the histogram with its mean marker.
//! [`ReportRenderer`] records numeric summaries of what it is given and can
//! write them out as a JSON document.

use crate::error::Result;
use crate::io::ArtifactStore;
use crate::types::ValueRange;
use crate::views::{Histogram, VolumeStats};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Where row 0 of a 2D field is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Row 0 at the bottom
    #[default]
    Lower,
    /// Row 0 at the top
    Upper,
}

/// A 2D field to draw
#[derive(Debug, Clone)]
pub struct FieldPanel<'a> {
    pub label: &'a str,
    pub field: ArrayView2<'a, f32>,
    pub colormap: &'a str,
    pub origin: Origin,
    /// Observed `[min, max]` of `field`, for the caption
    pub range: Option<ValueRange>,
}

/// A value distribution to draw
#[derive(Debug, Clone)]
pub struct HistogramPanel<'a> {
    pub label: &'a str,
    pub histogram: &'a Histogram,
    /// Counts are meant for a logarithmic axis
    pub log_scale: bool,
}

/// Consumer of derived views
pub trait Renderer {
    fn draw_field(&mut self, panel: &FieldPanel<'_>) -> Result<()>;

    fn draw_histogram(&mut self, panel: &HistogramPanel<'_>) -> Result<()>;
}

/// Numeric summary of one drawn field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub label: String,
    pub colormap: String,
    pub origin: Origin,
    /// `[nx, ny]`
    pub shape: [usize; 2],
    pub range: Option<ValueRange>,
}

/// Numeric summary of the drawn histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    pub label: String,
    pub log_scale: bool,
    #[serde(flatten)]
    pub histogram: Histogram,
}

/// Everything a [`ReportRenderer`] was asked to draw
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    /// `[nx, ny, nz]` of the inspected volume
    pub shape: Option<[usize; 3]>,
    pub stats: Option<VolumeStats>,
    pub fields: Vec<FieldSummary>,
    pub histogram: Option<HistogramSummary>,
}

impl InspectionReport {
    /// Look up a field summary by label
    pub fn field(&self, label: &str) -> Option<&FieldSummary> {
        self.fields.iter().find(|f| f.label == label)
    }
}

/// Renderer that records panel summaries instead of drawing
#[derive(Debug, Default)]
pub struct ReportRenderer {
    report: InspectionReport,
}

impl ReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach volume-level context to the report
    pub fn with_volume(mut self, shape: [usize; 3], stats: VolumeStats) -> Self {
        self.report.shape = Some(shape);
        self.report.stats = Some(stats);
        self
    }

    pub fn report(&self) -> &InspectionReport {
        &self.report
    }

    pub fn finish(self) -> InspectionReport {
        self.report
    }

    /// Write the report as an indented JSON document
    pub fn write_to(&self, store: &dyn ArtifactStore, path: &Path) -> Result<()> {
        let document = serde_json::to_vec_pretty(&self.report)?;
        store.write(path, &document)?;
        debug!(path = %path.display(), fields = self.report.fields.len(), "report written");
        Ok(())
    }
}

impl Renderer for ReportRenderer {
    fn draw_field(&mut self, panel: &FieldPanel<'_>) -> Result<()> {
        let (nx, ny) = panel.field.dim();
        self.report.fields.push(FieldSummary {
            label: panel.label.to_string(),
            colormap: panel.colormap.to_string(),
            origin: panel.origin,
            shape: [nx, ny],
            range: panel.range,
        });
        Ok(())
    }

    fn draw_histogram(&mut self, panel: &HistogramPanel<'_>) -> Result<()> {
        self.report.histogram = Some(HistogramSummary {
            label: panel.label.to_string(),
            log_scale: panel.log_scale,
            histogram: panel.histogram.clone(),
        });
        Ok(())
    }
}
