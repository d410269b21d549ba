//! Inspection - the standard set of derived views of an occupancy volume and
//! the file-level entry point that produces them

use crate::bounds::resolve_bounds;
use crate::config::ViewConfig;
use crate::error::{OccupancyError, Result};
use crate::io::ArtifactStore;
use crate::render::{FieldPanel, HistogramPanel, InspectionReport, Origin, Renderer, ReportRenderer};
use crate::source::{OccupancyArchive, VolumeSource, OCCUPANCY_FIELD};
use crate::types::{GridShape, ValueRange};
use crate::views::{Histogram, VolumeStats};
use crate::volume::OccupancyVolume;
use ndarray::Array2;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

pub const HISTOGRAM_LABEL: &str = "Occupancy Value Distribution (log scale)";

/// A labelled 2D derived view
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub label: String,
    pub data: Array2<f32>,
}

impl ScalarField {
    pub fn new(label: impl Into<String>, data: Array2<f32>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }

    /// Observed `[min, max]`, NaNs skipped
    pub fn range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.data.iter().copied())
    }
}

/// The six standard inspection views of one volume
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionPanels {
    pub shape: GridShape,
    pub stats: VolumeStats,
    /// Max projection, mean projection, middle, top and bottom z slices
    pub fields: Vec<ScalarField>,
    pub histogram: Histogram,
}

impl InspectionPanels {
    /// Hand every panel to `renderer`, fields first
    pub fn render(&self, renderer: &mut dyn Renderer, config: &ViewConfig) -> Result<()> {
        for field in &self.fields {
            renderer.draw_field(&FieldPanel {
                label: &field.label,
                field: field.data.view(),
                colormap: &config.colormap,
                origin: Origin::Lower,
                range: field.range(),
            })?;
        }
        renderer.draw_histogram(&HistogramPanel {
            label: HISTOGRAM_LABEL,
            histogram: &self.histogram,
            log_scale: true,
        })
    }

    pub fn field(&self, label_prefix: &str) -> Option<&ScalarField> {
        self.fields.iter().find(|f| f.label.starts_with(label_prefix))
    }
}

/// Build the standard inspection views.
///
/// Fails with `IndexOutOfRange` when the volume has no z extent, since the
/// slice panels cannot exist.
pub fn standard_panels(volume: &OccupancyVolume, config: &ViewConfig) -> Result<InspectionPanels> {
    let shape = volume.shape();
    let nz = shape.nz() as isize;
    let (middle, top) = (nz / 2, nz - 1);

    let fields = vec![
        ScalarField::new("Max Projection", volume.max_projection()),
        ScalarField::new("Mean Projection", volume.mean_projection()),
        ScalarField::new(
            format!("Middle Z Slice (z={}/{})", middle, top),
            volume.slice_at(middle)?,
        ),
        ScalarField::new(format!("Top Z Slice (z={})", top), volume.slice_at(top)?),
        ScalarField::new("Bottom Z Slice (z=0)", volume.slice_at(0)?),
    ];

    Ok(InspectionPanels {
        shape,
        stats: volume.stats(),
        fields,
        histogram: volume.histogram(config.histogram_bins)?,
    })
}

/// Load an `.npz` archive, log its statistics, and build its inspection
/// report. The report is written to `report_path` when one is given.
pub fn inspect_file(
    store: &dyn ArtifactStore,
    input: &Path,
    report_path: Option<&Path>,
    config: &ViewConfig,
) -> Result<InspectionReport> {
    if !store.exists(input)? {
        return Err(OccupancyError::NotFound(format!(
            "file not found: {}",
            input.display()
        )));
    }
    let archive = OccupancyArchive::read_npz(Cursor::new(store.read(input)?))?;
    let grid = resolve_bounds(&archive)?;
    let volume = archive
        .occupancy()
        .ok_or_else(|| OccupancyError::MissingField(OCCUPANCY_FIELD.to_string()))?;

    let panels = standard_panels(volume, config)?;
    log_summary(&panels);
    info!(
        x = %grid.bounds.x,
        y = %grid.bounds.y,
        z = %grid.bounds.z,
        voxel_size = grid.voxel_size,
        "bounds"
    );

    let mut renderer = ReportRenderer::new().with_volume(panels.shape.dims(), panels.stats);
    panels.render(&mut renderer, config)?;

    if let Some(path) = report_path {
        renderer.write_to(store, path)?;
        info!(path = %path.display(), "saved inspection report");
    }
    Ok(renderer.finish())
}

fn log_summary(panels: &InspectionPanels) {
    let stats = &panels.stats;
    info!("occupancy shape: {}", panels.shape);
    if let Some(range) = stats.range {
        info!("occupancy range: [{:.6}, {:.6}]", range.min, range.max);
    }
    info!("occupancy mean: {:.6}, std: {:.6}", stats.mean, stats.std);
    info!(
        "non-zero voxels: {} / {} ({:.2}%)",
        stats.non_zero,
        stats.total,
        stats.non_zero_percent()
    );
    for field in &panels.fields {
        if let Some(range) = field.range() {
            info!("{}: range [{:.4}, {:.4}]", field.label, range.min, range.max);
        }
    }
}
