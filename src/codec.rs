//! Grid codec - converts occupancy volumes to a raw little-endian f32 payload
//! plus a JSON metadata document, and back
//!
//! The payload has no header, length prefix or padding: it is exactly
//! `4 * nx * ny * nz` bytes in [`crate::layout`] order. Its shape is only
//! known from the paired metadata document.

use crate::bounds::{resolve_bounds, ResolvedGrid};
use crate::error::{OccupancyError, Result};
use crate::io::ArtifactStore;
use crate::metadata::OccupancyMetadata;
use crate::source::{OccupancyArchive, VolumeSource, OCCUPANCY_FIELD};
use crate::types::{GridShape, ValueRange, VOXEL_BYTES};
use crate::utils::{base_name, format_bytes, sibling_with_extension};
use crate::volume::OccupancyVolume;
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension of the binary payload artifact
pub const PAYLOAD_EXTENSION: &str = "bin";
/// Extension of the metadata document
pub const METADATA_EXTENSION: &str = "json";
/// Metadata key holding the observed value range
pub const OCCUPANCY_RANGE_FIELD: &str = "occupancy_range";

/// Encode voxel values as contiguous little-endian f32
pub fn encode_payload(volume: &OccupancyVolume) -> Bytes {
    let values = volume.as_flat();
    let mut buf = vec![0u8; values.len() * VOXEL_BYTES];
    LittleEndian::write_f32_into(&values, &mut buf);
    Bytes::from(buf)
}

/// Decode a little-endian f32 payload into a volume of `shape`.
///
/// `shape` usually comes from an untrusted metadata document, so its size is
/// computed with overflow checks before anything is allocated.
pub fn decode_payload(payload: &[u8], shape: GridShape) -> Result<OccupancyVolume> {
    let expected = shape.checked_byte_len().ok_or_else(|| {
        OccupancyError::InvalidDimensions(format!(
            "grid shape {} exceeds the addressable payload size",
            shape
        ))
    })?;
    if payload.len() != expected {
        return Err(OccupancyError::SizeMismatch {
            expected,
            actual: payload.len(),
        });
    }
    let mut values = vec![0f32; expected / VOXEL_BYTES];
    LittleEndian::read_f32_into(payload, &mut values);
    OccupancyVolume::from_flat(shape, values)
}

/// A payload and the metadata record describing it
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedGrid {
    pub payload: Bytes,
    pub metadata: OccupancyMetadata,
}

/// Encode a volume and its resolved spatial fields.
///
/// The payload always holds the volume's own values. `grid.grid_shape` is
/// written to the metadata as given; a shape that disagrees with the volume
/// is logged and left for the caller to handle.
///
/// Fails with `InvalidField("occupancy_range")` when the volume holds an
/// infinite value, since JSON cannot carry it and the metadata document
/// would not parse back.
pub fn encode(
    volume: &OccupancyVolume,
    grid: &ResolvedGrid,
    occupancy_file: impl Into<String>,
) -> Result<EncodedGrid> {
    if !grid.is_consistent_with(volume.shape()) {
        warn!(
            declared = %grid.grid_shape,
            actual = %volume.shape(),
            "declared grid_shape differs from occupancy shape"
        );
    }

    // An empty grid has no observed values; report a zero range.
    let occupancy_range = volume
        .value_range()
        .unwrap_or_else(|| ValueRange::new(0.0, 0.0));
    if !occupancy_range.is_valid() {
        return Err(OccupancyError::InvalidField {
            field: OCCUPANCY_RANGE_FIELD.to_string(),
            reason: format!(
                "[{}, {}] is not a finite range",
                occupancy_range.min, occupancy_range.max
            ),
        });
    }

    Ok(EncodedGrid {
        payload: encode_payload(volume),
        metadata: OccupancyMetadata::new(occupancy_file, grid, occupancy_range),
    })
}

/// Rebuild the volume described by `metadata` from its payload bytes
pub fn decode(metadata: &OccupancyMetadata, payload: &[u8]) -> Result<OccupancyVolume> {
    decode_payload(payload, metadata.grid_shape)
}

/// Output locations of a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub payload: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    /// Derive output paths for `input`.
    ///
    /// Without `output`, both artifacts sit next to the input and share its
    /// stem. With an explicit metadata path, the payload takes that path's
    /// stem and directory instead.
    pub fn resolve(input: &Path, output: Option<&Path>) -> Result<Self> {
        match output {
            None => Ok(Self {
                payload: sibling_with_extension(input, PAYLOAD_EXTENSION)?,
                metadata: sibling_with_extension(input, METADATA_EXTENSION)?,
            }),
            Some(metadata) => Ok(Self {
                payload: sibling_with_extension(metadata, PAYLOAD_EXTENSION)?,
                metadata: metadata.to_path_buf(),
            }),
        }
    }

    /// Base name recorded in the metadata's `occupancy_file`
    pub fn payload_file_name(&self) -> Result<String> {
        base_name(&self.payload)
    }
}

/// Write the payload, then the metadata document.
///
/// The two writes are not atomic as a pair. If the metadata write fails the
/// payload has already been written and is left in place.
pub fn write_artifacts(
    store: &dyn ArtifactStore,
    encoded: &EncodedGrid,
    paths: &ArtifactPaths,
) -> Result<usize> {
    debug!(path = %paths.payload.display(), bytes = encoded.payload.len(), "writing payload");
    store.write(&paths.payload, &encoded.payload)?;

    let document = encoded.metadata.to_json_pretty()?;
    debug!(path = %paths.metadata.display(), "writing metadata");
    store.write(&paths.metadata, &document)?;
    Ok(document.len())
}

/// Encode any volume source and write its artifact pair
pub fn convert_source<S: VolumeSource + ?Sized>(
    store: &dyn ArtifactStore,
    source: &S,
    paths: &ArtifactPaths,
) -> Result<(EncodedGrid, usize)> {
    let grid = resolve_bounds(source)?;
    let volume = source
        .occupancy()
        .ok_or_else(|| OccupancyError::MissingField(OCCUPANCY_FIELD.to_string()))?;
    debug!(
        shape = %volume.shape(),
        grid_shape = %grid.grid_shape,
        x = %grid.bounds.x,
        y = %grid.bounds.y,
        z = %grid.bounds.z,
        voxel_size = grid.voxel_size,
        "resolved grid"
    );

    let encoded = encode(volume, &grid, paths.payload_file_name()?)?;
    let metadata_len = write_artifacts(store, &encoded, paths)?;
    Ok((encoded, metadata_len))
}

/// Summary of a completed file conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub paths: ArtifactPaths,
    pub metadata: OccupancyMetadata,
    pub input_bytes: usize,
    pub payload_bytes: usize,
    pub metadata_bytes: usize,
}

impl ConversionReport {
    pub fn output_bytes(&self) -> usize {
        self.payload_bytes + self.metadata_bytes
    }

    pub fn summary(&self) -> String {
        format!(
            "input {}, payload {}, metadata {}, total output {}",
            format_bytes(self.input_bytes),
            format_bytes(self.payload_bytes),
            format_bytes(self.metadata_bytes),
            format_bytes(self.output_bytes())
        )
    }
}

/// Convert an `.npz` occupancy archive into a payload + metadata pair.
///
/// Fails with `NotFound` before reading anything if `input` does not exist.
pub fn convert_file(
    store: &dyn ArtifactStore,
    input: &Path,
    output: Option<&Path>,
) -> Result<ConversionReport> {
    if !store.exists(input)? {
        return Err(OccupancyError::NotFound(format!(
            "occupancy file not found: {}",
            input.display()
        )));
    }

    let paths = ArtifactPaths::resolve(input, output)?;
    let raw = store.read(input)?;
    let input_bytes = raw.len();
    let archive = OccupancyArchive::read_npz(Cursor::new(raw))?;

    let (encoded, metadata_bytes) = convert_source(store, &archive, &paths)?;
    let report = ConversionReport {
        paths,
        metadata: encoded.metadata,
        input_bytes,
        payload_bytes: encoded.payload.len(),
        metadata_bytes,
    };

    info!(
        input = %input.display(),
        payload = %report.paths.payload.display(),
        metadata = %report.paths.metadata.display(),
        "conversion complete: {}",
        report.summary()
    );
    Ok(report)
}

/// Load a metadata document and decode the payload it names.
///
/// `occupancy_file` is looked up in the metadata document's own directory.
pub fn load_grid(
    store: &dyn ArtifactStore,
    metadata_path: &Path,
) -> Result<(OccupancyMetadata, OccupancyVolume)> {
    let metadata = OccupancyMetadata::from_json(&store.read(metadata_path)?)?;
    metadata.validate_file_name()?;

    let payload_path = match metadata_path.parent() {
        Some(dir) => dir.join(&metadata.occupancy_file),
        None => PathBuf::from(&metadata.occupancy_file),
    };
    let payload = store.read(&payload_path)?;
    let volume = decode(&metadata, &payload)?;
    debug!(path = %payload_path.display(), shape = %volume.shape(), "grid loaded");
    Ok((metadata, volume))
}
