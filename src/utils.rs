//! Utility functions

use crate::error::{OccupancyError, Result};
use std::path::Path;

/// Format byte size in human-readable form
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Final component of `path` as UTF-8
pub fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            OccupancyError::InvalidArgument(format!(
                "path has no UTF-8 file name: {}",
                path.display()
            ))
        })
}

/// `path` with its extension swapped for `extension`, kept in the same
/// directory
pub fn sibling_with_extension(path: &Path, extension: &str) -> Result<std::path::PathBuf> {
    let stem = path.file_stem().ok_or_else(|| {
        OccupancyError::InvalidArgument(format!("path has no file stem: {}", path.display()))
    })?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    Ok(path.with_file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/data/scenes/a.bin")).unwrap(), "a.bin");
        assert!(base_name(Path::new("/")).is_err());
    }

    #[test]
    fn test_sibling_with_extension() {
        assert_eq!(
            sibling_with_extension(Path::new("/data/occ_(10,23)_400x400x32.npz"), "bin").unwrap(),
            PathBuf::from("/data/occ_(10,23)_400x400x32.bin")
        );
        assert_eq!(
            sibling_with_extension(Path::new("out/meta.v2.json"), "bin").unwrap(),
            PathBuf::from("out/meta.v2.bin")
        );
        assert_eq!(
            sibling_with_extension(Path::new("plain"), "json").unwrap(),
            PathBuf::from("plain.json")
        );
    }
}
