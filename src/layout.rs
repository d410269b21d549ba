//! Grid layout - the fixed flattening law between 3D voxel coordinates and
//! offsets into the flat payload
//!
//! The payload stores z fastest, then y, then x:
//!
//! ```text
//! idx = z + y*nz + x*nz*ny
//! x = idx / (ny*nz);  y = (idx / nz) % ny;  z = idx % nz
//! ```
//!
//! This is row-major ("C") order over axes `(x, y, z)`, which is also the
//! iteration order of a standard-layout `ndarray::Array3` of shape
//! `(nx, ny, nz)`. Consumers of the binary artifact depend on this exact
//! order; it must not change.

use crate::types::GridShape;

/// Human-readable statement of the flattening law
pub const FLAT_INDEX_LAW: &str = "idx = z + y*nz + x*nz*ny";

/// Flat offset of voxel `(x, y, z)`, or `None` if it lies outside `shape`
pub fn flat_index(shape: GridShape, x: usize, y: usize, z: usize) -> Option<usize> {
    if !is_in_bounds(shape, [x, y, z]) {
        return None;
    }
    let [sx, sy, sz] = strides(shape);
    Some(x * sx + y * sy + z * sz)
}

/// Inverse of [`flat_index`]; `None` when `idx` is past the end of the grid
pub fn unflatten(shape: GridShape, idx: usize) -> Option<[usize; 3]> {
    if idx >= shape.checked_voxel_count()? {
        return None;
    }
    let (ny, nz) = (shape.ny(), shape.nz());
    Some([idx / (ny * nz), (idx / nz) % ny, idx % nz])
}

/// Element strides for `(x, y, z)`
pub fn strides(shape: GridShape) -> [usize; 3] {
    [shape.ny() * shape.nz(), shape.nz(), 1]
}

/// Check if coordinates are within the grid
pub fn is_in_bounds(shape: GridShape, coords: [usize; 3]) -> bool {
    coords
        .iter()
        .zip(shape.dims().iter())
        .all(|(&coord, &len)| coord < len)
}

/// Get a summary string of a grid layout
pub fn summary(shape: GridShape) -> String {
    format!(
        "Occupancy grid: {} ({} voxels), {:.2} MB as f32, order {}",
        shape,
        shape.voxel_count(),
        shape.byte_len() as f64 / (1024.0 * 1024.0),
        FLAT_INDEX_LAW
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_z_varies_fastest() {
        let shape = GridShape::new(4, 3, 2);
        assert_eq!(flat_index(shape, 0, 0, 0), Some(0));
        assert_eq!(flat_index(shape, 0, 0, 1), Some(1));
        assert_eq!(flat_index(shape, 0, 1, 0), Some(2));
        assert_eq!(flat_index(shape, 1, 0, 0), Some(6));
        assert_eq!(flat_index(shape, 3, 2, 1), Some(23));
        assert_eq!(strides(shape), [6, 2, 1]);
    }

    #[test]
    fn test_out_of_bounds() {
        let shape = GridShape::new(4, 3, 2);
        assert_eq!(flat_index(shape, 4, 0, 0), None);
        assert_eq!(flat_index(shape, 0, 0, 2), None);
        assert_eq!(unflatten(shape, 24), None);
        assert!(!is_in_bounds(shape, [0, 3, 0]));
    }

    #[test]
    fn test_empty_axis_has_no_indices() {
        let shape = GridShape::new(5, 0, 3);
        assert_eq!(unflatten(shape, 0), None);
        assert_eq!(flat_index(shape, 0, 0, 0), None);
    }

    #[test]
    fn test_matches_ndarray_standard_layout() {
        let shape = GridShape::new(3, 4, 5);
        let array = ndarray::Array3::from_shape_fn((3, 4, 5), |(x, y, z)| {
            flat_index(shape, x, y, z).unwrap() as f32
        });
        let flat: Vec<f32> = array.iter().copied().collect();
        let expected: Vec<f32> = (0..shape.voxel_count()).map(|i| i as f32).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_summary() {
        let text = summary(GridShape::new(400, 400, 32));
        assert!(text.contains("400 x 400 x 32"));
        assert!(text.contains("19.53 MB"));
    }

    proptest! {
        #[test]
        fn unflatten_inverts_flat_index(
            nx in 1usize..12,
            ny in 1usize..12,
            nz in 1usize..12,
            x in 0usize..12,
            y in 0usize..12,
            z in 0usize..12,
        ) {
            let shape = GridShape::new(nx, ny, nz);
            let (x, y, z) = (x % nx, y % ny, z % nz);
            let idx = flat_index(shape, x, y, z).unwrap();
            prop_assert!(idx < shape.voxel_count());
            prop_assert_eq!(unflatten(shape, idx), Some([x, y, z]));
        }

        #[test]
        fn flat_index_is_a_bijection(nx in 1usize..8, ny in 1usize..8, nz in 1usize..8) {
            let shape = GridShape::new(nx, ny, nz);
            let mut seen = vec![false; shape.voxel_count()];
            for x in 0..nx {
                for y in 0..ny {
                    for z in 0..nz {
                        let idx = flat_index(shape, x, y, z).unwrap();
                        prop_assert!(!seen[idx]);
                        seen[idx] = true;
                    }
                }
            }
            prop_assert!(seen.iter().all(|&s| s));
        }
    }
}
