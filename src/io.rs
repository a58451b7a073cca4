//! I/O helpers for correlation matrices, coordinates and JSON reports.
//!
//! - `load_matrix_json`: rows of numbers, `null` for undefined entries.
//! - `load_matrix_image` / `save_matrix_image`: square grayscale image with
//!   intensities scaled to `[0, 1]`.
//! - `load_coordinates_json`: flat array of starting coordinates.
//! - `write_json_file`: pretty-print a serializable value to disk.
use crate::matrix::{CorrelationMatrix, MatrixView};
use image::{ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Parse a JSON array of rows into a square matrix.
pub fn parse_matrix_json(json: &str) -> Result<CorrelationMatrix, String> {
    let rows: Vec<Vec<Option<f64>>> =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse matrix JSON: {e}"))?;
    let n = rows.len();
    let mut data = Vec::with_capacity(n * n);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != n {
            return Err(format!(
                "Matrix row {i} has {} entries, expected {n}",
                row.len()
            ));
        }
        data.extend(row.into_iter().map(|v| v.unwrap_or(f64::NAN)));
    }
    CorrelationMatrix::new(n, data).map_err(|e| e.to_string())
}

pub fn load_matrix_json(path: &Path) -> Result<CorrelationMatrix, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read matrix {}: {e}", path.display()))?;
    parse_matrix_json(&data).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load a square grayscale image (8 or 16 bit) as a correlation matrix.
pub fn load_matrix_image(path: &Path) -> Result<CorrelationMatrix, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma16();
    let (width, height) = img.dimensions();
    if width != height {
        return Err(format!(
            "Matrix image {} is {width}x{height}, expected a square image",
            path.display()
        ));
    }
    let data = img
        .into_raw()
        .into_iter()
        .map(|v| f64::from(v) / f64::from(u16::MAX))
        .collect();
    CorrelationMatrix::new(width as usize, data).map_err(|e| e.to_string())
}

/// Save a matrix as a 16-bit grayscale image, clamping to `[0, 1]`.
/// Undefined entries are written as black.
pub fn save_matrix_image(matrix: &CorrelationMatrix, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let n = matrix.size() as u32;
    let image: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(n, n, |x, y| {
        let v = matrix
            .get_finite(y as usize, x as usize)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        Luma([(v * f64::from(u16::MAX)).round() as u16])
    });
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

pub fn load_coordinates_json(path: &Path) -> Result<Vec<f64>, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read coordinates {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse coordinates {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_nulls_become_undefined() {
        let m = parse_matrix_json("[[1.0, 0.5, null], [0.5, 1.0, 0.5], [null, 0.5, 1.0]]").unwrap();
        assert_eq!(m.size(), 3);
        assert!(m.get(0, 2).is_nan());
        assert_eq!(m.get_finite(1, 2), Some(0.5));
    }

    #[test]
    fn ragged_json_is_rejected() {
        let err = parse_matrix_json("[[1.0, 0.5], [0.5]]").unwrap_err();
        assert!(err.contains("row 1"), "{err}");
    }

    #[test]
    fn image_round_trip_keeps_band_values() {
        let dir = std::env::temp_dir().join(format!("z_spacing_io_{}", std::process::id()));
        let path = dir.join("matrix.png");
        let m = CorrelationMatrix::banded(6, 2, |i, j| 1.0 - 0.2 * i.abs_diff(j) as f64);
        save_matrix_image(&m, &path).unwrap();
        let loaded = load_matrix_image(&path).unwrap();
        assert_eq!(loaded.size(), 6);
        assert!((loaded.get(2, 3) - 0.8).abs() < 1e-4);
        assert_eq!(loaded.get(0, 5), 0.0);
        let _ = fs::remove_dir_all(&dir);
    }
}
