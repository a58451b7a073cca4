use crate::estimator::EstimatorParams;
use crate::io::{load_coordinates_json, load_matrix_image, load_matrix_json};
use crate::matrix::CorrelationMatrix;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub matrix: MatrixSource,
    /// Starting coordinates; slice indices `0..n` when absent.
    #[serde(default)]
    pub coordinates: Option<PathBuf>,
    #[serde(default)]
    pub estimator: EstimatorParams,
    pub output: RunOutputConfig,
}

/// Where the correlation matrix comes from.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MatrixSource {
    /// JSON rows, `null` for undefined entries.
    Json(PathBuf),
    /// Square grayscale image scaled to `[0, 1]`.
    Image(PathBuf),
}

impl MatrixSource {
    pub fn load(&self) -> Result<CorrelationMatrix, String> {
        match self {
            MatrixSource::Json(path) => load_matrix_json(path),
            MatrixSource::Image(path) => load_matrix_image(path),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunOutputConfig {
    pub report_json: PathBuf,
    /// Per-iteration snapshots, written only when set.
    #[serde(default)]
    pub snapshots_json: Option<PathBuf>,
}

impl RunConfig {
    /// Load the configured starting coordinates, or `0..n`.
    pub fn starting_coordinates(&self, n: usize) -> Result<Vec<f64>, String> {
        match &self.coordinates {
            Some(path) => load_coordinates_json(path),
            None => Ok((0..n).map(|i| i as f64).collect()),
        }
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shifts::MediatorKind;

    #[test]
    fn minimal_config_uses_defaults() {
        let json = r#"{
            "matrix": { "image": "data/matrix.tif" },
            "output": { "report_json": "out/report.json" }
        }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.matrix,
            MatrixSource::Image(PathBuf::from("data/matrix.tif"))
        );
        assert_eq!(config.estimator.mediator, MediatorKind::WeightedMean);
        assert!(config.output.snapshots_json.is_none());
        assert_eq!(config.starting_coordinates(3).unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn estimator_section_is_forwarded() {
        let json = r#"{
            "matrix": { "json": "m.json" },
            "estimator": { "options": { "n_iterations": 7, "comparison_range": 5 } },
            "output": { "report_json": "r.json", "snapshots_json": "s.json" }
        }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.estimator.options.n_iterations, 7);
        assert_eq!(config.estimator.options.comparison_range, 5);
        assert_eq!(config.output.snapshots_json, Some(PathBuf::from("s.json")));
    }
}
