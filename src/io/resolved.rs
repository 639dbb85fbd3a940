//! Read/write resolved dataset JSON files.
//!
//! A resolved file is the "portable" representation of a loaded configuration:
//! - labels from the configuration
//! - every point with its total absolute uncertainties
//! - per-axis total covariance matrices
//! - a summary of the error sources they were built from
//!
//! The schema is defined by `domain::ResolvedFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::container::XyContainer;
use crate::domain::{Axis, FitConfigFile, ResolvedFile};
use crate::error::AppError;
use crate::math::to_rows;

pub const TOOL_NAME: &str = "xyfit";

/// Snapshot a container (and the labels of its configuration).
pub fn build_resolved(config: &FitConfigFile, container: &XyContainer) -> ResolvedFile {
    ResolvedFile {
        tool: TOOL_NAME.to_string(),
        generated: Utc::now(),
        label: config.label.clone(),
        x_label: config.x_label.clone(),
        y_label: config.y_label.clone(),
        points: container.resolved_points(),
        x_cov_mat: to_rows(&container.total_error(Axis::X).cov_mat),
        y_cov_mat: to_rows(&container.total_error(Axis::Y).cov_mat),
        sources: container.error_summaries(),
    }
}

/// Write a resolved JSON file.
pub fn write_resolved_json(path: &Path, resolved: &ResolvedFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create resolved JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, resolved)
        .map_err(|e| AppError::new(4, format!("Failed to write resolved JSON: {e}")))?;

    info!(path = %path.display(), points = resolved.points.len(), "wrote resolved JSON");
    Ok(())
}

/// Read a resolved JSON file.
pub fn read_resolved_json(path: &Path) -> Result<ResolvedFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open resolved JSON '{}': {e}", path.display())))?;
    let resolved: ResolvedFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid resolved JSON: {e}")))?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::io::load::parse_fit_config;

    #[test]
    fn resolved_file_written_and_read_back() {
        let config = parse_fit_config(include_str!("../../data/xy_sources.yml")).unwrap();
        let container = XyContainer::from_config(&config).unwrap();
        let resolved = build_resolved(&config, &container);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolved.json");
        write_resolved_json(&path, &resolved).unwrap();
        let back = read_resolved_json(&path).unwrap();

        assert_eq!(back.tool, "xyfit");
        assert_eq!(back.label.as_deref(), Some("Calibration run"));
        assert_eq!(back.points.len(), resolved.points.len());
        for (a, b) in back.points.iter().zip(&resolved.points) {
            assert!((a.x - b.x).abs() < 1e-12);
            assert!((a.y_err - b.y_err).abs() < 1e-12);
        }
        assert_eq!(back.y_cov_mat.len(), 6);
        assert_eq!(back.sources.len(), 3);
        assert_eq!(back.sources[0].name, "voltmeter");
        assert_eq!(back.sources[0].axis, Axis::X);
        assert_eq!(back.sources[2].kind, ErrorKind::Simple);
        assert_eq!(back.sources[2].correlation, Some(1.0));
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_resolved_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
