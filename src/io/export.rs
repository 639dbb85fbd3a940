//! Export resolved data points to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per data point with its total absolute uncertainties.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::container::XyContainer;
use crate::error::AppError;

/// Write `index,x,x_err,y,y_err` rows to any writer.
pub fn write_points_csv_to<W: Write>(writer: W, container: &XyContainer) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["index", "x", "x_err", "y", "y_err"])?;
    for (i, p) in container.resolved_points().iter().enumerate() {
        wtr.write_record([
            i.to_string(),
            format!("{:.10}", p.x),
            format!("{:.10}", p.x_err),
            format!("{:.10}", p.y),
            format!("{:.10}", p.y_err),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write resolved points to a CSV file.
pub fn write_points_csv(path: &Path, container: &XyContainer) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    write_points_csv_to(file, container)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = container.size(), "wrote points CSV");
    Ok(())
}
