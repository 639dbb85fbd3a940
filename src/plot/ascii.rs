//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a configuration in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - data points: `o`
//! - y error bars: `|`
//! - x error bars: `-`

use crate::domain::ResolvedPoint;

/// Render data points with their total error bars.
pub fn render_ascii_plot(points: &[ResolvedPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Bars first so the points overlay them.
    for p in points {
        let col = map_x(p.x, x_min, x_max, width);
        let row = map_y(p.y, y_min, y_max, height);

        if p.y_err > 0.0 {
            let top = map_y(p.y + p.y_err, y_min, y_max, height);
            let bottom = map_y(p.y - p.y_err, y_min, y_max, height);
            for r in top..=bottom {
                put(&mut grid, r, col, '|');
            }
        }
        if p.x_err > 0.0 {
            let left = map_x(p.x - p.x_err, x_min, x_max, width);
            let right = map_x(p.x + p.x_err, x_min, x_max, width);
            for c in left..=right {
                put(&mut grid, row, c, '-');
            }
        }
    }
    for p in points {
        let col = map_x(p.x, x_min, x_max, width);
        let row = map_y(p.y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn put(grid: &mut [Vec<char>], row: usize, col: usize, ch: char) {
    if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
        if *cell == ' ' {
            *cell = ch;
        }
    }
}

fn x_range(points: &[ResolvedPoint]) -> Option<(f64, f64)> {
    let min_x = points.iter().map(|p| p.x - p.x_err).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x + p.x_err).fold(f64::NEG_INFINITY, f64::max);
    finite_range(min_x, max_x)
}

fn y_range(points: &[ResolvedPoint]) -> Option<(f64, f64)> {
    let min_y = points.iter().map(|p| p.y - p.y_err).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y + p.y_err).fold(f64::NEG_INFINITY, f64::max);
    finite_range(min_y, max_y)
}

fn finite_range(min: f64, max: f64) -> Option<(f64, f64)> {
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        // Single point (or all identical): widen so it lands mid-grid.
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}
