//! Formatted terminal output: dataset summary, error tables and matrices.
//!
//! We keep formatting code in one place so:
//! - the container code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use nalgebra::DMatrix;

use crate::container::XyContainer;
use crate::domain::{Axis, ErrorKind, FitConfigFile};

/// Format the full summary (labels + ranges + sources + per-point table).
pub fn format_summary(config: &FitConfigFile, container: &XyContainer) -> String {
    let mut out = String::new();

    out.push_str("=== xyfit - XY fit configuration ===\n");
    if let Some(label) = &config.label {
        out.push_str(&format!("Label: {label}\n"));
    }
    if config.x_label.is_some() || config.y_label.is_some() {
        out.push_str(&format!(
            "Axes: x={} | y={}\n",
            config.x_label.as_deref().unwrap_or("-"),
            config.y_label.as_deref().unwrap_or("-"),
        ));
    }

    let (x_min, x_max) = container.x_range();
    let (y_min, y_max) = container.y_range();
    out.push_str(&format!(
        "Points: n={} | x=[{x_min:.4}, {x_max:.4}] | y=[{y_min:.4}, {y_max:.4}]\n",
        container.size(),
    ));

    out.push_str("\nError sources:\n");
    out.push_str(&format_sources(container));

    out.push_str("\nData:\n");
    out.push_str(&format_points(container));

    out
}

/// Format the table of registered error sources.
pub fn format_sources(container: &XyContainer) -> String {
    let mut out = String::new();
    if container.errors().is_empty() {
        out.push_str("(none)\n");
        return out;
    }

    push_line(
        &mut out,
        format!(
            "{:<20} {:<4} {:<6} {:>6} {:<8} {:<7}",
            "name", "axis", "kind", "corr", "relative", "enabled"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<20} {:-<4} {:-<6} {:-<6} {:-<8} {:-<7}", "", "", "", "", "", ""),
    );

    for s in container.error_summaries() {
        let kind = match s.kind {
            ErrorKind::Simple => "simple",
            ErrorKind::Matrix => "matrix",
        };
        let corr = s.correlation.map(|c| format!("{c:.3}")).unwrap_or_else(|| "-".to_string());
        push_line(
            &mut out,
            format!(
                "{:<20} {:<4} {:<6} {:>6} {:<8} {:<7}",
                truncate(&s.name, 20),
                s.axis,
                kind,
                corr,
                if s.relative { "yes" } else { "no" },
                if s.enabled { "yes" } else { "no" },
            ),
        );
    }

    out
}

/// Format every point with its total uncertainties.
pub fn format_points(container: &XyContainer) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:>5} {:>12} {:>12} {:>12} {:>12}", "index", "x", "x_err", "y", "y_err"),
    );
    push_line(
        &mut out,
        format!("{:-<5} {:-<12} {:-<12} {:-<12} {:-<12}", "", "", "", "", ""),
    );
    for (i, p) in container.resolved_points().iter().enumerate() {
        push_line(
            &mut out,
            format!(
                "{i:>5} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                p.x, p.x_err, p.y, p.y_err
            ),
        );
    }
    out
}

/// Format the pointwise total uncertainties of one axis.
pub fn format_axis_errors(container: &XyContainer, axis: Axis) -> String {
    let total = container.total_error(axis);
    let mut out = format!("{axis} errors: {}\n", fmt_vec(&total.error()));
    if !container.has_errors(axis) {
        out.push_str(&format!("(no {axis} error sources declared)\n"));
    }
    out
}

/// Format a matrix row by row with fixed precision.
pub fn format_matrix(title: &str, mat: &DMatrix<f64>) -> String {
    let mut out = format!("{title}:\n");
    for row in mat.row_iter() {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>12.6}")).collect();
        push_line(&mut out, cells.join(" "));
    }
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load::parse_fit_config;

    fn example() -> (FitConfigFile, XyContainer) {
        let config = parse_fit_config(include_str!("../../data/xy_example.yml")).unwrap();
        let container = XyContainer::from_config(&config).unwrap();
        (config, container)
    }

    #[test]
    fn summary_lists_points_and_sources() {
        let (config, container) = example();
        let txt = format_summary(&config, &container);

        assert!(txt.starts_with("=== xyfit - XY fit configuration ===\n"));
        assert!(txt.contains("Points: n=4 | x=[1.0000, 4.0000] | y=[2.3000, 9.4000]\n"));
        assert!(txt.contains("x_error_0            x    simple  0.000 no       yes\n"));
        assert!(txt.contains("y_error_1            y    simple  0.000 no       yes\n"));
        assert!(txt.contains("    3     4.000000     0.200000     9.400000     0.400000\n"));
    }

    #[test]
    fn axis_errors_line() {
        let (_, container) = example();
        assert_eq!(
            format_axis_errors(&container, Axis::Y),
            "y errors: [0.400000, 0.400000, 0.400000, 0.400000]\n"
        );
    }

    #[test]
    fn empty_sources_table() {
        let container = XyContainer::new(vec![1.0], vec![2.0]).unwrap();
        assert_eq!(format_sources(&container), "(none)\n");
        assert!(format_axis_errors(&container, Axis::X).contains("no x error sources"));
    }

    #[test]
    fn matrix_formatting() {
        let mat = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 2.0]);
        let expected = concat!(
            "cov:\n",
            "    1.000000     0.500000\n",
            "    0.500000     2.000000\n",
        );
        assert_eq!(format_matrix("cov", &mat), expected);
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
