//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads and validates the fit configuration
//! - prints summaries/errors/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{CheckArgs, Command, ErrorsArgs, ExportArgs, PlotArgs};
use crate::domain::Axis;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `xyfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Check(args) => handle_check(args),
        Command::Errors(args) => handle_errors(args),
        Command::Plot(args) => handle_plot(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let out = pipeline::load(&args.file)?;
    println!("{}", crate::report::format_summary(&out.config, &out.container));
    Ok(())
}

fn handle_errors(args: ErrorsArgs) -> Result<(), AppError> {
    let mut out = pipeline::load(&args.file)?;
    pipeline::disable_sources(&mut out.container, &args.disable)?;

    let axes: Vec<Axis> = match args.axis {
        Some(axis) => vec![axis],
        None => Axis::ALL.to_vec(),
    };

    for axis in axes {
        let total = out.container.total_error(axis);
        print!("{}", crate::report::format_axis_errors(&out.container, axis));

        if args.cov {
            print!("{}", crate::report::format_matrix(&format!("{axis} covariance"), &total.cov_mat));
        }
        if args.cor {
            print!("{}", crate::report::format_matrix(&format!("{axis} correlation"), &total.cor_mat()));
        }
        if args.split {
            let (g, u) = out.container.split_errors(axis);
            if g.nrows() == 0 {
                println!("{axis}: no fully correlated components");
            } else {
                print!("{}", crate::report::format_matrix(&format!("{axis} correlated shifts (G)"), &g));
            }
            print!("{}", crate::report::format_matrix(&format!("{axis} remainder (U)"), &u));
        }
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let points = if args.resolved {
        crate::io::resolved::read_resolved_json(&args.file)?.points
    } else {
        pipeline::load(&args.file)?.container.resolved_points()
    };

    let plot = crate::plot::render_ascii_plot(&points, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let out = pipeline::load(&args.file)?;
    let resolved = crate::io::resolved::build_resolved(&out.config, &out.container);

    if let Some(path) = &args.csv {
        crate::io::export::write_points_csv(path, &out.container)?;
    }
    if let Some(path) = &args.json {
        crate::io::resolved::write_resolved_json(path, &resolved)?;
    }

    if args.csv.is_none() && args.json.is_none() {
        let json = serde_json::to_string_pretty(&resolved)
            .map_err(|e| AppError::new(4, format!("Failed to serialize resolved JSON: {e}")))?;
        println!("{json}");
    } else {
        info!(file = %args.file.display(), "export finished");
    }

    Ok(())
}
