//! Command-line parsing for the XY fit configuration tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/container code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::Axis;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "xyfit", version, about = "Check, inspect and export XY fit configurations")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a configuration and print a summary of its data and error sources.
    Check(CheckArgs),
    /// Print total pointwise errors and, optionally, covariance/correlation matrices.
    Errors(ErrorsArgs),
    /// Plot the data points with error bars in the terminal.
    Plot(PlotArgs),
    /// Export resolved points (CSV) and/or the resolved dataset (JSON).
    Export(ExportArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct CheckArgs {
    /// Fit configuration file (YAML or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct ErrorsArgs {
    /// Fit configuration file (YAML or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only report this axis (default: both).
    #[arg(long, value_enum)]
    pub axis: Option<Axis>,

    /// Print the total covariance matrix.
    #[arg(long)]
    pub cov: bool,

    /// Print the total correlation matrix.
    #[arg(long)]
    pub cor: bool,

    /// Print the split into fully correlated shifts (G) and the remainder (U).
    #[arg(long)]
    pub split: bool,

    /// Disable an error source by name before reporting (repeatable).
    #[arg(long = "disable", value_name = "NAME")]
    pub disable: Vec<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Fit configuration file, or a resolved JSON file with `--resolved`.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Treat FILE as a JSON file produced by `xyfit export --json`.
    #[arg(long)]
    pub resolved: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Fit configuration file (YAML or JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Write `index,x,x_err,y,y_err` rows to this CSV file.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Write the resolved dataset to this JSON file.
    ///
    /// If neither `--csv` nor `--json` is given, the JSON is printed to stdout.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn errors_subcommand_parses_flags() {
        let cli = Cli::parse_from([
            "xyfit", "-vv", "errors", "fit.yml", "--axis", "y", "--cov", "--disable", "gain", "--disable", "stat",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Errors(args) = cli.command else {
            panic!("expected errors subcommand");
        };
        assert_eq!(args.axis, Some(Axis::Y));
        assert!(args.cov);
        assert!(!args.cor);
        assert_eq!(args.disable, vec!["gain".to_string(), "stat".to_string()]);
    }

    #[test]
    fn plot_defaults() {
        let cli = Cli::parse_from(["xyfit", "plot", "fit.yml"]);
        let Command::Plot(args) = cli.command else {
            panic!("expected plot subcommand");
        };
        assert!(!args.resolved);
        assert_eq!(args.width, 72);
        assert_eq!(args.height, 20);
    }
}
