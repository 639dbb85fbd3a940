//! Shared "load" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read file -> parse + validate -> build container
//!
//! The subcommands can then focus on presentation (summaries, plots, exports).

use std::path::Path;

use tracing::debug;

use crate::container::XyContainer;
use crate::domain::FitConfigFile;
use crate::error::AppError;
use crate::io::load::load_fit_container;

/// A loaded configuration and the container built from it.
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub config: FitConfigFile,
    pub container: XyContainer,
}

/// Load a configuration file and build its container.
pub fn load(path: &Path) -> Result<LoadOutput, AppError> {
    let (config, container) = load_fit_container(path)?;
    debug!(
        points = container.size(),
        sources = container.errors().len(),
        "built container"
    );
    Ok(LoadOutput { config, container })
}

/// Disable the named error sources; unknown names are reported as input errors.
pub fn disable_sources(container: &mut XyContainer, names: &[String]) -> Result<(), AppError> {
    for name in names {
        container.disable_error(name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn data_file(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
    }

    #[test]
    fn loads_bundled_example() {
        let out = load(&data_file("xy_example.yml")).unwrap();
        assert_eq!(out.container.size(), 4);
        assert_eq!(out.container.errors().len(), 2);
    }

    #[test]
    fn disable_unknown_source_fails_with_exit_code_3() {
        let mut out = load(&data_file("xy_sources.yml")).unwrap();
        disable_sources(&mut out.container, &["gain".to_string()]).unwrap();
        assert!(!out.container.error("gain").unwrap().enabled);

        let err = disable_sources(&mut out.container, &["missing".to_string()]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_file_fails_with_exit_code_2() {
        let err = load(&data_file("does_not_exist.yml")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
