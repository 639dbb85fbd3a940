//! Fit configuration loading and validation.
//!
//! This module turns a YAML (or JSON) document into a `FitConfigFile` that is
//! safe to build a container from:
//! - **Strict contract** for the data keys (clear errors, exit codes 2/3)
//! - **Lenient** about keys it does not interpret (logged, then ignored)
//! - **Separation of concerns**: no error-matrix logic here beyond validation

use std::path::Path;

use tracing::{debug, info, warn};

use crate::container::XyContainer;
use crate::domain::{Axis, FitConfigFile};
use crate::error::{ConfigError, ContainerError};
use crate::math::{absolute_errors, add_in_quadrature, broadcast_checked};

/// Read and validate a fit configuration file.
pub fn load_fit_config(path: &Path) -> Result<FitConfigFile, ConfigError> {
    let config = parse_fit_config(&read_config_text(path)?)?;
    info!(
        path = %path.display(),
        points = config.size(),
        x_errors = config.x_errors.is_some(),
        "loaded fit configuration"
    );
    Ok(config)
}

/// Read a fit configuration file and build its container in one pass.
pub fn load_fit_container(path: &Path) -> Result<(FitConfigFile, XyContainer), ConfigError> {
    let config = parse_document(&read_config_text(path)?)?;
    let container = config.build_container()?;
    info!(
        path = %path.display(),
        points = container.size(),
        sources = container.errors().len(),
        "loaded fit configuration"
    );
    Ok((config, container))
}

/// Parse and validate a fit configuration document.
pub fn parse_fit_config(text: &str) -> Result<FitConfigFile, ConfigError> {
    let config = parse_document(text)?;
    config.validate()?;
    Ok(config)
}

fn read_config_text(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_document(text: &str) -> Result<FitConfigFile, ConfigError> {
    // Editors on some platforms prepend a UTF-8 BOM.
    let text = text.trim_start_matches('\u{feff}');
    let config: FitConfigFile = serde_yaml::from_str(text)?;

    for key in config.extra.keys() {
        warn!(key = %key, "ignoring unsupported configuration key");
    }
    Ok(config)
}

impl FitConfigFile {
    /// Check every invariant of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_container().map(|_| ())
    }

    /// Check the configuration and build the container it describes.
    pub fn build_container(&self) -> Result<XyContainer, ConfigError> {
        if let Some(kind) = &self.kind {
            if !kind.trim().eq_ignore_ascii_case("xy") {
                return Err(ConfigError::UnsupportedType(kind.clone()));
            }
        }
        if self.y_errors.is_none() {
            return Err(ConfigError::MissingYErrors);
        }

        let container = XyContainer::from_config(self)?;
        debug!(
            points = container.size(),
            sources = container.errors().len(),
            "fit configuration is valid"
        );
        Ok(container)
    }

    /// Absolute pointwise total uncertainty declared for `axis`.
    ///
    /// A scalar broadcasts to every point, a list applies pointwise, relative
    /// values are scaled by `|data|`, and several sources add in quadrature.
    /// Returns `None` if the axis declares no errors.
    pub fn effective_errors(&self, axis: Axis) -> Result<Option<Vec<f64>>, ContainerError> {
        let Some(input) = self.errors(axis) else {
            return Ok(None);
        };

        let data = self.data(axis);
        let mut total = vec![0.0; data.len()];
        for def in input.sources() {
            let values = broadcast_checked(&def.error_value, data.len(), axis)?;
            total = add_in_quadrature(&total, &absolute_errors(&values, def.relative, data));
        }
        Ok(Some(total))
    }

    pub fn effective_x_errors(&self) -> Result<Option<Vec<f64>>, ContainerError> {
        self.effective_errors(Axis::X)
    }

    /// `y_errors` is required, so a missing declaration is an error here.
    pub fn effective_y_errors(&self) -> Result<Vec<f64>, ConfigError> {
        self.effective_errors(Axis::Y)?.ok_or(ConfigError::MissingYErrors)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::ErrorInput;

    const EXAMPLE: &str = include_str!("../../data/xy_example.yml");

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn example_file_parses() {
        let config = parse_fit_config(EXAMPLE).unwrap();
        assert_eq!(config.x_data, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(config.y_data, vec![2.3, 4.2, 7.5, 9.4]);
        assert_eq!(config.x_errors, Some(ErrorInput::Pointwise(vec![0.05, 0.10, 0.15, 0.20])));
        assert_eq!(config.y_errors, Some(ErrorInput::Scalar(0.4)));
    }

    #[test]
    fn example_effective_errors() {
        let config = parse_fit_config(EXAMPLE).unwrap();
        assert_eq!(config.effective_y_errors().unwrap(), vec![0.4, 0.4, 0.4, 0.4]);
        assert_eq!(
            config.effective_x_errors().unwrap(),
            Some(vec![0.05, 0.10, 0.15, 0.20])
        );
    }

    #[test]
    fn x_errors_are_optional() {
        let config = parse_fit_config("x_data: [1, 2]\ny_data: [3, 4]\ny_errors: 0.5\n").unwrap();
        assert_eq!(config.effective_x_errors().unwrap(), None);
        assert_eq!(config.effective_y_errors().unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn y_errors_are_required() {
        let err = parse_fit_config("x_data: [1, 2]\ny_data: [3, 4]\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingYErrors));
    }

    #[test]
    fn data_length_mismatch_is_rejected() {
        let err = parse_fit_config("x_data: [1, 2, 3]\ny_data: [3, 4]\ny_errors: 0.1\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ContainerError::DataLengthMismatch { x: 3, y: 2 })
        ));
    }

    #[test]
    fn error_list_length_mismatch_is_rejected() {
        let err = parse_fit_config("x_data: [1, 2]\ny_data: [3, 4]\ny_errors: [0.1, 0.2, 0.3]\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ContainerError::ErrorLengthMismatch {
                axis: Axis::Y,
                expected: 2,
                got: 3
            })
        ));
    }

    #[test]
    fn missing_data_key_is_a_parse_error() {
        let err = parse_fit_config("x_data: [1, 2]\ny_errors: 0.1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let err = parse_fit_config("type: histogram\nx_data: [1]\ny_data: [1]\ny_errors: 0.1\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedType(kind) if kind == "histogram"));
    }

    #[test]
    fn unknown_keys_are_kept_aside() {
        let config = parse_fit_config(
            "type: xy\nmodel_function: linear_model\nx_data: [1]\ny_data: [1]\ny_errors: 0.1\n",
        )
        .unwrap();
        assert!(config.extra.contains_key("model_function"));
        assert_eq!(config.kind.as_deref(), Some("xy"));
    }

    #[test]
    fn detailed_sources_combine_in_quadrature() {
        let text = "\
x_data: [1.0, 2.0]
y_data: [10.0, 20.0]
y_errors:
  - error_value: 0.3
    name: stat
  - error_value: 0.02
    relative: true
    correlation_coefficient: 0.5
    name: scale
";
        let config = parse_fit_config(text).unwrap();
        let y_err = config.effective_y_errors().unwrap();
        assert_close(&y_err, &[0.3f64.hypot(0.2), 0.3f64.hypot(0.4)]);

        let container = XyContainer::from_config(&config).unwrap();
        assert_close(&container.y_err(), &y_err);
        assert!(container.error("stat").is_some());
        assert!(container.error("scale").unwrap().splittable);
    }

    #[test]
    fn misspelled_source_key_is_a_parse_error() {
        let text = "\
x_data: [1.0, 2.0]
y_data: [3.0, 4.0]
y_errors:
  error_value: 0.1
  corelation_coefficient: 0.9
  relatve: true
";
        let err = parse_fit_config(text).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let message = err.to_string();
        assert!(message.contains("invalid `y_errors`"), "{message}");
        assert!(message.contains("corelation_coefficient"), "{message}");
    }

    #[test]
    fn malformed_error_list_names_its_key() {
        let err = parse_fit_config("x_data: [1, 2]\ny_data: [3, 4]\ny_errors: [0.1, oops]\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid `y_errors`"), "{message}");
        assert!(message.contains("string `oops`"), "{message}");

        let err = parse_fit_config("x_data: [1, 2]\nx_errors: yes\ny_data: [3, 4]\ny_errors: 0.1\n").unwrap_err();
        assert!(err.to_string().contains("invalid `x_errors`"), "{err}");
    }

    #[test]
    fn splittable_flag_reaches_the_container() {
        let text = "\
x_data: [1.0, 2.0]
y_data: [10.0, 20.0]
y_errors:
  error_value: 0.2
  correlation_coefficient: 0.5
  splittable: false
  name: norm
";
        let config = parse_fit_config(text).unwrap();
        let container = config.build_container().unwrap();
        assert!(!container.error("norm").unwrap().splittable);
        let (g, _) = container.split_errors(Axis::Y);
        assert_eq!(g.nrows(), 0);
    }

    #[test]
    fn json_documents_are_accepted() {
        let config = parse_fit_config(r#"{"x_data": [1, 2], "y_data": [2, 4], "y_errors": [0.1, 0.2]}"#).unwrap();
        assert_eq!(config.effective_y_errors().unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();
        let config = load_fit_config(file.path()).unwrap();
        assert_eq!(config.size(), 4);

        let (config, container) = load_fit_container(file.path()).unwrap();
        assert_eq!(container, XyContainer::from_config(&config).unwrap());

        let err = load_fit_config(Path::new("/definitely/not/here.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
