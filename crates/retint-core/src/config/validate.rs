//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const BACKENDS: &[&str] = &["local", "http"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BACKENDS.contains(&self.remote.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "remote.backend must be one of {:?}, got {:?}",
                BACKENDS, self.remote.backend
            )));
        }
        if self.remote.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "remote.connect_timeout_ms must be > 0".into(),
            ));
        }
        if self.fetch.parallel == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.parallel must be > 0".into(),
            ));
        }
        if self.correction.parallel == 0 {
            return Err(ConfigError::ValidationError(
                "correction.parallel must be > 0".into(),
            ));
        }
        if !self.correction.white_balance_scale_percent.is_finite() {
            return Err(ConfigError::ValidationError(
                "correction.white_balance_scale_percent must be a finite number".into(),
            ));
        }
        if !(1..=100).contains(&self.correction.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "correction.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        for (key, prefix) in [
            ("storage.download_prefix", &self.storage.download_prefix),
            ("storage.corrected_prefix", &self.storage.corrected_prefix),
        ] {
            if prefix.is_empty() || prefix.contains(['/', '\\']) {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must be non-empty and contain no path separators"
                )));
            }
        }
        if self.storage.download_dir == self.storage.corrected_dir
            && self.storage.download_prefix == self.storage.corrected_prefix
        {
            return Err(ConfigError::ValidationError(
                "storage.corrected_prefix must differ from storage.download_prefix \
                 when both directories are the same"
                    .into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallel() {
        let mut config = Config::default();
        config.fetch.parallel = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch.parallel"));
    }

    #[test]
    fn test_validate_rejects_zero_correction_parallel() {
        let mut config = Config::default();
        config.correction.parallel = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("correction.parallel"));
    }

    #[test]
    fn test_validate_rejects_unknown_backend() {
        let mut config = Config::default();
        config.remote.backend = "ftp".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("remote.backend"));
    }

    #[test]
    fn test_validate_rejects_non_finite_scale() {
        let mut config = Config::default();
        config.correction.white_balance_scale_percent = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("white_balance_scale_percent"));
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let mut config = Config::default();
        config.correction.jpeg_quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_validate_rejects_prefix_with_separator() {
        let mut config = Config::default();
        config.storage.corrected_prefix = "out/".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("storage.corrected_prefix"));
    }

    #[test]
    fn test_validate_rejects_colliding_outputs() {
        let mut config = Config::default();
        config.storage.corrected_dir = config.storage.download_dir.clone();
        config.storage.corrected_prefix = config.storage.download_prefix.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("corrected_prefix"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }
}
