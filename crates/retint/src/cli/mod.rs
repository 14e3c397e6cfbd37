//! Command implementations.

pub mod config;
pub mod correct;
pub mod fetch;
pub mod serve;

use retint_core::Config;
use std::path::Path;

/// Load the configuration for this invocation.
///
/// With `strict`, an explicit path must load cleanly. Otherwise, and always
/// for the default location, a missing or broken file only produces a
/// warning and the defaults are used. The `config` command loads leniently
/// so `init` can create or repair the file it points at.
pub fn load_config(explicit: Option<&Path>, strict: bool) -> anyhow::Result<Config> {
    let loaded = match explicit {
        Some(path) if strict => {
            return Config::load_from(path)
                .map_err(|e| anyhow::anyhow!("Cannot load config {}: {e}", path.display()));
        }
        Some(path) if !path.exists() => return Ok(Config::default()),
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match loaded {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `retint config path`."
            );
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retint.toml");
        std::fs::write(&path, "[fetch]\nparallel = 3\n").unwrap();

        let config = load_config(Some(&path), true).unwrap();
        assert_eq!(config.fetch.parallel, 3);
    }

    #[test]
    fn test_broken_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retint.toml");
        std::fs::write(&path, "[fetch]\nparallel = 0\n").unwrap();

        assert!(load_config(Some(&path), true).is_err());
        assert!(load_config(Some(&dir.path().join("missing.toml")), true).is_err());
    }

    #[test]
    fn test_lenient_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("retint.toml");
        std::fs::write(&broken, "[fetch]\nparallel = 0\n").unwrap();

        let config = load_config(Some(&broken), false).unwrap();
        assert_eq!(config.fetch.parallel, Config::default().fetch.parallel);

        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing), false).is_ok());
        assert!(!missing.exists());
    }
}
