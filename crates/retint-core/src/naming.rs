//! Local file naming and public URL derivation.

use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;
use crate::error::PipelineError;

/// Which published directory a file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// A fetched original in `download_dir`
    Fetched,
    /// A corrected image in `corrected_dir`
    Corrected,
}

/// Reject anything that is not a plain file name.
///
/// Remote entry names and `/correct` inputs both end up joined onto a local
/// directory, so separators and dot segments are refused.
pub fn validate_input_name(name: &str) -> Result<(), PipelineError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(PipelineError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Local file name for a fetched remote entry.
pub fn local_name(prefix: &str, remote_name: &str) -> String {
    format!("{prefix}{remote_name}")
}

/// Output file name for a corrected input: prefix plus the input's base name.
pub fn corrected_name(prefix: &str, input_name: &str) -> String {
    format!("{prefix}{input_name}")
}

/// `{public_base_url}/{route}/{file_name}` for the given directory.
pub fn public_url(storage: &StorageConfig, kind: OutputKind, file_name: &str) -> String {
    let route = match kind {
        OutputKind::Fetched => &storage.download_route,
        OutputKind::Corrected => &storage.corrected_route,
    };
    format!(
        "{}/{}/{}",
        storage.public_base_url.trim_end_matches('/'),
        route.trim_matches('/'),
        file_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_input_name() {
        assert!(validate_input_name("n_photo.jpg").is_ok());
        assert!(validate_input_name("with space.jpg").is_ok());
        for bad in ["", ".", "..", "../x.jpg", "a/b.jpg", "a\\b.jpg"] {
            assert!(validate_input_name(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_names_use_prefixes() {
        assert_eq!(local_name("n_", "photo.jpg"), "n_photo.jpg");
        assert_eq!(corrected_name("c_", "n_photo.jpg"), "c_n_photo.jpg");
    }

    #[test]
    fn test_public_urls() {
        let storage = StorageConfig::default();
        assert_eq!(
            public_url(&storage, OutputKind::Corrected, "c_n_a.jpg"),
            "http://localhost:8000/corrected-images/c_n_a.jpg"
        );
        assert_eq!(
            public_url(&storage, OutputKind::Fetched, "n_a.jpg"),
            "http://localhost:8000/normal-images/n_a.jpg"
        );
    }

    #[test]
    fn test_public_url_trims_slashes() {
        let storage = StorageConfig {
            public_base_url: "https://img.example.com/".to_string(),
            corrected_route: "/out/".to_string(),
            ..StorageConfig::default()
        };
        assert_eq!(
            public_url(&storage, OutputKind::Corrected, "c_x.jpg"),
            "https://img.example.com/out/c_x.jpg"
        );
    }
}
