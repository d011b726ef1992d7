//! TOML configuration loading.
//!
//! ```toml
//! agent_host = "localhost"
//! agent_ports = [8182, 8283]
//! backend_url = "https://pos.example.com"
//! locate_timeout_ms = 3000
//! sign_algorithm = "SHA512"
//! ```
//!
//! A missing file is not an error: the client runs with
//! [`ClientConfig::default()`].  Missing keys fall back to their defaults too,
//! see [`crate::domain::config`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::ClientConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error other than "not found".
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Loads a [`ClientConfig`] from `path`, returning the defaults if the file
/// does not exist.
///
/// # Errors
///
/// [`ConfigError::Io`] for unreadable files and [`ConfigError::Parse`] for
/// malformed TOML.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config file at {}; using defaults", path.display());
            Ok(ClientConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use qzprint_core::SignAlgorithm;

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let cfg = load_config(&path).unwrap();

        // Assert
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_load_config_reads_values_from_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qzprint.toml");
        std::fs::write(
            &path,
            "agent_ports = [9000]\nlocate_timeout_ms = 1500\nsign_algorithm = \"SHA512\"\n",
        )
        .unwrap();

        // Act
        let cfg = load_config(&path).unwrap();

        // Assert
        assert_eq!(cfg.agent_ports, vec![9000]);
        assert_eq!(cfg.locate_timeout_ms, 1500);
        assert_eq!(cfg.sign_algorithm, SignAlgorithm::Sha512);
        assert_eq!(cfg.backend_url, "http://localhost:8069");
    }

    #[test]
    fn test_load_config_reports_parse_error_with_path() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "agent_ports = [not a number").unwrap();

        // Act
        let err = load_config(&path).unwrap_err();

        // Assert
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_load_config_on_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
