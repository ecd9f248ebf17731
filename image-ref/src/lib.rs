//! Container image references for wob-demo
//!
//! The environment image is published under a fixed repository and tagged
//! with the release recorded in a plain-text `VERSION` file. This crate reads
//! that file and assembles the `repository:tag` reference handed to the
//! container runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Repository the world-of-bits environment image is published under
pub const DEFAULT_REPOSITORY: &str = "quay.io/openai/universe.world-of-bits";

/// File holding the image tag, relative to the working directory
pub const DEFAULT_VERSION_FILE: &str = "VERSION";

/// Errors related to resolving an image reference
#[derive(Error, Debug)]
pub enum ImageRefError {
    #[error("Version file '{path}' not found. Run from the repository root or pass --version-file.")]
    VersionFileMissing { path: String },
    #[error("Version file '{path}' is empty")]
    EmptyVersion { path: String },
    #[error("Invalid image repository '{repository}': {reason}")]
    InvalidRepository { repository: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ImageRefResult<T> = Result<T, ImageRefError>;

/// A tagged container image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Registry and repository path, without a tag
    pub repository: String,
    /// Image tag
    pub tag: String,
}

impl ImageRef {
    /// Create a reference from its parts after checking the repository
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> ImageRefResult<Self> {
        let repository = repository.into();
        validate_repository(&repository)?;
        Ok(Self {
            repository,
            tag: tag.into(),
        })
    }

    /// Tag `repository` with the contents of the version file at `path`
    pub fn from_version_file(repository: impl Into<String>, path: &Path) -> ImageRefResult<Self> {
        let tag = read_version(path)?;
        Self::new(repository, tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Read the tag from a version file.
///
/// Surrounding whitespace, including the trailing newline editors add, is
/// stripped. An empty result is an error rather than an untagged reference.
pub fn read_version(path: &Path) -> ImageRefResult<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ImageRefError::VersionFileMissing {
                path: path.display().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let version = contents.trim();
    if version.is_empty() {
        return Err(ImageRefError::EmptyVersion {
            path: path.display().to_string(),
        });
    }

    Ok(version.to_string())
}

/// Check that a repository is non-empty and does not already carry a tag or digest
pub fn validate_repository(repository: &str) -> ImageRefResult<()> {
    let invalid = |reason: &str| ImageRefError::InvalidRepository {
        repository: repository.to_string(),
        reason: reason.to_string(),
    };

    if repository.trim().is_empty() {
        return Err(invalid("repository cannot be empty"));
    }

    if repository.chars().any(char::is_whitespace) {
        return Err(invalid("repository cannot contain whitespace"));
    }

    if repository.contains('@') {
        return Err(invalid("repository cannot contain a digest"));
    }

    // A colon before the last '/' is a registry port, not a tag.
    let last_segment = repository.rsplit('/').next().unwrap_or(repository);
    if last_segment.contains(':') {
        return Err(invalid("repository cannot contain a tag"));
    }

    Ok(())
}
