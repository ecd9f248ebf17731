use image_ref::ImageRefError;
use thiserror::Error;

/// Exit status a shell reports when a command cannot be found
pub const EXIT_NOT_FOUND: u8 = 127;

/// Exit status a shell reports when a command is found but cannot be executed
pub const EXIT_NOT_EXECUTABLE: u8 = 126;

/// Errors raised by the launcher before or while starting the container
#[derive(Error, Debug)]
pub enum LauncherError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read or parsed
    #[error("Failed to load config file '{path}': {reason}")]
    ConfigFile { path: String, reason: String },

    /// Environment identifier cannot be used as a directory name
    #[error("Invalid environment id '{env_id}': {reason}")]
    InvalidEnvId { env_id: String, reason: String },

    /// Demo directory could not be created
    #[error("Failed to create demo directory '{path}': {source}")]
    DemoDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Image reference could not be resolved
    #[error(transparent)]
    Image(#[from] ImageRefError),

    /// Container runtime binary is not on PATH
    #[error("{runtime}: command not found. Please install Docker or Podman, or pass --runtime.")]
    RuntimeNotFound { runtime: String },

    /// Container runtime could not be started
    #[error("Failed to start container runtime '{runtime}': {source}")]
    SpawnFailed {
        runtime: String,
        #[source]
        source: std::io::Error,
    },

    /// Launch plan could not be rendered
    #[error("Failed to serialize launch plan: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LauncherError {
    /// Process exit status to report for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            LauncherError::RuntimeNotFound { .. } => EXIT_NOT_FOUND,
            LauncherError::SpawnFailed { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                EXIT_NOT_EXECUTABLE
            }
            _ => 1,
        }
    }
}

pub type LauncherResult<T> = Result<T, LauncherError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exit_codes() {
        let error = LauncherError::RuntimeNotFound {
            runtime: "docker".to_string(),
        };
        assert_eq!(error.exit_code(), 127);

        let error = LauncherError::SpawnFailed {
            runtime: "docker".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error.exit_code(), 126);

        let error = LauncherError::SpawnFailed {
            runtime: "docker".to_string(),
            source: io::Error::other("boom"),
        };
        assert_eq!(error.exit_code(), 1);

        let error = LauncherError::Image(ImageRefError::EmptyVersion {
            path: "VERSION".to_string(),
        });
        assert_eq!(error.exit_code(), 1);

        let error = LauncherError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(matches!(error, LauncherError::Serialize(_)));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let error = LauncherError::RuntimeNotFound {
            runtime: "docker".to_string(),
        };
        assert!(error.to_string().starts_with("docker: command not found"));

        let error = LauncherError::DemoDir {
            path: "/tmp/world-of-bits-demo/x".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("/tmp/world-of-bits-demo/x"));

        let error = LauncherError::Image(ImageRefError::VersionFileMissing {
            path: "VERSION".to_string(),
        });
        assert!(error.to_string().contains("Version file 'VERSION' not found"));

        let error = LauncherError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(error
            .to_string()
            .starts_with("Failed to serialize launch plan"));
    }
}
