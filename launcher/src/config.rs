use crate::error::{LauncherError, LauncherResult};
use image_ref::{DEFAULT_REPOSITORY, DEFAULT_VERSION_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Host directory under which per-environment demo directories are created
pub const DEFAULT_DEMO_ROOT: &str = "/tmp/world-of-bits-demo";

/// Port the environment container serves VNC on
pub const DEFAULT_CONTAINER_PORT: u16 = 5899;

/// Path inside the container where demos are written
pub const DEFAULT_CONTAINER_MOUNT: &str = "/tmp/demo";

/// Entry point mode that records demonstrations
pub const DEFAULT_MODE: &str = "demonstration";

pub const DEFAULT_RUNTIME: &str = "docker";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub demo_root: PathBuf,
    pub image_repository: String,
    pub version_file: PathBuf,
    pub container_port: u16,
    pub container_mount: String,
    pub capabilities: Vec<String>,
    pub mode: String,
    pub runtime: String,
    pub interactive: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            demo_root: PathBuf::from(DEFAULT_DEMO_ROOT),
            image_repository: DEFAULT_REPOSITORY.to_string(),
            version_file: PathBuf::from(DEFAULT_VERSION_FILE),
            container_port: DEFAULT_CONTAINER_PORT,
            container_mount: DEFAULT_CONTAINER_MOUNT.to_string(),
            capabilities: vec!["NET_ADMIN".to_string(), "SYS_ADMIN".to_string()],
            mode: DEFAULT_MODE.to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
            interactive: true,
        }
    }
}

impl LauncherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML config file. Keys missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> LauncherResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LauncherError::ConfigFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            LauncherError::ConfigFile { reason, .. } => LauncherError::ConfigFile {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_toml_str(contents: &str) -> LauncherResult<Self> {
        toml::from_str(contents).map_err(|e| LauncherError::ConfigFile {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn with_demo_root(mut self, demo_root: impl Into<PathBuf>) -> Self {
        self.demo_root = demo_root.into();
        self
    }

    pub fn with_image_repository(mut self, repository: impl Into<String>) -> Self {
        self.image_repository = repository.into();
        self
    }

    pub fn with_version_file(mut self, version_file: impl Into<PathBuf>) -> Self {
        self.version_file = version_file.into();
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.demo_root.as_os_str().is_empty() {
            return Err("Demo root cannot be empty".to_string());
        }

        if self.demo_root.to_string_lossy().contains(':') {
            return Err("Demo root cannot contain ':'".to_string());
        }

        image_ref::validate_repository(&self.image_repository).map_err(|e| e.to_string())?;

        if self.version_file.as_os_str().is_empty() {
            return Err("Version file path cannot be empty".to_string());
        }

        if self.container_port == 0 {
            return Err("Container port must be greater than 0".to_string());
        }

        if !self.container_mount.starts_with('/') {
            return Err("Container mount must be an absolute path".to_string());
        }

        if self.container_mount.contains(':') {
            return Err("Container mount cannot contain ':'".to_string());
        }

        if self.capabilities.iter().any(|cap| cap.trim().is_empty()) {
            return Err("Capability names cannot be empty".to_string());
        }

        if self.mode.trim().is_empty() {
            return Err("Mode cannot be empty".to_string());
        }

        if self.runtime.trim().is_empty() {
            return Err("Container runtime cannot be empty".to_string());
        }

        Ok(())
    }
}
