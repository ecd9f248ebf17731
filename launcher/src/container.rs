use crate::config::LauncherConfig;
use crate::demo::DemoRequest;
use crate::error::{LauncherError, LauncherResult};
use image_ref::ImageRef;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Container runtimes the launcher knows how to drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ContainerRuntime {
    /// Docker container runtime
    Docker,
    /// Podman container runtime
    Podman,
    /// Any other program accepting docker-compatible `run` arguments
    Other(String),
}

impl ContainerRuntime {
    /// Get the command name for this runtime
    pub fn command(&self) -> &str {
        match self {
            ContainerRuntime::Docker => "docker",
            ContainerRuntime::Podman => "podman",
            ContainerRuntime::Other(program) => program,
        }
    }

    /// Check whether the runtime binary answers `--version`
    pub fn is_available(&self) -> bool {
        std::process::Command::new(self.command())
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

impl FromStr for ContainerRuntime {
    type Err = LauncherError;

    /// `auto` picks the first available of docker and podman
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(LauncherError::Config(
                "Container runtime cannot be empty".to_string(),
            )),
            "docker" => Ok(ContainerRuntime::Docker),
            "podman" => Ok(ContainerRuntime::Podman),
            "auto" => Ok(detect_runtime()),
            other => Ok(ContainerRuntime::Other(other.to_string())),
        }
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl From<ContainerRuntime> for String {
    fn from(runtime: ContainerRuntime) -> Self {
        runtime.command().to_string()
    }
}

/// Detect an installed runtime, preferring Docker.
///
/// Falls back to Docker when neither answers so that the spawn reports the
/// missing binary.
pub fn detect_runtime() -> ContainerRuntime {
    if ContainerRuntime::Docker.is_available() {
        return ContainerRuntime::Docker;
    }

    if ContainerRuntime::Podman.is_available() {
        return ContainerRuntime::Podman;
    }

    warn!("neither docker nor podman answered --version");
    ContainerRuntime::Docker
}

/// Fully resolved container invocation for one demo
#[derive(Debug, Clone, Serialize)]
pub struct LaunchPlan {
    pub runtime: ContainerRuntime,
    pub request: DemoRequest,
    pub host_dir: PathBuf,
    pub image: ImageRef,
    args: Vec<String>,
}

impl LaunchPlan {
    pub fn new(
        config: &LauncherConfig,
        runtime: ContainerRuntime,
        request: DemoRequest,
        host_dir: PathBuf,
        image: ImageRef,
    ) -> Self {
        let mut args = vec![
            "run".to_string(),
            "-v".to_string(),
            format!("{}:{}", host_dir.display(), config.container_mount),
            "-p".to_string(),
            format!("{}:{}", request.port, config.container_port),
        ];

        for capability in &config.capabilities {
            args.push("--cap-add".to_string());
            args.push(capability.clone());
        }

        if config.interactive {
            args.push("-it".to_string());
        }

        args.push(image.to_string());

        // Everything after the image goes to the container's entry point.
        args.push(config.mode.clone());
        args.push("-e".to_string());
        args.push(format!("ENV={}", request.env_id));

        Self {
            runtime,
            request,
            host_dir,
            image,
            args,
        }
    }

    /// Arguments passed to the runtime binary, in order
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The invocation as a shell command line, for display only
    pub fn command_line(&self) -> String {
        std::iter::once(self.runtime.command())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(word: &str) -> Cow<'_, str> {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));

    if safe {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

/// Run the planned container in the foreground and wait for it to exit.
///
/// Standard streams are inherited so the container can use the terminal.
/// Returns the exit status to report for the launcher process.
pub async fn launch(plan: &LaunchPlan) -> LauncherResult<u8> {
    info!(
        runtime = %plan.runtime,
        image = %plan.image,
        env_id = %plan.request.env_id,
        port = %plan.request.port,
        "starting demo container"
    );
    debug!(command = %plan.command_line(), "container command");

    let status = tokio::process::Command::new(plan.runtime.command())
        .args(plan.args())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => LauncherError::RuntimeNotFound {
                runtime: plan.runtime.to_string(),
            },
            _ => LauncherError::SpawnFailed {
                runtime: plan.runtime.to_string(),
                source,
            },
        })?;

    let code = exit_code(status);
    info!(code, "demo container exited");
    Ok(code)
}

/// Map a child's exit status to the status a shell would report
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return code.clamp(0, 255) as u8;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128u8.saturating_add(signal.clamp(0, 127) as u8);
        }
    }

    1
}
