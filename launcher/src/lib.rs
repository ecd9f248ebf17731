//! Demo launcher for the world-of-bits environment container.
//!
//! Given an environment id and a host port, the launcher creates
//! `<demo_root>/<env_id>/`, mounts it into the environment image and runs the
//! container in demonstration mode in the foreground.

pub mod config;
pub mod container;
pub mod demo;
pub mod error;

pub use config::LauncherConfig;
pub use container::{detect_runtime, exit_code, launch, ContainerRuntime, LaunchPlan};
pub use demo::{ensure_demo_dir, DemoRequest, USAGE};
pub use error::{LauncherError, LauncherResult};

use image_ref::ImageRef;
use std::path::PathBuf;
use tracing::info;

/// Resolve the container invocation for `request` without creating the demo
/// directory or starting the container.
///
/// Reads the version file. With `runtime = "auto"` this also runs
/// `docker --version` / `podman --version` to pick a runtime, blocking the
/// calling thread.
pub fn plan_demo(config: &LauncherConfig, request: DemoRequest) -> LauncherResult<LaunchPlan> {
    config.validate().map_err(LauncherError::Config)?;
    let runtime: ContainerRuntime = config.runtime.parse()?;
    let host_dir = std::path::absolute(request.demo_dir(&config.demo_root))?;
    build_plan(config, runtime, request, host_dir)
}

/// Create the demo directory, start the container and wait for it.
///
/// Returns the exit status the launcher should report.
pub async fn run_demo(config: &LauncherConfig, request: DemoRequest) -> LauncherResult<u8> {
    config.validate().map_err(LauncherError::Config)?;

    // Runtime detection probes binaries synchronously.
    let runtime_name = config.runtime.clone();
    let runtime = tokio::task::spawn_blocking(move || runtime_name.parse::<ContainerRuntime>())
        .await
        .map_err(std::io::Error::other)??;

    let dir = ensure_demo_dir(&config.demo_root, &request.env_id)?;
    let host_dir = std::path::absolute(dir)?;
    info!(path = %host_dir.display(), "using demo directory");

    let plan = build_plan(config, runtime, request, host_dir)?;
    launch(&plan).await
}

fn build_plan(
    config: &LauncherConfig,
    runtime: ContainerRuntime,
    request: DemoRequest,
    host_dir: PathBuf,
) -> LauncherResult<LaunchPlan> {
    let image = ImageRef::from_version_file(config.image_repository.as_str(), &config.version_file)?;
    Ok(LaunchPlan::new(config, runtime, request, host_dir, image))
}
