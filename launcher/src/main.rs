use clap::Parser;
use launcher::{plan_demo, run_demo, DemoRequest, LauncherConfig, LauncherResult, USAGE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "wob-demo")]
#[command(about = "Host a world-of-bits demonstration container")]
#[command(version)]
struct Cli {
    /// Environment id and host port, e.g. `wob.mini.ClickShape-v0 21000`
    #[arg(value_name = "ENV_ID PORT")]
    args: Vec<String>,

    /// TOML file overriding the built-in defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory under which per-environment demo directories are created
    #[arg(long, env = "WOB_DEMO_ROOT")]
    demo_root: Option<PathBuf>,

    /// Image repository, without a tag
    #[arg(long, env = "WOB_IMAGE")]
    image: Option<String>,

    /// File holding the image tag
    #[arg(long, env = "WOB_VERSION_FILE")]
    version_file: Option<PathBuf>,

    /// Container runtime: docker, podman, auto, or a program path
    #[arg(long, env = "WOB_CONTAINER_RUNTIME")]
    runtime: Option<String>,

    /// Do not allocate a TTY or keep stdin open
    #[arg(long)]
    no_tty: bool,

    /// Print the container command instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Print the dry-run plan as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,
}

impl Cli {
    /// Layer the config file and command-line overrides over the defaults
    fn resolve_config(&self) -> LauncherResult<LauncherConfig> {
        let mut config = match &self.config {
            Some(path) => LauncherConfig::from_file(path)?,
            None => LauncherConfig::default(),
        };

        if let Some(demo_root) = &self.demo_root {
            config = config.with_demo_root(demo_root);
        }
        if let Some(image) = &self.image {
            config = config.with_image_repository(image);
        }
        if let Some(version_file) = &self.version_file {
            config = config.with_version_file(version_file);
        }
        if let Some(runtime) = &self.runtime {
            config = config.with_runtime(runtime);
        }
        if self.no_tty {
            config = config.with_interactive(false);
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            debug!(error = ?e, "launch failed");
            eprintln!("wob-demo: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> LauncherResult<u8> {
    let Some(request) = DemoRequest::from_args(cli.args.iter().cloned())? else {
        // Wrong argument count is reported but not treated as a failure.
        println!("{}", USAGE);
        return Ok(0);
    };

    let config = cli.resolve_config()?;

    if cli.dry_run {
        let plan = plan_demo(&config, request)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!("{}", plan.command_line());
        }
        return Ok(0);
    }

    run_demo(&config, request).await
}
