// Main entrypoint for meshctl.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use meshctl::app::App;
use meshctl::config::{Config, ConfigTrait};

const CONFIG_PATH: &str = "cfg/meshctl.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/meshctl.cfg.local.yaml";

/// meshctl - deploys module/sidecar pairs of a service mesh on one host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy management modules, then every module of the profile
    Deploy {
        /// Do not wait for health checks
        #[arg(long)]
        skip_readiness: bool,
    },
    /// Remove every container of the profile
    Undeploy {
        /// Remove management modules as well
        #[arg(long)]
        all: bool,
    },
    /// Redeploy a module pair on fresh ports, optionally routing to an external module
    Intercept {
        module: String,
        #[arg(long, value_name = "URL")]
        module_url: Option<String>,
        #[arg(long, value_name = "URL")]
        sidecar_url: Option<String>,
    },
    /// Redeploy a module pair at its in-mesh addresses
    Restore { module: String },
    /// Redeploy a module pair at the next version
    Upgrade { module: String },
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<Config> {
    if let Some(custom_path) = path {
        return Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path));
    }

    match Config::load(PathBuf::from(CONFIG_PATH_LOCAL)) {
        Ok(cfg) => Ok(cfg),
        Err(_) => Config::load(PathBuf::from(CONFIG_PATH))
            .with_context(|| format!("failed to load config from {}", CONFIG_PATH)),
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_ref())
        .map(|s| s.as_str())
        .unwrap_or("info");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Deploy { skip_readiness } => {
            let result = app.deploy(skip_readiness).await?;
            info!(
                component = "main",
                event = "deploy_done",
                modules = result.len(),
                "deployment finished"
            );
        }
        Command::Undeploy { all } => {
            let removed = app.undeploy(all).await?;
            info!(
                component = "main",
                event = "undeploy_done",
                removed,
                "undeploy finished"
            );
        }
        Command::Intercept {
            module,
            module_url,
            sidecar_url,
        } => {
            let pair = app.intercept(&module, module_url, sidecar_url).await?;
            log_pair("intercept_done", &pair);
        }
        Command::Restore { module } => {
            let pair = app.restore(&module).await?;
            log_pair("restore_done", &pair);
        }
        Command::Upgrade { module } => {
            let pair = app.upgrade(&module).await?;
            log_pair("upgrade_done", &pair);
        }
    }
    Ok(())
}

fn log_pair(event: &'static str, pair: &meshctl::model::ModulePair) {
    let ports = pair.ports();
    info!(
        component = "main",
        event,
        module = %pair.id(),
        module_port = ports.module_server,
        module_debug_port = ports.module_debug,
        sidecar_port = ports.sidecar_server,
        sidecar_debug_port = ports.sidecar_debug,
        "pair redeployed"
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let cfg = load_cfg(args.cfg)?;
    configure_logger(&cfg);
    info!(
        component = "config",
        event = "load_success",
        profile = %cfg.profile(),
        "config loaded"
    );

    let app = App::new(cfg)?;
    if let Err(e) = run(&app, args.command).await {
        error!(
            component = "main",
            event = "command_failed",
            error = %format!("{:#}", e),
            "command failed"
        );
        return Err(e);
    }
    Ok(())
}
