use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use graphsense_core::{ServiceKind, Settings, TracingReporter};
use graphsense_lifecycle::Orchestrator;

mod commands;

#[derive(Parser)]
#[command(
    name = "graphsense",
    about = "GraphSense: isolated code-graph stacks on a single host",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Base docker-compose.yml shared by every instance (overrides config.toml)
    #[arg(long, global = true)]
    compose_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new instance for a repository.
    ///
    /// If no instance name is given it is generated from the repository
    /// directory name (`graphsense-<dir>`).
    Deploy {
        /// Repository to index
        repo_path: PathBuf,
        /// Instance name (sanitized to lowercase letters, digits, and hyphens)
        instance_name: Option<String>,
        /// Base port for the instance (default: auto-assigned from 8080)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Stop a running instance without removing it
    Stop { instance_name: String },
    /// Start a stopped instance
    Start { instance_name: String },
    /// Permanently remove an instance and all its data
    Remove {
        instance_name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List recorded and running instances
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Show logs of an instance, optionally for one service (app, postgres, neo4j)
    Logs {
        instance_name: String,
        service: Option<ServiceKind>,
        /// Print current logs and exit instead of following
        #[arg(long)]
        no_follow: bool,
    },
    /// Show containers and recorded details of an instance
    Status { instance_name: String },
    /// Show port usage and compose projects for troubleshooting
    Debug,
    /// Prune stopped containers and unused volumes
    Cleanup,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("graphsense=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load GraphSense settings")?;
    if let Some(path) = cli.compose_file {
        settings.compose_file = Some(path);
    }
    settings
        .ensure_home()
        .context("failed to create the GraphSense home directory")?;

    let orchestrator = Orchestrator::from_settings(settings, Arc::new(TracingReporter));

    match cli.command {
        Commands::Deploy {
            repo_path,
            instance_name,
            port,
        } => commands::instance::deploy(&orchestrator, repo_path, instance_name, port),
        Commands::Stop { instance_name } => commands::instance::stop(&orchestrator, &instance_name),
        Commands::Start { instance_name } => {
            commands::instance::start(&orchestrator, &instance_name)
        }
        Commands::Remove { instance_name, yes } => {
            commands::instance::remove(&orchestrator, &instance_name, yes)
        }
        Commands::List { format } => commands::info::list(&orchestrator, &format),
        Commands::Logs {
            instance_name,
            service,
            no_follow,
        } => commands::info::logs(&orchestrator, &instance_name, service, !no_follow),
        Commands::Status { instance_name } => commands::info::status(&orchestrator, &instance_name),
        Commands::Debug => commands::info::debug(&orchestrator),
        Commands::Cleanup => {
            orchestrator.cleanup();
            Ok(())
        }
    }
}
