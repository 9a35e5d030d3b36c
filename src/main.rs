use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use migrate_mariadb::commands::{self, FailureKind, Operation, OutputFormat, RunOptions, UsageError};
use migrate_mariadb::config::{self, ConfigBuilder, ConfigInput, EnvOverrides};
use migrate_mariadb::constants::{CONFIG_FILENAME, ENV_MIGRATION_COMMAND};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Exit status after Ctrl-C or SIGTERM
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config_file: PathBuf,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    /// Show the plan without executing any script
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(flatten)]
    database_args: config::DatabaseArgs,

    #[command(flatten)]
    migrations_args: config::MigrationsArgs,

    /// Defaults to MIGRATION_COMMAND, then `sync`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending migration
    #[command(visible_alias = "u")]
    Up,

    /// Revert every applied migration
    #[command(visible_alias = "d")]
    Down,

    /// Migrate to the newest version in the migrations directory
    Sync,

    /// Apply N migrations; negative N reverts
    #[command(visible_aliases = ["s", "steps"])]
    Step {
        #[arg(allow_negative_numbers = true)]
        n: i64,
    },

    /// Migrate up or down to exactly VERSION
    Migrate { version: u64 },

    /// Mark VERSION as applied and clean without running anything
    #[command(visible_alias = "f")]
    Force { version: u64 },

    /// Create the next up/down migration pair
    New {
        /// Name for the migration (prompted for when omitted)
        name: Option<String>,
    },

    /// Validate migration files for duplicate versions
    #[command(visible_alias = "c")]
    Check,

    /// Show the current version state
    Version {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// A bare version number migrates to that version
    #[command(external_subcommand)]
    Other(Vec<String>),
}

impl Commands {
    fn into_operation(self) -> Result<Operation, UsageError> {
        Ok(match self {
            Commands::Up => Operation::Up,
            Commands::Down => Operation::Down,
            Commands::Sync => Operation::Sync,
            Commands::Step { n } => Operation::Step(n),
            Commands::Migrate { version } => Operation::Migrate(version),
            Commands::Force { version } => Operation::Force(version),
            Commands::New { name } => Operation::New(name),
            Commands::Check => Operation::Check,
            Commands::Version { .. } => Operation::Version,
            Commands::Other(args) => args.join(" ").parse()?,
        })
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);

    let result = tokio::select! {
        result = run_main(cli) => result,
        _ = wait_for_shutdown_signal() => {
            warn!("Received shutdown signal; a step in progress stays recorded as dirty");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    };

    if let Err(e) = result {
        let kind = FailureKind::of(&e);
        eprintln!("Error: {:#}", e);
        std::process::exit(kind.code());
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_main(cli: Cli) -> Result<()> {
    let env = EnvOverrides::from_env();
    let format = match &cli.command {
        Some(Commands::Version { format }) => *format,
        _ => OutputFormat::Text,
    };

    let operation = match cli.command {
        Some(command) => {
            if env.command.is_some() {
                warn!(
                    "{} is set but a command was given; ignoring {}",
                    ENV_MIGRATION_COMMAND, ENV_MIGRATION_COMMAND
                );
            }
            command.into_operation()?
        }
        None => match &env.command {
            Some(command) => command.parse()?,
            None => Operation::Sync,
        },
    };

    if env.skip_all && operation.uses_store() {
        println!("SKIP_ALL is true, will skip migration");
        return Ok(());
    }

    let file_config = config::load_config(&cli.config_file)?;
    let config = ConfigBuilder::new()
        .with_file(file_config)
        .with_env(env)
        .with_cli_args(ConfigInput::from_args(cli.database_args, cli.migrations_args))
        .resolve()?;

    let options = RunOptions {
        dry_run: cli.dry_run,
        quiet: cli.quiet,
        format,
    };
    commands::dispatch(operation, &config, &options).await?;

    info!("Done");
    Ok(())
}
