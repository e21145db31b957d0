use clap::{ArgAction, Parser, Subcommand};
use commands::{config, favorites, playlists, retry, RunLog};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "tracksync")]
#[command(about = "tracksync - Carry your music library from one streaming service to another")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Path to the configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the source's saved tracks to the target's favorites
    #[command(long_about = "Match every saved track of the source library against the target catalog and add the matches to the target's favorites. Runs as a dry run unless --dry-run false is given or the config disables it.")]
    Favorites {
        /// Match and report without writing to the target (overrides config)
        #[arg(long, value_name = "BOOL")]
        dry_run: Option<bool>,

        /// Do not fetch the target's favorites to skip tracks already there
        #[arg(long, action = ArgAction::SetTrue)]
        no_skip_existing: bool,
    },
    /// Recreate the source's playlists on the target
    #[command(long_about = "Create each source playlist on the target (matched by name) and add the matched tracks. Playlists that already exist on the target are left alone unless --update-existing is given.")]
    Playlists {
        /// Match and report without writing to the target (overrides config)
        #[arg(long, value_name = "BOOL")]
        dry_run: Option<bool>,

        /// Add missing tracks to playlists that already exist on the target
        #[arg(long, action = ArgAction::SetTrue)]
        update_existing: bool,

        /// Only sync playlists with this name (repeatable)
        #[arg(long = "playlist", value_name = "NAME")]
        playlists: Vec<String>,
    },
    /// Re-sync the playlists a previous run failed on
    #[command(long_about = "Scan a previous run's log for playlists that failed and sync only those again, adding missing tracks to playlists the failed run already created. Uses the most recent sync log when --log-file is not given.")]
    Retry {
        /// Log file of the run to retry
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,

        /// Match and report without writing to the target (overrides config)
        #[arg(long, value_name = "BOOL")]
        dry_run: Option<bool>,
    },
    /// List the playlists a previous run failed on
    FailedPlaylists {
        /// Log file to scan
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

impl Commands {
    fn writes_run_log(&self) -> bool {
        matches!(
            self,
            Commands::Favorites { .. } | Commands::Playlists { .. } | Commands::Retry { .. }
        )
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Write a starter configuration file
    #[command(long_about = "Write a starter configuration with default matching and sync settings. Refuses to overwrite an existing file unless --force is given.")]
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Resolve the log to retry before this run opens its own log file
    let retry_log = match &cli.command {
        Commands::Retry { log_file, .. } => Some(retry::locate_log(log_file.clone(), config_path)?),
        _ => None,
    };

    let run_log = if cli.command.writes_run_log() {
        RunLog::for_config(config_path)
    } else {
        None
    };

    logging::init_logging(cli.verbose, cli.quiet, run_log.as_ref().map(|log| log.path.clone()))
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Favorites {
            dry_run,
            no_skip_existing,
        } => favorites::run_favorites(config_path, dry_run, no_skip_existing, run_log.as_ref(), &output).await,
        Commands::Playlists {
            dry_run,
            update_existing,
            playlists,
        } => {
            playlists::run_playlists(config_path, dry_run, update_existing, playlists, run_log.as_ref(), &output).await
        }
        Commands::Retry { dry_run, .. } => match retry_log {
            Some(log_file) => retry::run_retry(config_path, log_file, dry_run, run_log.as_ref(), &output).await,
            None => Err(color_eyre::eyre::eyre!("No sync log to retry")),
        },
        Commands::FailedPlaylists { log_file } => {
            let log_file = retry::locate_log(log_file, config_path)?;
            retry::run_failed_playlists(log_file, &output)
        }
        Commands::Config { cmd } => config::run_config(cmd, config_path, &output),
    }
}
