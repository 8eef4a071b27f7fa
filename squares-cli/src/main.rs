mod commands;

use clap::{Parser, Subcommand};
use squares_core::{GroupEngine, SqliteStore, SquaresError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "squares")]
#[command(about = "Football squares pools: create groups, sell squares, settle prizes")]
#[command(version)]
struct Cli {
    /// Data directory for pool storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Wallet address identifying the caller
    #[arg(short, long, global = true)]
    wallet: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group management commands
    #[command(subcommand)]
    Group(commands::GroupCommands),

    /// Square board commands
    #[command(subcommand)]
    Board(commands::BoardCommands),

    /// Creator-only game administration commands
    #[command(subcommand)]
    Admin(commands::AdminCommands),

    /// Live score commands
    #[command(subcommand)]
    Score(commands::ScoreCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "squares_core={}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("squares")
    });
    tokio::fs::create_dir_all(&data_dir).await?;

    let store = Arc::new(SqliteStore::open(&data_dir.join("groups.db")).await?);
    let ctx = commands::CliContext {
        engine: GroupEngine::new(store),
        wallet: cli.wallet,
    };

    let result = match cli.command {
        Commands::Group(cmd) => commands::handle_group_command(cmd, &ctx).await,
        Commands::Board(cmd) => commands::handle_board_command(cmd, &ctx).await,
        Commands::Admin(cmd) => commands::handle_admin_command(cmd, &ctx).await,
        Commands::Score(cmd) => commands::handle_score_command(cmd).await,
    };

    if let Err(e) = result {
        match e {
            SquaresError::GroupNotFound { id } => {
                eprintln!("Error: No group with id '{}'", id);
                eprintln!("Use 'squares group list' to see public pools");
            }
            SquaresError::InviteCodeNotFound { code } => {
                eprintln!("Error: No group with invite code '{}'", code);
            }
            SquaresError::AlreadyLocked { id } => {
                eprintln!("Error: Group '{}' is already locked", id);
                eprintln!("Use 'squares admin relock' to re-roll its numbers");
            }
            SquaresError::NumbersNotAssigned { quarter } => {
                eprintln!("Error: No numbers drawn for quarter {}", quarter);
                eprintln!("Lock the group before recording results");
            }
            SquaresError::PurchasesClosed { id, status } => {
                eprintln!("Error: Group '{}' is {} and no longer selling squares", id, status);
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
