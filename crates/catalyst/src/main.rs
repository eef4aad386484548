mod commands;
mod desired;
mod engine;
mod progress;
mod session;

use catalyst_provider::Context;
use clap::{Parser, Subcommand};
use commands::import::ImportKind;
use session::Session;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalyst")]
#[command(about = "Declarative regions and projects for Catalyst", long_about = None)]
struct Cli {
    /// Manifest file (default: discovered from the working directory)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// State file (default: .catalyst/state.json next to the manifest)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Overall timeout for remote operations, in seconds
    #[arg(long, global = true, default_value_t = 1200)]
    timeout: u64,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the manifest without contacting the API
    Validate,
    /// Show the changes apply would make
    Plan,
    /// Create, update and delete resources to match the manifest
    Apply {
        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every resource recorded in state
    Destroy {
        /// Destroy without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Bring an existing region or project under management
    Import {
        #[arg(value_enum)]
        kind: ImportKind,
        /// Region name, or project `<name>` / `<organization_id>/<name>`
        id: String,
    },
    /// Update state from the API
    Refresh,
    /// Print recorded state
    Show,
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = Context::background();
    let interrupt = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, cancelling...");
            interrupt.cancel();
        }
    });
    let ctx = root.with_timeout(Duration::from_secs(cli.timeout));

    let command = match cli.command {
        Commands::Version => {
            println!("catalyst {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        command => command,
    };
    let session = Session::load(cli.manifest.as_deref(), cli.state.as_deref())?;

    match command {
        Commands::Validate => commands::validate::handle(&session)?,
        Commands::Plan => commands::plan::handle(&session, &ctx).await?,
        Commands::Apply { yes } => commands::apply::handle(&session, &ctx, yes).await?,
        Commands::Destroy { yes } => commands::destroy::handle(&session, &ctx, yes).await?,
        Commands::Import { kind, id } => {
            commands::import::handle(&session, &ctx, kind, &id).await?
        }
        Commands::Refresh => commands::refresh::handle(&session, &ctx).await?,
        Commands::Show => commands::show::handle(&session).await?,
        Commands::Version => {}
    }

    Ok(())
}
