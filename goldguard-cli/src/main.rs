use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "goldguard", about = "Snapshot-based regression testing for model-backed functions")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold config, snapshot directory, and default rubric
    Init(commands::init::InitArgs),
    /// List registered metrics, providers, stores, and reporters
    List(commands::list::ListArgs),
    /// Print the merged configuration
    Config(commands::config::ConfigArgs),
    /// Inspect and delete stored snapshots
    Snapshots(commands::snapshot::SnapshotArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "goldguard=info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Snapshots(args) => commands::snapshot::run(args),
    }
}
