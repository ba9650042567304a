// Developer tooling: fill an in-memory graph with synthetic data and audit it

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rapport::{DatabaseConfig, Rapport, RetryPolicy};
use tracing_subscriber::EnvFilter;

mod seed;

#[derive(Parser)]
#[command(name = "rapport")]
#[command(about = "Rapport - transactional friendship graph tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate profiles and invitations, then audit the graph
    Seed(SeedArgs),

    /// Generate the same data and print only the audit report
    Audit(SeedArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// Number of profiles to generate
    #[arg(short, long, default_value = "100")]
    pub profiles: usize,

    /// How many of the generated profiles act as heroes
    #[arg(long, default_value = "1")]
    pub heroes: usize,

    /// Invitations per hero with the hero as invited
    #[arg(long = "invited-f", default_value = "0")]
    pub invited_f: usize,

    /// Invitations per hero with the hero as inviting
    #[arg(long = "inviting-f", default_value = "0")]
    pub inviting_f: usize,

    /// Retries per invitation before giving up
    #[arg(long, default_value = "15")]
    pub retries: u32,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open(args: &SeedArgs) -> anyhow::Result<Rapport> {
    let config = match &args.config {
        Some(path) => DatabaseConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DatabaseConfig::default(),
    };
    Rapport::with_config(config).context("opening database")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Seed(args) => {
            let rapport = open(&args)?;
            let policy = RetryPolicy::with_retries(args.retries);
            let report = seed::run(&rapport, &args, policy)?;
            println!("{report}");
            let audit = rapport.audit()?;
            println!("{audit}");
            anyhow::ensure!(audit.is_consistent(), "graph audit failed");
        }
        Commands::Audit(args) => {
            let rapport = open(&args)?;
            seed::run(&rapport, &args, RetryPolicy::with_retries(args.retries))?;
            let audit = rapport.audit()?;
            println!("{audit}");
            anyhow::ensure!(audit.is_consistent(), "graph audit failed");
        }
    }
    Ok(())
}
