mod args;
mod config;
mod global;
mod handlers;

use clap::{Parser, Subcommand};
use global::GlobalArgs;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellhts-layout")]
#[command(version)]
#[command(about = "Compile cellHTS2 output folders, table schemas and result rows", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the output folder of every normalization method
    Folders(args::FoldersArgs),

    /// Print the column schema of the summary or replicate table
    Schema(args::SchemaArgs),

    /// Expand result rows into summary and replicate tables
    Expand(args::ExpandArgs),

    /// Inspect the layout configuration
    Config {
        #[command(subcommand)]
        action: args::ConfigAction,
    },
}

/// Install the stderr log subscriber.
///
/// `-v` and `-q` take precedence over `RUST_LOG`; without either the default
/// level is `warn`.
fn init_tracing(global: &GlobalArgs) {
    let filter = if global.verbose {
        EnvFilter::new("debug")
    } else if global.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!global.no_color && std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    let registry = config::load_registry(&cli.global)?;

    match cli.command {
        Commands::Folders(args) => handlers::folders::handle(args, &cli.global, &registry),
        Commands::Schema(args) => handlers::schema::handle(args, &cli.global, &registry),
        Commands::Expand(args) => handlers::expand::handle(args, &cli.global, &registry),
        Commands::Config { action } => handlers::config::handle(action, &cli.global, &registry),
    }
}
