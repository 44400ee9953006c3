use cellhts_layout::OutputFormat;
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Experiment settings that override the configuration file
#[derive(Args, Debug, Default)]
pub struct ExperimentOverrides {
    /// Normalization method (repeatable; replaces the configured list)
    #[arg(short = 'm', long = "method", value_name = "METHOD")]
    pub methods: Vec<String>,

    /// Selected channel (repeatable; replaces the configured list)
    #[arg(short = 'p', long = "param", value_name = "CHANNEL")]
    pub params: Vec<String>,

    /// Experiment name used by the {e} placeholder
    #[arg(long, value_name = "NAME")]
    pub experiment: Option<String>,

    /// Number of replicates per result row
    #[arg(long, value_name = "N")]
    pub replicate_count: Option<usize>,
}

/// Arguments for printing the output folder of every method
#[derive(Args, Debug)]
pub struct FoldersArgs {
    /// Folder pattern (default: settings.folder_pattern)
    #[arg(long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    #[command(flatten)]
    pub experiment: ExperimentOverrides,
}

/// Arguments for printing a table schema
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Replicate table instead of the summary table
    #[arg(short = 'r', long)]
    pub replicates: bool,

    /// Output format (default: settings.default_format)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<FormatCli>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub experiment: ExperimentOverrides,
}

/// Arguments for expanding result rows into tables
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Results as JSON: {"methods": {"<method>": {"rows": [...]}}}, or a
    /// top-level {"rows": [...]} shared by every method
    #[arg(long, value_name = "FILE")]
    pub results: PathBuf,

    /// Output format (default: settings.default_format)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<FormatCli>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Write summary and replicate tables into the method's output folder
    #[arg(short = 'w', long)]
    pub write: bool,

    #[command(flatten)]
    pub experiment: ExperimentOverrides,
}

/// Table output formats (CLI enum)
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatCli {
    Json,
    Tsv,
}

impl From<FormatCli> for OutputFormat {
    fn from(cli: FormatCli) -> Self {
        match cli {
            FormatCli::Json => OutputFormat::Json,
            FormatCli::Tsv => OutputFormat::Tsv,
        }
    }
}

/// Config subcommand actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// List available options
    List {
        /// What to list: statistics, methods, parameters
        #[arg(value_name = "TYPE")]
        category: Option<ConfigCategory>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details for a specific statistic
    Show {
        /// Statistic name
        statistic: String,
    },
}

/// Categories for config list command
#[derive(Clone, ValueEnum, Debug)]
pub enum ConfigCategory {
    Statistics,
    Methods,
    Parameters,
}
