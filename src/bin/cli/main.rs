//! CLI tool for zipcraft archive operations.

mod commands;
mod exit_codes;
mod file_selector;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Create, list, extend and extract ZIP archives
#[derive(Parser)]
#[command(name = "zipcraft")]
#[command(author, version, about = "Create, list, extend and extract ZIP archives", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an archive from files and directories (alias: c)
    #[command(alias = "c")]
    Create {
        /// Archive file to create
        archive: PathBuf,

        /// Files and directories to add (glob patterns supported)
        #[arg(required = true)]
        paths: Vec<String>,

        /// Compression level
        #[arg(short = 'l', long, value_enum, default_value = "optimal")]
        level: Level,

        /// Replace entries with clashing names
        #[arg(long)]
        force: bool,

        /// Update an existing archive instead of replacing it
        #[arg(long)]
        no_clobber: bool,

        /// Take paths literally, without glob expansion
        #[arg(long)]
        literal: bool,

        /// Entry name patterns to leave out
        #[arg(short = 'x', long)]
        exclude: Vec<String>,
    },

    /// Add files and directories to an archive (alias: a)
    #[command(alias = "a")]
    Add {
        /// Archive file to update (created if missing)
        archive: PathBuf,

        /// Files and directories to add (glob patterns supported)
        #[arg(required = true)]
        paths: Vec<String>,

        /// Compression level
        #[arg(short = 'l', long, value_enum, default_value = "optimal")]
        level: Level,

        /// Replace existing entries
        #[arg(long)]
        force: bool,

        /// Take paths literally, without glob expansion
        #[arg(long)]
        literal: bool,

        /// Entry name patterns to leave out
        #[arg(short = 'x', long)]
        exclude: Vec<String>,
    },

    /// List archive contents (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive files to list
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Print entry names only, one per line
        #[arg(long)]
        names_only: bool,
    },

    /// Extract files from an archive (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Entry patterns to extract (glob patterns supported)
        #[arg(short = 'i', long)]
        include: Vec<String>,

        /// Entry patterns to skip
        #[arg(short = 'e', long)]
        exclude: Vec<String>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Extract named entries from an archive
    ExtractEntry {
        /// Archive file to extract from
        archive: PathBuf,

        /// Entry names, or `-` to read names from stdin
        #[arg(required = true)]
        entries: Vec<String>,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Level {
    Optimal,
    Fastest,
    None,
}

impl From<Level> for zipcraft::CompressionLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Optimal => zipcraft::CompressionLevel::Optimal,
            Level::Fastest => zipcraft::CompressionLevel::Fastest,
            Level::None => zipcraft::CompressionLevel::NoCompression,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Create {
            archive,
            paths,
            level,
            force,
            no_clobber,
            literal,
            exclude,
        } => commands::create(&commands::CreateConfig {
            archive_path: &archive,
            paths: &paths,
            level,
            force,
            no_clobber,
            literal,
            exclude: &exclude,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Add {
            archive,
            paths,
            level,
            force,
            literal,
            exclude,
        } => commands::add(&commands::AddConfig {
            archive_path: &archive,
            paths: &paths,
            level,
            force,
            literal,
            exclude: &exclude,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::List {
            archives,
            names_only,
        } => commands::list(&archives, names_only, cli.format),

        Commands::Extract {
            archive,
            output,
            include,
            exclude,
            force,
        } => commands::extract(&commands::ExtractConfig {
            archive_path: &archive,
            output_dir: &output,
            include: &include,
            exclude: &exclude,
            force,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::ExtractEntry {
            archive,
            entries,
            output,
            force,
        } => commands::extract_entry(
            &archive,
            &entries,
            &output,
            force,
            cli.format,
            cli.quiet,
        ),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
