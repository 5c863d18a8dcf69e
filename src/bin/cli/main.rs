//! CLI tool for assetpack buffers.

mod commands;
mod exit_codes;
mod output;

use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use env_logger::Env;
use std::path::PathBuf;

use assetpack::NodeType;
use exit_codes::ExitCode;

/// Inspect and edit packed asset buffers
#[derive(Parser)]
#[command(name = "assetpack")]
#[command(author, version, about = "Inspect and edit packed asset buffers", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the node tree (alias: l)
    #[command(alias = "l")]
    List {
        /// Pack file
        pack: PathBuf,

        /// Show offsets and header sizes
        #[arg(long)]
        technical: bool,
    },

    /// Show pack statistics (alias: i)
    #[command(alias = "i")]
    Info {
        /// Pack file
        pack: PathBuf,
    },

    /// Create an empty container
    Mkdir {
        /// Pack file (created if missing)
        pack: PathBuf,

        /// Path of the new container
        path: String,

        /// Container kind
        #[arg(short = 't', long = "type", default_value = "parent")]
        node_type: NodeType,
    },

    /// Add a file as a leaf node (alias: a)
    #[command(alias = "a")]
    Add {
        /// Pack file (created if missing)
        pack: PathBuf,

        /// Container receiving the node
        container: String,

        /// File whose bytes become the payload
        file: PathBuf,

        /// Node name (defaults to the file name)
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Node kind (guessed from the file extension if omitted)
        #[arg(short = 't', long = "type")]
        node_type: Option<NodeType>,

        /// Dependency path to record (repeatable)
        #[arg(short = 'd', long = "dep")]
        dependencies: Vec<String>,
    },

    /// Remove a node and its subtree
    Rm {
        /// Pack file
        pack: PathBuf,

        /// Node to remove
        path: String,
    },

    /// Move a node into another container
    Mv {
        /// Pack file
        pack: PathBuf,

        /// Node to move
        source: String,

        /// Destination container
        dest: String,
    },

    /// Rename a node in place
    Rename {
        /// Pack file
        pack: PathBuf,

        /// Node to rename
        path: String,

        /// New name
        new_name: String,
    },

    /// Change a node's kind
    Retype {
        /// Pack file
        pack: PathBuf,

        /// Node to retype
        path: String,

        /// New kind
        node_type: NodeType,
    },

    /// Write a leaf payload to stdout or a file
    Cat {
        /// Pack file
        pack: PathBuf,

        /// Leaf to read
        path: String,

        /// Output file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Build a pack from a directory tree
    Pack {
        /// Source directory
        dir: PathBuf,

        /// Pack file to write
        output: PathBuf,
    },

    /// Validate a pack and audit its dependencies (alias: t)
    #[command(alias = "t")]
    Check {
        /// Pack file
        pack: PathBuf,
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

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = cli.format;
    let exit_code = match cli.command {
        Commands::List { pack, technical } => commands::list(&pack, technical, format),

        Commands::Info { pack } => commands::info(&pack, format),

        Commands::Mkdir {
            pack,
            path,
            node_type,
        } => commands::mkdir(&pack, &path, node_type, format),

        Commands::Add {
            pack,
            container,
            file,
            name,
            node_type,
            dependencies,
        } => commands::add(&commands::AddConfig {
            pack_path: &pack,
            container: &container,
            file: &file,
            name: name.as_deref(),
            node_type,
            dependencies: &dependencies,
            format,
        }),

        Commands::Rm { pack, path } => commands::remove(&pack, &path, format),

        Commands::Mv { pack, source, dest } => commands::move_node(&pack, &source, &dest, format),

        Commands::Rename {
            pack,
            path,
            new_name,
        } => commands::rename(&pack, &path, &new_name, format),

        Commands::Retype {
            pack,
            path,
            node_type,
        } => commands::retype(&pack, &path, node_type, format),

        Commands::Cat { pack, path, output } => commands::cat(&pack, &path, output.as_deref()),

        Commands::Pack { dir, output } => commands::pack_dir(&dir, &output, format),

        Commands::Check { pack } => commands::check(&pack, format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
