use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Locus - geographic hierarchy browser and coverage-area resolver
#[derive(Parser, Debug)]
#[command(name = "locus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output NDJSON events instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./locus.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Serve data from a JSON snapshot instead of the REST backend
    #[arg(long, global = true, conflicts_with = "api_url")]
    pub snapshot: Option<PathBuf>,

    /// REST backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Plain ASCII icons
    #[arg(long, global = true)]
    pub ascii: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// How much of the tree the `tree` command opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExpandScope {
    /// Top level only
    None,
    /// Roots, using the configured expand mode
    Roots,
    /// Everything
    All,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the location hierarchy with selection state
    Tree {
        /// How far to open the tree (default: auto-expand roots if configured)
        #[arg(long, value_enum)]
        expand: Option<ExpandScope>,

        /// Ids to select before rendering (whole subtrees with --subtree)
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,

        /// Select each id together with its descendants
        #[arg(long)]
        subtree: bool,

        /// Include inactive units
        #[arg(long)]
        inactive: bool,
    },

    /// Find the tightest coverage area containing a selection
    Suggest {
        /// Ids of the selected units
        #[arg(long, value_delimiter = ',', required = true)]
        select: Vec<String>,

        /// List every containing area, tightest first
        #[arg(long)]
        all: bool,
    },

    /// Check whether a record can be deleted
    CheckDelete {
        #[command(subcommand)]
        target: DeleteTarget,
    },

    /// Search loaded locations by name or code
    Search { term: String },
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    /// A location node
    Location { id: String },
    /// A coverage area
    CoverageArea { id: String },
}
