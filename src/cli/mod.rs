//! CLI module for Policy Analyzer
//!
//! Provides command-line interface parsing and handling for the policy-analyzer binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::toml_config::DEFAULT_CONFIG_FILE;

/// Policy Analyzer - what does this privacy policy do with my data?
#[derive(Parser, Debug)]
#[command(
    name = "policy-analyzer",
    version,
    about = "Privacy policy analyzer",
    long_about = "Reads a privacy policy PDF and asks a language model which companies receive\n\
                  user data, what data is collected and shared, and for which purpose.\n\n\
                  Run without arguments to start the web form, or use 'analyze' for a one-shot answer.",
    after_help = "EXAMPLES:\n    \
                  policy-analyzer init                                # Write policy-analyzer.toml\n    \
                  policy-analyzer                                     # Start the server\n    \
                  policy-analyzer analyze --url https://x.com/p.pdf   # Answer on stdout\n    \
                  policy-analyzer chunks policy.pdf --word-length 100 # Inspect chunking"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Analyze one policy and print the answer
    ///
    /// Give exactly one of --url and --file.
    Analyze {
        /// URL of the policy PDF
        #[arg(long)]
        url: Option<String>,

        /// Local policy PDF
        #[arg(long)]
        file: Option<PathBuf>,

        /// OpenAI API key
        #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
        api_key: String,
    },

    /// Print the page-tagged chunks of a PDF
    Chunks {
        /// PDF to chunk
        path: PathBuf,

        /// Words per chunk (overrides the config file)
        #[arg(short, long)]
        word_length: Option<usize>,
    },

    /// Write a default configuration file
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,

        /// Print the effective configuration as TOML
        #[arg(long)]
        toml: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
