//! CLI command definitions and handlers

mod doctor;
mod evaluate;
mod init;
mod scan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kerneval - evaluation harness for LLM-generated Linux kernel drivers
#[derive(Parser, Debug)]
#[command(name = "kerneval")]
#[command(
    version,
    about = "Score LLM-generated kernel driver code for compilation, security, quality, and functionality",
    long_about = "Kerneval sends prompts to a code-generation service, collects candidate \
kernel driver sources per model variant, and scores each candidate: does it build as an \
out-of-tree module, is it free of known vulnerability patterns, is it well documented, and \
does it implement the expected file operations and error handling.",
    after_help = "\
Examples:
  kerneval evaluate --prompts prompts.txt              Evaluate every prompt in a file
  kerneval evaluate --prompts prompts.txt -f json -o report.json
  kerneval scan driver.c                               Score an existing source file
  kerneval scan driver.c --no-build                    Skip the module build
  kerneval doctor                                      Check toolchain and API keys
  kerneval init                                        Write an example kerneval.toml

API keys are read from the environment (GEMINI_API_KEY, OPENAI_API_KEY, ...)."
)]
pub struct Cli {
    /// Path to a config file (default: ./kerneval.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate code for each prompt and score every model variant
    Evaluate {
        /// File with one prompt per line (# lines and blanks ignored)
        #[arg(long, short = 'p')]
        prompts: PathBuf,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Score an existing C source without calling the generation service
    Scan {
        /// Driver source file to score
        file: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Skip the out-of-tree module build
        #[arg(long)]
        no_build: bool,
    },

    /// Check the environment: make, clang-tidy, kernel headers, API keys
    Doctor,

    /// Write an example kerneval.toml to the current directory
    Init,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = crate::config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Evaluate {
            prompts,
            format,
            output,
        } => evaluate::run(&config, &prompts, &format, output.as_deref()),
        Commands::Scan {
            file,
            format,
            no_build,
        } => scan::run(&config, &file, &format, no_build),
        Commands::Doctor => doctor::run(&config),
        Commands::Init => init::run(),
    }
}
