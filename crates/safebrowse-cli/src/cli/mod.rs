//! CLI for the SafeBrowse URL classifier.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use safebrowse_core::config;
use std::path::PathBuf;

use commands::{
    run_batch, run_classify, run_completions, run_features, run_inspect, run_manpage,
};

/// Top-level CLI for the SafeBrowse classifier.
#[derive(Debug, Parser)]
#[command(name = "safebrowse")]
#[command(about = "SafeBrowse: lexical phishing-risk scoring for URLs", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/safebrowse/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify one or more URLs.
    Classify {
        /// URLs to classify.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Model artifact (overrides the configured path).
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
        /// Print one JSON object per URL.
        #[arg(long)]
        json: bool,
    },

    /// Classify every URL in a file (one per line; blank lines and `#` comments ignored).
    Batch {
        /// Path to the URL list.
        path: PathBuf,
        /// Model artifact (overrides the configured path).
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
        /// Print one JSON object per URL.
        #[arg(long)]
        json: bool,
    },

    /// Print the lexical features extracted from a URL.
    Features {
        url: String,
        /// Print the features as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the shape and fingerprint of a model artifact.
    Inspect {
        /// Model artifact (overrides the configured path).
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Render the man page to stdout.
    Manpage,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Classify { urls, model, json } => {
                run_classify(&cfg, model.as_deref(), &urls, json).await?
            }
            CliCommand::Batch { path, model, json } => {
                run_batch(&cfg, model.as_deref(), &path, json).await?
            }
            CliCommand::Features { url, json } => run_features(&url, json)?,
            CliCommand::Inspect { model } => run_inspect(&cfg, model.as_deref()).await?,
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Manpage => run_manpage()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
