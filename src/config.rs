//! Command-line and environment configuration.
//!
//! `.env` is loaded before parsing, so every flag with an `env` name can also
//! be set there.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILTER: &str = "legal_doc_analyzer=info";

#[derive(Parser, Debug)]
#[command(
    name = "legal-doc-analyzer",
    version,
    about = "Upload legal documents for AI-powered analysis"
)]
pub struct Cli {
    /// Base URL of the analysis service
    #[arg(long, global = true, env = "LEGAL_ANALYZER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the desktop dashboard (default)
    Gui,
    /// Analyze documents without the dashboard
    Analyze(AnalyzeArgs),
    /// Check that the analysis service is reachable
    Health,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Documents or directories to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Give up waiting for results after this many seconds
    #[arg(long, default_value_t = 600)]
    pub timeout_secs: u64,

    /// Print each analysis result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_url: cli.api_url.trim_end_matches('/').to_string(),
        }
    }
}
