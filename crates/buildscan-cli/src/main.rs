//! buildscan - find CI builds that fail because of failing tests
//!
//! ## Commands
//!
//! - `builds`: classify every build id listed in a file
//! - `projects`: resolve every slug listed in a file and classify its recent builds
//!
//! Qualifying build ids are printed to stdout, one per line. Logs go to stderr.

use anyhow::{Context, Result};
use buildscan_core::config::{DEFAULT_LOOKBACK_HOURS, DEFAULT_TARGET_LANGUAGE};
use buildscan_core::{init_tracing, Build, ScanConfig, ScanSession, ScanSummary};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use travis_client::{TravisClient, TravisConfig, DEFAULT_API_URL};

#[derive(Parser, Debug)]
#[command(name = "buildscan")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find CI builds that fail because of failing tests", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Print the scan summary as JSON instead of the build ids
    #[arg(long, global = true)]
    summary: bool,

    /// Language a build must be configured for
    #[arg(long, global = true, env = "BUILDSCAN_LANGUAGE", default_value = DEFAULT_TARGET_LANGUAGE)]
    language: String,

    /// Only builds started within this many hours are scanned by `projects`
    #[arg(long, global = true, env = "BUILDSCAN_LOOKBACK_HOURS", default_value_t = DEFAULT_LOOKBACK_HOURS)]
    lookback_hours: u32,

    /// Travis API base URL
    #[arg(long, global = true, env = "TRAVIS_API_URL", default_value = DEFAULT_API_URL)]
    travis_url: String,

    /// Travis API token
    #[arg(long, global = true, env = "TRAVIS_TOKEN", hide_env_values = true)]
    travis_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify the builds listed in a file, one build id per line
    Builds {
        /// Input file
        input: PathBuf,
    },

    /// Scan recent builds of the projects listed in a file, one slug per line
    Projects {
        /// Input file
        input: PathBuf,
    },
}

impl Cli {
    fn scan_config(&self) -> Result<ScanConfig> {
        let config = ScanConfig::new(&self.language, self.lookback_hours);
        config.validate().context("invalid scan configuration")?;
        Ok(config)
    }

    fn travis_config(&self) -> TravisConfig {
        let config = TravisConfig::new(&self.travis_url);
        match self.travis_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => config.with_token(token),
            None => config,
        }
    }
}

/// Text written to stdout once the scan is done.
fn render_output(builds: &[Build], summary: &ScanSummary, as_summary: bool) -> Result<String> {
    if as_summary {
        let mut json = serde_json::to_string_pretty(summary).context("serialize scan summary")?;
        json.push('\n');
        return Ok(json);
    }
    Ok(builds.iter().map(|b| format!("{}\n", b.id)).collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let config = cli.scan_config()?;
    let client = TravisClient::new(cli.travis_config()).context("failed to create Travis client")?;
    let mut session = ScanSession::new(config, Arc::new(client));

    let builds = match &cli.command {
        Commands::Builds { input } => session
            .scan_build_ids(input)
            .await
            .with_context(|| format!("scan of build ids from {:?} failed", input))?,
        Commands::Projects { input } => session
            .scan_slugs(input)
            .await
            .with_context(|| format!("scan of projects from {:?} failed", input))?,
    };

    let summary = session.summary();
    info!(
        qualifying = builds.len(),
        repositories = summary.qualifying_slugs.len(),
        "scan complete"
    );
    print!("{}", render_output(&builds, &summary, cli.summary)?);
    Ok(())
}
