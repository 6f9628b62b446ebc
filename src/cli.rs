//! Command-line parsing into a [`RunSpec`].
//!
//! All configuration is resolved here, before any fetch begins; the rest of
//! the crate never reads the process environment or arguments.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Parser;

use crate::types::{OpenTarget, Repo, RunSpec};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// Fallback cutoff when --since is not given.
const DEFAULT_CUTOFF_DAYS: i64 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "passtally",
    about = "Report which closed issues carry reviewer approval comments, per reviewer and in aggregate"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// GitHub repository in 'owner/repo' format (can specify multiple)
    #[arg(short = 'r', long = "repo", value_name = "OWNER/REPO", required = true)]
    pub repo: Vec<String>,

    /// Reviewer login to look for approvals from (can specify multiple)
    #[arg(long = "reviewer", value_name = "LOGIN", required = true)]
    pub reviewer: Vec<String>,

    /// Approval marker text matched case-sensitively in comment bodies
    #[arg(long, value_name = "TEXT", default_value = "PASSED")]
    pub marker: String,

    /// Only consider issues updated after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,

    /// Open result links in a browser: 'all', 'neither', or a reviewer login
    #[arg(long, value_name = "KEY")]
    pub open: Option<String>,

    /// Print counts only
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl CliArgs {
    fn validate(&self) -> Result<()> {
        // clap enforces non-empty lists; reject blank entries it lets through.
        if self.repo.iter().any(|r| r.trim().is_empty()) {
            anyhow::bail!("--repo values must be non-empty");
        }
        if self.reviewer.iter().any(|r| r.trim().is_empty()) {
            anyhow::bail!("--reviewer values must be non-empty");
        }
        if self.marker.is_empty() {
            anyhow::bail!("--marker must be non-empty");
        }
        Ok(())
    }
}

/// Accepts RFC 3339 timestamps or bare dates (midnight UTC).
fn parse_cutoff(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{input}' (expected RFC 3339 or YYYY-MM-DD)"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("Invalid midnight for date")?;
    Ok(midnight.and_utc())
}

fn parse_open_target(key: &str, reviewers: &[String]) -> Result<OpenTarget> {
    match key {
        "all" => Ok(OpenTarget::All),
        "neither" => Ok(OpenTarget::Neither),
        _ => {
            if reviewers.iter().any(|r| r == key) {
                Ok(OpenTarget::Reviewer(key.to_string()))
            } else {
                anyhow::bail!(
                    "--open key '{}' is not 'all', 'neither', or a configured reviewer",
                    key
                )
            }
        }
    }
}

fn build_run_spec(cli: CliArgs) -> Result<RunSpec> {
    cli.validate()?;

    let repos = cli
        .repo
        .iter()
        .map(|r| {
            Repo::parse(r.trim())
                .map_err(|e| anyhow::anyhow!("Invalid repository '{}': {}", r, e))
        })
        .collect::<Result<Vec<_>>>()?;

    let cutoff = match &cli.since {
        Some(input) => parse_cutoff(input)?,
        None => Utc::now() - Duration::days(DEFAULT_CUTOFF_DAYS),
    };

    let open = cli
        .open
        .as_deref()
        .map(|key| parse_open_target(key, &cli.reviewer))
        .transpose()?;

    Ok(RunSpec {
        repos,
        reviewers: cli.reviewer,
        marker: cli.marker,
        cutoff,
        open,
        quiet: cli.quiet,
    })
}

/// Parses command-line arguments into a run specification.
///
/// Every configuration error (malformed repository, bad date, unknown open
/// key) surfaces here, before any network call is made.
pub fn parse_args<I, T>(args: I) -> Result<RunSpec>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    build_run_spec(cli)
}
