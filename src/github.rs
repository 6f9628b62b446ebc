//! Authenticated GitHub client implementing the page-fetcher seam.

use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use crate::{
    graphql::{GraphQLResponse, closed_issues_query, convert_issue_page},
    types::{Page, PageFetcher, Repo},
};

pub fn get_github_token() -> Result<String> {
    // Prefer environment variables over gh CLI to avoid subprocess overhead.
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        return Ok(token);
    }

    if let Ok(token) = std::env::var("GH_TOKEN") {
        return Ok(token);
    }

    let output = Command::new("gh").args(["auth", "token"]).output()?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// GitHub-backed page fetcher over the GraphQL API.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    /// Creates an authenticated client using available credentials.
    pub fn connect() -> Result<Self> {
        let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
        let client = Octocrab::builder()
            .personal_token(token)
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for GitHub {
    async fn fetch_page(&self, repo: &Repo, cursor: Option<&str>) -> Result<Page> {
        let mut query = closed_issues_query();
        query["variables"]["owner"] = serde_json::Value::String(repo.owner().to_string());
        query["variables"]["name"] = serde_json::Value::String(repo.name().to_string());
        query["variables"]["after"] = match cursor {
            Some(cursor) => serde_json::Value::String(cursor.to_string()),
            None => serde_json::Value::Null,
        };

        debug!(repo = %repo, cursor = ?cursor, "requesting closed-issue page");

        let response: GraphQLResponse = self
            .client
            .graphql(&query)
            .await
            .with_context(|| format!("GraphQL query failed for {repo}"))?;

        let repository = response
            .data
            .repository
            .with_context(|| format!("Repository not found: {repo}"))?;

        Ok(convert_issue_page(repository.issues))
    }
}
