//! End-to-end run orchestration and the renderer-facing report structure.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::{
    classify::{AggregateSets, ReviewerApprovals, aggregate, classify},
    paginate::fetch_all,
    types::{OpenTarget, PageFetcher, RunSpec},
};

/// One issue link in a reviewer's listing.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueLink {
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

/// One reviewer's section of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewerReport {
    pub reviewer: String,
    pub count: usize,
    pub issues: Vec<IssueLink>,
}

/// Everything a renderer needs: per-reviewer listings plus the aggregate
/// sets, all in deterministic order (reviewer input order, record fetch
/// order).
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub per_reviewer: Vec<ReviewerReport>,
    pub approved_by_none: Vec<String>,
    pub approved_by_all: Vec<String>,
}

impl Report {
    /// The urls behind an open target, or None when the target names a
    /// reviewer that is not in the report.
    pub fn links_for(&self, target: &OpenTarget) -> Option<Vec<&str>> {
        match target {
            OpenTarget::All => Some(self.approved_by_all.iter().map(String::as_str).collect()),
            OpenTarget::Neither => {
                Some(self.approved_by_none.iter().map(String::as_str).collect())
            }
            OpenTarget::Reviewer(name) => self
                .per_reviewer
                .iter()
                .find(|section| section.reviewer == *name)
                .map(|section| section.issues.iter().map(|i| i.url.as_str()).collect()),
        }
    }
}

fn build_report(reviewer_sets: Vec<ReviewerApprovals>, aggregates: AggregateSets) -> Report {
    let per_reviewer = reviewer_sets
        .into_iter()
        .map(|set| ReviewerReport {
            reviewer: set.reviewer,
            count: set.records.len(),
            issues: set
                .records
                .into_iter()
                .map(|record| IssueLink {
                    url: record.url,
                    updated_at: record.updated_at,
                })
                .collect(),
        })
        .collect();

    Report {
        per_reviewer,
        approved_by_none: aggregates
            .approved_by_none
            .into_iter()
            .map(|record| record.url)
            .collect(),
        approved_by_all: aggregates
            .approved_by_all
            .into_iter()
            .map(|record| record.url)
            .collect(),
    }
}

/// Runs a full report: fetch every repository up to the cutoff, classify by
/// reviewer, and derive the aggregate sets.
pub async fn run_report<F>(spec: &RunSpec, fetcher: &F) -> Result<Report>
where
    F: PageFetcher + Sync + ?Sized,
{
    let records = fetch_all(fetcher, &spec.repos, spec.cutoff).await?;
    tracing::info!(
        records = records.len(),
        repos = spec.repos.len(),
        "fetched closed issues"
    );

    let reviewer_sets = classify(&records, &spec.reviewers, &spec.marker);
    let aggregates = aggregate(&records, &reviewer_sets);

    Ok(build_report(reviewer_sets, aggregates))
}
