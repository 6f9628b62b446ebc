//! Passtally: reviewer sign-off reporting for closed GitHub issues.
//!
//! Fetches closed issues from one or more repositories through cursor-based
//! GraphQL pagination with a time cutoff, classifies each issue by which
//! reviewers left an approval comment, and derives per-reviewer and
//! aggregate (approved-by-all, approved-by-none) result sets for reporting.

pub mod classify;
pub mod cli;
pub mod github;
pub mod graphql;
pub mod paginate;
pub mod report;
pub mod types;

pub use classify::{AggregateSets, ReviewerApprovals, aggregate, classify};
pub use cli::parse_args;
pub use github::GitHub;
pub use paginate::{fetch_all, fetch_until_cutoff};
pub use report::{IssueLink, Report, ReviewerReport, run_report};
pub use types::{
    CommentRecord, IssueRecord, OpenTarget, Page, PageFetcher, PageOrder, Repo, RepoError,
    RunSpec, StalledPagination,
};
