use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    owner: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    InvalidFormat(String),
    EmptyComponent(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::InvalidFormat(input) => {
                write!(f, "repository must be in 'owner/name' format, got: '{input}'")
            }
            RepoError::EmptyComponent(input) => {
                write!(f, "repository owner and name must be non-empty, got: '{input}'")
            }
        }
    }
}

impl std::error::Error for RepoError {}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        if owner.is_empty() || name.is_empty() {
            return Err(RepoError::EmptyComponent(format!("{owner}/{name}")));
        }
        Ok(Self { owner, name })
    }

    /// Parses an 'owner/name' string. Exactly two components; GitHub names
    /// cannot contain '/'.
    pub fn parse(input: &str) -> Result<Self, RepoError> {
        let parts: Vec<&str> = input.split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Repo::new(*owner, *name),
            [_, _] => Err(RepoError::EmptyComponent(input.to_string())),
            _ => Err(RepoError::InvalidFormat(input.to_string())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A single comment on a closed issue.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub body: String,
    pub author_login: String,
}

/// A closed issue as fetched from a repository.
///
/// Immutable once fetched; `url` identifies the issue across every
/// repository in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub title: String,
    pub url: String,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<CommentRecord>,
}

/// Ordering of records within a page, by `updated_at`.
///
/// Fixed for the lifetime of one pagination run; the cutoff predicate
/// direction follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrder {
    Descending,
    Ascending,
}

/// One page of closed issues from a fetcher.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<IssueRecord>,
    pub next_cursor: Option<String>,
    pub order: PageOrder,
}

/// Source of paged closed-issue data for a single repository.
///
/// Implementations must return records ordered by `updated_at` in a single
/// fixed direction for the lifetime of one pagination run, and must advance
/// the cursor on every non-final page. Retry and timeout policy, if any,
/// lives behind this trait.
#[async_trait]
pub trait PageFetcher {
    async fn fetch_page(&self, repo: &Repo, cursor: Option<&str>) -> Result<Page>;
}

/// A fetcher returned the same cursor for two consecutive non-empty pages.
///
/// Raised by the paginator instead of looping forever on a misbehaving
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalledPagination {
    pub repo: String,
    pub cursor: String,
}

impl fmt::Display for StalledPagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pagination stalled for {}: cursor '{}' did not advance",
            self.repo, self.cursor
        )
    }
}

impl std::error::Error for StalledPagination {}

/// Which result set to open in a browser after reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    /// Issues approved by every reviewer.
    All,
    /// Issues approved by no reviewer.
    Neither,
    /// Issues approved by one named reviewer.
    Reviewer(String),
}

/// Everything one run needs, resolved up front.
///
/// No component reads the process environment after this is built.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub repos: Vec<Repo>,
    pub reviewers: Vec<String>,
    pub marker: String,
    pub cutoff: DateTime<Utc>,
    pub open: Option<OpenTarget>,
    pub quiet: bool,
}
