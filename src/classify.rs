//! Approval classification and cross-reviewer set algebra.
//!
//! Pure functions over the combined record set; nothing here performs I/O
//! or keeps state between runs.

use std::collections::HashSet;

use crate::types::IssueRecord;

/// The issues one reviewer signed off on, in original fetch order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewerApprovals {
    pub reviewer: String,
    pub records: Vec<IssueRecord>,
}

impl ReviewerApprovals {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    fn contains(&self, url: &str) -> bool {
        self.records.iter().any(|record| record.url == url)
    }
}

/// Issues approved by no reviewer and by every reviewer.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSets {
    pub approved_by_none: Vec<IssueRecord>,
    pub approved_by_all: Vec<IssueRecord>,
}

/// Tests whether a comment is an approval from the given reviewer.
///
/// The marker is a literal, case-sensitive substring of the comment body.
fn is_approval(body: &str, author_login: &str, reviewer: &str, marker: &str) -> bool {
    author_login == reviewer && body.contains(marker)
}

/// Computes, per reviewer, the subset of records carrying that reviewer's
/// approval marker.
///
/// Reviewers are evaluated independently and in input order; a record may
/// qualify for several reviewers at once, and multiple qualifying comments
/// from the same reviewer still count the record once. Record order within
/// each subset equals the input record order.
pub fn classify(
    records: &[IssueRecord],
    reviewers: &[String],
    marker: &str,
) -> Vec<ReviewerApprovals> {
    reviewers
        .iter()
        .map(|reviewer| ReviewerApprovals {
            reviewer: reviewer.clone(),
            records: records
                .iter()
                .filter(|record| {
                    record
                        .comments
                        .iter()
                        .any(|c| is_approval(&c.body, &c.author_login, reviewer, marker))
                })
                .cloned()
                .collect(),
        })
        .collect()
}

/// Derives the cross-reviewer sets from the full record set and each
/// reviewer's approvals.
///
/// `approved_by_none` is the full set minus the union of all reviewer sets.
/// `approved_by_all` is the intersection across every reviewer; with zero
/// reviewers it is the empty set rather than the vacuously-true full set.
/// Both preserve original record order. Record identity is the issue url.
pub fn aggregate(records: &[IssueRecord], reviewer_sets: &[ReviewerApprovals]) -> AggregateSets {
    let approved_by_any: HashSet<&str> = reviewer_sets
        .iter()
        .flat_map(|set| set.records.iter().map(|record| record.url.as_str()))
        .collect();

    let approved_by_none = records
        .iter()
        .filter(|record| !approved_by_any.contains(record.url.as_str()))
        .cloned()
        .collect();

    let approved_by_all = if reviewer_sets.is_empty() {
        Vec::new()
    } else {
        records
            .iter()
            .filter(|record| reviewer_sets.iter().all(|set| set.contains(&record.url)))
            .cloned()
            .collect()
    };

    AggregateSets {
        approved_by_none,
        approved_by_all,
    }
}
