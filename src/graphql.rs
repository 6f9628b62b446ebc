//! GraphQL query text and wire types for the closed-issue fetch.

use serde::Deserialize;

use crate::types::{CommentRecord, IssueRecord, Page, PageOrder};

/// Issues per page. GitHub caps `first` at 100; 50 keeps response sizes
/// reasonable with comment bodies attached.
pub const PAGE_SIZE: u32 = 50;

/// Comments fetched per issue. Approval comments on review threads land
/// early; 100 covers every observed issue.
pub const COMMENTS_PER_ISSUE: u32 = 100;

/// Builds the closed-issues query for one repository page.
///
/// Pages are ordered UPDATED_AT descending; the paginator's cutoff predicate
/// relies on this direction and it must not change per call.
pub fn closed_issues_query() -> serde_json::Value {
    serde_json::json!({
        "query": format!(r#"
            query($owner: String!, $name: String!, $after: String) {{
                repository(owner: $owner, name: $name) {{
                    issues(states: CLOSED, first: {PAGE_SIZE}, after: $after,
                           orderBy: {{field: UPDATED_AT, direction: DESC}}) {{
                        nodes {{
                            title
                            url
                            updatedAt
                            comments(first: {COMMENTS_PER_ISSUE}) {{
                                nodes {{
                                    body
                                    author {{
                                        login
                                    }}
                                }}
                            }}
                        }}
                        pageInfo {{
                            hasNextPage
                            endCursor
                        }}
                    }}
                }}
            }}
        "#),
        "variables": {}
    })
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: RepositoryData,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryNode {
    pub issues: IssueConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueConnection {
    pub nodes: Vec<GraphQLIssue>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLIssue {
    pub title: String,
    pub url: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub comments: GraphQLCommentConnection,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLCommentConnection {
    pub nodes: Vec<GraphQLComment>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLComment {
    pub body: String,
    // Null for comments whose author account was deleted.
    pub author: Option<GraphQLAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLAuthor {
    pub login: String,
}

fn convert_comment(comment: GraphQLComment) -> CommentRecord {
    CommentRecord {
        body: comment.body,
        author_login: comment
            .author
            .map(|author| author.login)
            .unwrap_or_else(|| "ghost".to_string()),
    }
}

fn convert_issue(issue: GraphQLIssue) -> IssueRecord {
    IssueRecord {
        title: issue.title,
        url: issue.url,
        updated_at: issue.updated_at,
        comments: issue.comments.nodes.into_iter().map(convert_comment).collect(),
    }
}

/// Converts one GraphQL issue connection into a paginator [`Page`].
///
/// `endCursor` is only forwarded when `hasNextPage` is set; the paginator
/// treats an absent cursor as end of data.
pub fn convert_issue_page(connection: IssueConnection) -> Page {
    let next_cursor = if connection.page_info.has_next_page {
        connection.page_info.end_cursor
    } else {
        None
    };

    Page {
        records: connection.nodes.into_iter().map(convert_issue).collect(),
        next_cursor,
        order: PageOrder::Descending,
    }
}
