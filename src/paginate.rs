//! Cursor pagination with a time cutoff, per repository and fanned out
//! across repositories.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::types::{IssueRecord, PageFetcher, PageOrder, Repo, StalledPagination};

/// Tests whether a record falls inside the cutoff window for the given page
/// ordering.
///
/// Descending pages treat the cutoff as a lower bound: records updated
/// strictly after it are in range, and the first older record ends the run.
/// Ascending pages take the complementary predicate, with the cutoff as an
/// upper bound. Either way, once the predicate fails for one record it fails
/// for every later record in the page sequence.
fn within_cutoff(order: PageOrder, updated_at: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    match order {
        PageOrder::Descending => updated_at > cutoff,
        PageOrder::Ascending => updated_at < cutoff,
    }
}

/// Fetches pages for one repository until the cutoff boundary is crossed or
/// the data runs out.
///
/// Each page's records are scanned from the start and the contiguous
/// in-range prefix is kept. A page that is only partially in range ends the
/// run: later pages cannot contain in-range records. Errors from the fetcher
/// propagate immediately; nothing is retried here. A fetcher that fails to
/// advance its cursor across consecutive non-empty pages aborts the run with
/// [`StalledPagination`].
pub async fn fetch_until_cutoff<F>(
    fetcher: &F,
    repo: &Repo,
    cutoff: DateTime<Utc>,
) -> Result<Vec<IssueRecord>>
where
    F: PageFetcher + Sync + ?Sized,
{
    let mut cursor: Option<String> = None;
    let mut records = Vec::new();

    loop {
        let page = fetcher.fetch_page(repo, cursor.as_deref()).await?;

        if page.records.is_empty() {
            debug!(repo = %repo, total = records.len(), "empty page, pagination complete");
            return Ok(records);
        }

        let page_len = page.records.len();
        let order = page.order;
        let in_range: Vec<IssueRecord> = page
            .records
            .into_iter()
            .take_while(|record| within_cutoff(order, record.updated_at, cutoff))
            .collect();

        let crossed_cutoff = in_range.len() < page_len;
        debug!(
            repo = %repo,
            page_len,
            in_range = in_range.len(),
            crossed_cutoff,
            "fetched page"
        );
        records.extend(in_range);

        if crossed_cutoff {
            return Ok(records);
        }

        match page.next_cursor {
            None => return Ok(records),
            Some(next) => {
                if cursor.as_deref() == Some(next.as_str()) {
                    return Err(StalledPagination {
                        repo: repo.to_string(),
                        cursor: next,
                    }
                    .into());
                }
                cursor = Some(next);
            }
        }
    }
}

/// Fetches every repository concurrently and flattens the results.
///
/// Output order is the concatenation of per-repository results in the order
/// the repositories were supplied, regardless of which fetch completes
/// first. If any repository fails the whole fetch fails; in-flight siblings
/// are abandoned since their results would be discarded.
pub async fn fetch_all<F>(
    fetcher: &F,
    repos: &[Repo],
    cutoff: DateTime<Utc>,
) -> Result<Vec<IssueRecord>>
where
    F: PageFetcher + Sync + ?Sized,
{
    let fetches = repos
        .iter()
        .map(|repo| fetch_until_cutoff(fetcher, repo, cutoff));
    let per_repo = futures::future::try_join_all(fetches).await?;

    let combined: Vec<IssueRecord> = per_repo.into_iter().flatten().collect();

    // Issue urls are expected to be globally unique across repositories; a
    // duplicate means a fetcher returned overlapping pages.
    let mut seen = HashSet::new();
    for record in &combined {
        if !seen.insert(record.url.as_str()) {
            warn!(url = %record.url, "duplicate issue across fetched pages");
        }
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::Page;

    fn issue(url: &str, day: u32) -> IssueRecord {
        IssueRecord {
            title: format!("issue {url}"),
            url: url.to_string(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            comments: vec![],
        }
    }

    fn cutoff_at(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    /// Serves a fixed page per cursor position and counts fetch calls.
    struct ScriptedFetcher {
        pages: Vec<Page>,
        calls: Mutex<usize>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Page>) -> Self {
            Self {
                pages,
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&self, _repo: &Repo, cursor: Option<&str>) -> Result<Page> {
            *self.calls.lock().unwrap() += 1;
            let index = match cursor {
                None => 0,
                Some(c) => c.parse::<usize>().unwrap(),
            };
            Ok(self.pages[index].clone())
        }
    }

    fn page(records: Vec<IssueRecord>, next_cursor: Option<&str>) -> Page {
        Page {
            records,
            next_cursor: next_cursor.map(String::from),
            order: PageOrder::Descending,
        }
    }

    fn test_repo() -> Repo {
        Repo::new("owner", "repo").unwrap()
    }

    #[tokio::test]
    async fn partial_page_stops_without_second_fetch() {
        // Three records after the cutoff, then one before it, in one page of
        // four. A second page exists but must never be requested.
        let fetcher = ScriptedFetcher::new(vec![
            page(
                vec![issue("a", 20), issue("b", 18), issue("c", 16), issue("d", 10)],
                Some("1"),
            ),
            page(vec![issue("e", 8)], None),
        ]);

        let records = fetch_until_cutoff(&fetcher, &test_repo(), cutoff_at(15))
            .await
            .unwrap();

        assert_eq!(
            records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_first_page_yields_empty_result() {
        let fetcher = ScriptedFetcher::new(vec![page(vec![], None)]);

        let records = fetch_until_cutoff(&fetcher, &test_repo(), cutoff_at(1))
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn follows_cursor_across_fully_in_range_pages() {
        let fetcher = ScriptedFetcher::new(vec![
            page(vec![issue("a", 28), issue("b", 26)], Some("1")),
            page(vec![issue("c", 24), issue("d", 22)], Some("2")),
            page(vec![issue("e", 20), issue("f", 2)], None),
        ]);

        let records = fetch_until_cutoff(&fetcher, &test_repo(), cutoff_at(10))
            .await
            .unwrap();

        assert_eq!(
            records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e"]
        );
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn missing_next_cursor_terminates_after_full_page() {
        let fetcher = ScriptedFetcher::new(vec![page(
            vec![issue("a", 20), issue("b", 18)],
            None,
        )]);

        let records = fetch_until_cutoff(&fetcher, &test_repo(), cutoff_at(10))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn unchanged_cursor_is_a_stall_error() {
        // Cursor "1" leads to a page whose next cursor is again "1".
        let fetcher = ScriptedFetcher::new(vec![
            page(vec![issue("a", 20)], Some("1")),
            page(vec![issue("b", 18)], Some("1")),
        ]);

        let err = fetch_until_cutoff(&fetcher, &test_repo(), cutoff_at(10))
            .await
            .unwrap_err();

        let stalled = err.downcast_ref::<StalledPagination>().unwrap();
        assert_eq!(stalled.cursor, "1");
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn records_exactly_at_cutoff_are_excluded() {
        let boundary = cutoff_at(15);
        let mut at_boundary = issue("a", 15);
        at_boundary.updated_at = boundary;
        let fetcher = ScriptedFetcher::new(vec![page(vec![at_boundary], None)]);

        let records = fetch_until_cutoff(&fetcher, &test_repo(), boundary)
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn ascending_pages_use_the_complementary_predicate() {
        let fetcher = ScriptedFetcher::new(vec![Page {
            records: vec![issue("a", 2), issue("b", 8), issue("c", 20)],
            next_cursor: None,
            order: PageOrder::Ascending,
        }]);

        let records = fetch_until_cutoff(&fetcher, &test_repo(), cutoff_at(15))
            .await
            .unwrap();

        assert_eq!(
            records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    /// Maps each repository name to a canned result or an error.
    struct PerRepoFetcher;

    #[async_trait]
    impl PageFetcher for PerRepoFetcher {
        async fn fetch_page(&self, repo: &Repo, _cursor: Option<&str>) -> Result<Page> {
            match repo.name() {
                "one" => Ok(page(vec![issue("one-a", 20), issue("one-b", 18)], None)),
                "two" => Ok(page(vec![issue("two-a", 22)], None)),
                _ => Err(anyhow!("boom")),
            }
        }
    }

    #[tokio::test]
    async fn fetch_all_preserves_repo_input_order() {
        let repos = vec![
            Repo::new("o", "two").unwrap(),
            Repo::new("o", "one").unwrap(),
        ];

        let records = fetch_all(&PerRepoFetcher, &repos, cutoff_at(10))
            .await
            .unwrap();

        assert_eq!(
            records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            vec!["two-a", "one-a", "one-b"]
        );
    }

    #[tokio::test]
    async fn fetch_all_fails_when_any_repo_fails() {
        let repos = vec![
            Repo::new("o", "one").unwrap(),
            Repo::new("o", "broken").unwrap(),
        ];

        let result = fetch_all(&PerRepoFetcher, &repos, cutoff_at(10)).await;

        assert!(result.is_err());
    }

    /// Both repositories claim the same issue url.
    struct OverlappingFetcher;

    #[async_trait]
    impl PageFetcher for OverlappingFetcher {
        async fn fetch_page(&self, repo: &Repo, _cursor: Option<&str>) -> Result<Page> {
            match repo.name() {
                "one" => Ok(page(vec![issue("shared", 20), issue("one-b", 18)], None)),
                _ => Ok(page(vec![issue("shared", 20)], None)),
            }
        }
    }

    #[tokio::test]
    async fn duplicate_urls_across_repos_pass_through_unmerged() {
        // Overlapping pages are a fetcher contract violation; the combined
        // set is warned about but not deduplicated.
        let repos = vec![
            Repo::new("o", "one").unwrap(),
            Repo::new("o", "two").unwrap(),
        ];

        let records = fetch_all(&OverlappingFetcher, &repos, cutoff_at(10))
            .await
            .unwrap();

        assert_eq!(
            records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            vec!["shared", "one-b", "shared"]
        );
    }

    #[tokio::test]
    async fn fetch_all_with_no_repos_is_empty() {
        let records = fetch_all(&PerRepoFetcher, &[], cutoff_at(10)).await.unwrap();
        assert!(records.is_empty());
    }
}
