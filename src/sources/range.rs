use crate::source::{Cursor, Page, WorkSource};
use anyhow::Result;
use std::fmt::Debug;

/// Source over the half-open index range `[start, limit)`
///
/// Indices are claimed under the cursor lock; `fetcher` runs afterwards,
/// outside the lock, so slow fetches of different workers overlap.
pub struct RangeSource<F> {
    cursor: Cursor,
    start: u64,
    limit: u64,
    fetcher: F,
}

impl<F, R> RangeSource<F>
where
    F: Fn(u64) -> Result<R>,
{
    pub fn new(start: u64, limit: u64, fetcher: F) -> Self {
        Self {
            cursor: Cursor::new(start),
            start,
            limit,
            fetcher,
        }
    }
}

impl<F> RangeSource<F> {
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Indices not yet claimed
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.cursor.load())
    }
}

impl<F, R> WorkSource for RangeSource<F>
where
    F: Fn(u64) -> Result<R> + Send + Sync,
    R: Debug + Send,
{
    type Response = R;

    fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    fn has_next(&self) -> bool {
        self.cursor.load() < self.limit
    }

    fn fetch(&self) -> Result<Option<Page<R>>> {
        let Some(index) = self.claim() else {
            return Ok(None);
        };
        let response = (self.fetcher)(index)?;
        Ok(Some(Page::new(index, response)))
    }

    fn page_to_log_string(&self, page: &Page<R>) -> String {
        match &page.response {
            Some(response) => format!("{} {:?}", page.name, response),
            None => page.name.clone(),
        }
    }
}

/// Dry fetcher turning claimed indices into search URLs
///
/// No request is sent; the planned URL is the page response. Real fetching is
/// left to callers, who can wrap [`QueryPlanner::url`] in their own client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlanner {
    url_prefix: String,
}

impl QueryPlanner {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
        }
    }

    pub fn url(&self, index: u64) -> String {
        format!("{}{}", self.url_prefix, index)
    }

    /// Fetch function for [`RangeSource`]
    pub fn plan(&self, index: u64) -> Result<String> {
        Ok(self.url(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_range_bounds() {
        let source = RangeSource::new(3, 5, |i| Ok(i));
        assert_eq!(source.remaining(), 2);
        assert!(source.has_next());

        let first = source.fetch().unwrap().unwrap();
        let second = source.fetch().unwrap().unwrap();
        assert_eq!((first.index, second.index), (3, 4));
        assert!(!source.has_next());
        assert!(source.fetch().unwrap().is_none());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_empty_range() {
        let source = RangeSource::new(7, 7, |i| Ok(i));
        assert!(!source.has_next());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_fetch_error_still_consumes_index() {
        let source = RangeSource::new(0, 3, |i| {
            if i == 1 {
                Err(anyhow!("request {i} failed"))
            } else {
                Ok(i)
            }
        });
        assert!(source.fetch().is_ok());
        assert!(source.fetch().is_err());
        assert_eq!(source.fetch().unwrap().unwrap().index, 2);
    }

    #[test]
    fn test_log_string_includes_response() {
        let planner = QueryPlanner::new("https://example.test/?q=");
        let source = RangeSource::new(0, 1, |i| planner.plan(i));
        let page = source.fetch().unwrap().unwrap();
        assert_eq!(
            source.page_to_log_string(&page),
            "0 \"https://example.test/?q=0\""
        );
        assert_eq!(source.page_to_log_string(&Page::empty(9)), "9");
    }

    #[test]
    fn test_planner_urls() {
        let planner = QueryPlanner::new("https://www.google.ca/search?q=");
        assert_eq!(planner.url(42), "https://www.google.ca/search?q=42");
        assert_eq!(planner.plan(0).unwrap(), "https://www.google.ca/search?q=0");
    }
}
