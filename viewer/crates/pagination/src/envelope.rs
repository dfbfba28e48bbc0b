//! Pagination envelope returned for one page of a listing.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::PageNumber;

/// Totals and neighbour links for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Total number of items across all pages.
    pub count: u64,
    /// Total number of pages.
    pub pages: u32,
    /// Link to the next page, absent on the last page.
    pub next: Option<Url>,
    /// Link to the previous page, absent on the first page.
    pub prev: Option<Url>,
}

impl PageInfo {
    /// Whether a following page is advertised.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Whether a preceding page is advertised.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.prev.is_some()
    }

    /// Page number carried by the `next` link's `page` query parameter.
    #[must_use]
    pub fn next_page_number(&self) -> Option<PageNumber> {
        self.next.as_ref().and_then(page_parameter)
    }
}

fn page_parameter(link: &Url) -> Option<PageNumber> {
    link.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

/// One page of results plus its [`PageInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Pagination metadata.
    pub info: PageInfo,
    /// Items on this page, in remote order.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether this page carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Convert every item, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `convert`.
    pub fn try_map<U, E, F>(self, convert: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let results = self
            .results
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            info: self.info,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn info(next: Option<&str>, prev: Option<&str>) -> PageInfo {
        PageInfo {
            count: 826,
            pages: 42,
            next: next.map(|link| Url::parse(link).expect("valid link")),
            prev: prev.map(|link| Url::parse(link).expect("valid link")),
        }
    }

    #[test]
    fn decodes_null_links_as_absent() {
        let json = r#"{"count": 826, "pages": 42, "next": null, "prev": "https://x.test/api/character?page=41"}"#;
        let decoded: PageInfo = serde_json::from_str(json).expect("valid info");
        assert!(!decoded.has_next());
        assert!(decoded.has_previous());
    }

    #[rstest]
    #[case::plain("https://x.test/api/character?page=3", Some(3))]
    #[case::extra_params("https://x.test/api/character?name=rick&page=5", Some(5))]
    #[case::missing("https://x.test/api/character", None)]
    #[case::zero("https://x.test/api/character?page=0", None)]
    fn reads_page_number_from_next_link(#[case] link: &str, #[case] expected: Option<u32>) {
        let info = info(Some(link), None);
        assert_eq!(info.next_page_number().map(PageNumber::get), expected);
    }

    #[test]
    fn try_map_keeps_info_and_order() {
        let page = Page {
            info: info(None, None),
            results: vec!["1", "2", "3"],
        };
        let mapped: Page<u8> = page
            .try_map(|raw| raw.parse::<u8>())
            .expect("all items parse");
        assert_eq!(mapped.results, vec![1, 2, 3]);
        assert_eq!(mapped.info.count, 826);
        assert_eq!(mapped.len(), 3);
    }

    #[test]
    fn try_map_stops_on_first_failure() {
        let page = Page {
            info: info(None, None),
            results: vec!["1", "x"],
        };
        assert!(page.try_map(|raw| raw.parse::<u8>()).is_err());
    }
}
