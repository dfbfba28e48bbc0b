//! Page-number pagination primitives shared by the character viewer.
//!
//! Remote catalogues page their listings by a 1-based page number and wrap
//! each page in an envelope carrying totals and optional links to the
//! neighbouring pages. This crate models both halves:
//!
//! - [`PageNumber`]: a validated, 1-based page index with lenient parsing for
//!   query-string input.
//! - [`Page`] and [`PageInfo`]: the envelope returned for one page.
//!
//! # Example
//!
//! ```
//! use pagination::{Page, PageNumber};
//!
//! let json = r#"{
//!     "info": {
//!         "count": 3,
//!         "pages": 2,
//!         "next": "https://example.test/api/item?page=2",
//!         "prev": null
//!     },
//!     "results": ["a", "b"]
//! }"#;
//!
//! let page: Page<String> = serde_json::from_str(json).expect("valid envelope");
//! assert!(page.info.has_next());
//! assert_eq!(page.info.next_page_number(), PageNumber::new(2).ok());
//! assert_eq!(PageNumber::from_query_value(Some("nope")), PageNumber::FIRST);
//! ```

mod envelope;
mod page_number;

pub use envelope::{Page, PageInfo};
pub use page_number::{PageNumber, PageNumberError};
