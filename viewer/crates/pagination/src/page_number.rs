//! Validated 1-based page numbers.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`PageNumber`] strictly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageNumberError {
    /// Page numbers start at 1.
    #[error("page number must be at least 1")]
    Zero,
    /// The input was not a base-10 unsigned integer.
    #[error("page number is not a positive integer: {input}")]
    NotANumber {
        /// Raw input that failed to parse.
        input: String,
    },
}

/// A 1-based page index.
///
/// ## Invariants
/// - The wrapped value is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Build a page number, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`PageNumberError::Zero`] when `value` is zero.
    pub const fn new(value: u32) -> Result<Self, PageNumberError> {
        match NonZeroU32::new(value) {
            Some(inner) => Ok(Self(inner)),
            None => Err(PageNumberError::Zero),
        }
    }

    /// Derive a page number from an optional query-string value.
    ///
    /// Absent, blank, non-numeric and zero values all fall back to
    /// [`PageNumber::FIRST`]; the caller never sees an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::PageNumber;
    ///
    /// assert_eq!(PageNumber::from_query_value(Some("3")).get(), 3);
    /// assert_eq!(PageNumber::from_query_value(Some("-2")), PageNumber::FIRST);
    /// assert_eq!(PageNumber::from_query_value(None), PageNumber::FIRST);
    /// ```
    #[must_use]
    pub fn from_query_value(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse().ok())
            .unwrap_or(Self::FIRST)
    }

    /// Return the raw 1-based value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The page after this one, if it is representable.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// The page before this one, or `None` on the first page.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        NonZeroU32::new(self.get() - 1).map(Self)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageNumber {
    type Err = PageNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<u32>()
            .map_err(|_| PageNumberError::NotANumber {
                input: s.to_owned(),
            })?;
        Self::new(value)
    }
}

impl TryFrom<u32> for PageNumber {
    type Error = PageNumberError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageNumber> for u32 {
    fn from(page: PageNumber) -> Self {
        page.get()
    }
}
