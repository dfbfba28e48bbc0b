//! Navigation state for the two viewer screens.
//!
//! ```text
//! /                    List { page: 1 }
//! /?page=3             List { page: 3 }
//! /character/{id}      Detail { character_id: id }
//! ```
//!
//! State is derived purely from the URL. Transitions are pure functions on
//! [`NavigationState`]; [`Navigator`] adds "last intent wins" bookkeeping for
//! callers that load data asynchronously between intents.

use std::sync::{Mutex, MutexGuard, PoisonError};

use pagination::{PageInfo, PageNumber};
use thiserror::Error;

use crate::domain::character::CharacterId;

const CHARACTER_PATH_PREFIX: &str = "/character/";

/// Errors raised while mapping a URL onto a screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The path names no screen.
    #[error("no screen at {path}")]
    UnknownRoute {
        /// Requested path.
        path: String,
    },
    /// The detail path segment is not a valid character id.
    #[error("invalid character id {raw:?}")]
    InvalidCharacterId {
        /// Raw path segment.
        raw: String,
    },
}

/// Which screen is shown, and for what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationState {
    /// Paged character table.
    List {
        /// Current page, never below 1.
        page: PageNumber,
    },
    /// One character's details.
    Detail {
        /// Selected character.
        character_id: CharacterId,
    },
}

/// User actions that move between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationIntent {
    /// A table row was selected.
    SelectCharacter(CharacterId),
    /// The detail screen's back action.
    GoBack,
    /// Jump to an explicit page.
    SetPage(PageNumber),
    /// The "Next" pagination control.
    NextPage,
    /// The "Previous" pagination control.
    PreviousPage,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::List {
            page: PageNumber::FIRST,
        }
    }
}

impl NavigationState {
    /// Map a request path and optional query string onto a screen.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::UnknownRoute`] for paths outside the two
    /// screens and [`NavigationError::InvalidCharacterId`] when the detail
    /// segment is not a positive integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use character_viewer::domain::navigation::NavigationState;
    ///
    /// let state = NavigationState::from_uri("/", Some("page=abc")).expect("list route");
    /// assert_eq!(state.to_uri(), "/?page=1");
    /// ```
    pub fn from_uri(path: &str, query: Option<&str>) -> Result<Self, NavigationError> {
        if path.is_empty() || path == "/" {
            let raw_page = query.and_then(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == "page")
                    .map(|(_, value)| value.into_owned())
            });
            return Ok(Self::List {
                page: PageNumber::from_query_value(raw_page.as_deref()),
            });
        }

        let Some(raw) = path.strip_prefix(CHARACTER_PATH_PREFIX) else {
            return Err(NavigationError::UnknownRoute {
                path: path.to_owned(),
            });
        };
        let character_id = raw
            .parse::<CharacterId>()
            .map_err(|_| NavigationError::InvalidCharacterId {
                raw: raw.to_owned(),
            })?;
        Ok(Self::Detail { character_id })
    }

    /// Canonical URL for this state.
    pub fn to_uri(&self) -> String {
        match self {
            Self::List { page } => format!("/?page={page}"),
            Self::Detail { character_id } => format!("{CHARACTER_PATH_PREFIX}{character_id}"),
        }
    }

    /// Open the detail screen for `character_id`.
    pub const fn select_character(self, character_id: CharacterId) -> Self {
        Self::Detail { character_id }
    }

    /// Leave the current screen for the first list page.
    ///
    /// The list page the user came from is not remembered.
    pub const fn go_back(self) -> Self {
        Self::List {
            page: PageNumber::FIRST,
        }
    }

    /// Show list page `page`.
    pub const fn set_page(self, page: PageNumber) -> Self {
        Self::List { page }
    }

    /// Advance to the next list page when `info` advertises one.
    pub fn next_page(self, info: &PageInfo) -> Self {
        match self {
            Self::List { page } if info.has_next() => {
                page.next().map_or(self, |next| Self::List { page: next })
            }
            _ => self,
        }
    }

    /// Step back to the previous list page when `info` advertises one.
    pub fn previous_page(self, info: &PageInfo) -> Self {
        match self {
            Self::List { page } if info.has_previous() => {
                page.previous().map_or(self, |previous| Self::List { page: previous })
            }
            _ => self,
        }
    }

    /// Apply `intent`. `info` describes the list page currently shown, if any;
    /// without it the pagination controls are disabled.
    pub fn apply(self, intent: NavigationIntent, info: Option<&PageInfo>) -> Self {
        match intent {
            NavigationIntent::SelectCharacter(character_id) => self.select_character(character_id),
            NavigationIntent::GoBack => self.go_back(),
            NavigationIntent::SetPage(page) => self.set_page(page),
            NavigationIntent::NextPage => info.map_or(self, |info| self.next_page(info)),
            NavigationIntent::PreviousPage => info.map_or(self, |info| self.previous_page(info)),
        }
    }
}

/// Proof that a navigation intent was dispatched, used to detect staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
    state: NavigationState,
}

impl NavigationTicket {
    /// State the intent led to.
    pub const fn state(&self) -> NavigationState {
        self.state
    }
}

/// One visitor's navigation session: current state plus a generation counter.
///
/// Every dispatched intent bumps the generation. Work started for an older
/// ticket is stale once a newer intent has been dispatched, and its results
/// must not be shown. Sessions are independent; share a navigator only
/// between views of the same visitor.
#[derive(Debug, Default)]
pub struct Navigator {
    current: Mutex<(NavigationState, u64)>,
}

impl Navigator {
    /// Current state.
    pub fn current(&self) -> NavigationState {
        self.lock().0
    }

    /// Apply `intent` and return a ticket for the resulting state.
    ///
    /// `page_info` is asked for the page info of the state the intent is
    /// applied to. It runs under the session lock, so the info always
    /// belongs to the state it gates.
    pub fn dispatch<F>(&self, intent: NavigationIntent, page_info: F) -> NavigationTicket
    where
        F: FnOnce(NavigationState) -> Option<PageInfo>,
    {
        let mut current = self.lock();
        let info = page_info(current.0);
        let state = current.0.apply(intent, info.as_ref());
        current.0 = state;
        current.1 += 1;
        NavigationTicket {
            generation: current.1,
            state,
        }
    }

    /// Whether no intent has been dispatched since `ticket`.
    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        self.lock().1 == ticket.generation
    }

    fn lock(&self) -> MutexGuard<'_, (NavigationState, u64)> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use url::Url;

    fn page(value: u32) -> PageNumber {
        PageNumber::new(value).expect("non-zero page")
    }

    fn character(value: u32) -> CharacterId {
        CharacterId::new(value).expect("non-zero id")
    }

    fn info(next: Option<u32>, prev: Option<u32>) -> PageInfo {
        let link = |n: u32| {
            Url::parse(&format!("https://catalogue.test/api/character?page={n}"))
                .expect("valid link")
        };
        PageInfo {
            count: 826,
            pages: 42,
            next: next.map(link),
            prev: prev.map(link),
        }
    }

    #[rstest]
    #[case::root("/", None, 1)]
    #[case::empty_path("", None, 1)]
    #[case::explicit("/", Some("page=3"), 3)]
    #[case::non_numeric("/", Some("page=abc"), 1)]
    #[case::zero("/", Some("page=0"), 1)]
    #[case::other_params("/", Some("sort=name&page=9"), 9)]
    fn list_routes_default_to_first_page(
        #[case] path: &str,
        #[case] query: Option<&str>,
        #[case] expected: u32,
    ) {
        assert_eq!(
            NavigationState::from_uri(path, query),
            Ok(NavigationState::List { page: page(expected) })
        );
    }

    #[test]
    fn detail_route_carries_character_id() {
        assert_eq!(
            NavigationState::from_uri("/character/2", None),
            Ok(NavigationState::Detail {
                character_id: character(2)
            })
        );
    }

    #[rstest]
    #[case("/character/abc")]
    #[case("/character/0")]
    #[case("/character/")]
    #[case("/character/1/extra")]
    fn invalid_character_ids_are_rejected(#[case] path: &str) {
        assert!(matches!(
            NavigationState::from_uri(path, None),
            Err(NavigationError::InvalidCharacterId { .. })
        ));
    }

    #[test]
    fn unknown_paths_are_rejected() {
        assert!(matches!(
            NavigationState::from_uri("/episodes", None),
            Err(NavigationError::UnknownRoute { .. })
        ));
    }

    #[rstest]
    #[case(NavigationState::List { page: page(4) })]
    #[case(NavigationState::Detail { character_id: character(17) })]
    fn uris_round_trip(#[case] state: NavigationState) {
        let uri = state.to_uri();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri.as_str(), None),
        };
        assert_eq!(NavigationState::from_uri(path, query), Ok(state));
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(826)]
    fn go_back_always_lands_on_first_page(#[case] id: u32) {
        let state = NavigationState::List { page: page(5) }.select_character(character(id));
        assert_eq!(state.go_back(), NavigationState::List { page: page(1) });
    }

    #[test]
    fn next_is_disabled_on_last_page() {
        let last = NavigationState::List { page: page(42) };
        assert_eq!(last.next_page(&info(None, Some(41))), last);
        assert_eq!(
            last.previous_page(&info(None, Some(41))),
            NavigationState::List { page: page(41) }
        );
    }

    #[test]
    fn previous_is_disabled_on_first_page() {
        let first = NavigationState::default();
        assert_eq!(first.previous_page(&info(Some(2), None)), first);
        assert_eq!(
            first.next_page(&info(Some(2), None)),
            NavigationState::List { page: page(2) }
        );
    }

    #[test]
    fn paging_intents_need_page_info() {
        let state = NavigationState::List { page: page(3) };
        assert_eq!(state.apply(NavigationIntent::NextPage, None), state);
        assert_eq!(state.apply(NavigationIntent::PreviousPage, None), state);
        assert_eq!(
            state.apply(NavigationIntent::SetPage(page(9)), None),
            NavigationState::List { page: page(9) }
        );
    }

    #[test]
    fn paging_intents_are_ignored_on_detail_screen() {
        let detail = NavigationState::Detail {
            character_id: character(2),
        };
        assert_eq!(detail.apply(NavigationIntent::NextPage, Some(&info(Some(2), None))), detail);
    }

    #[test]
    fn newer_dispatch_makes_older_ticket_stale() {
        let navigator = Navigator::default();
        let first = navigator.dispatch(NavigationIntent::SetPage(page(2)), |_| None);
        assert!(navigator.is_current(&first));

        let second =
            navigator.dispatch(NavigationIntent::SelectCharacter(character(5)), |_| None);
        assert!(!navigator.is_current(&first));
        assert!(navigator.is_current(&second));
        assert_eq!(
            navigator.current(),
            NavigationState::Detail {
                character_id: character(5)
            }
        );
    }

    #[test]
    fn page_info_is_read_for_the_session_state() {
        let navigator = Navigator::default();
        navigator.dispatch(NavigationIntent::SetPage(page(42)), |_| None);

        let mut seen = None;
        let ticket = navigator.dispatch(NavigationIntent::NextPage, |state| {
            seen = Some(state);
            Some(info(None, Some(41)))
        });

        assert_eq!(seen, Some(NavigationState::List { page: page(42) }));
        assert_eq!(ticket.state(), NavigationState::List { page: page(42) });
    }
}
