//! Viewer service binding navigation state to cached catalogue reads.
//!
//! Each screen is backed by one cache key: the list screen by its page
//! number, the detail screen by the character id. The service resolves a
//! [`NavigationState`] into a [`Screen`] whose query state the inbound
//! adapters render as rows, fields, an error, or a loading placeholder.

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageInfo, PageNumber};
use tracing::debug;

use crate::domain::character::{Character, CharacterId, CharacterPage};
use crate::domain::navigation::{NavigationIntent, NavigationState, Navigator};
use crate::domain::ports::{CharacterSource, CharacterSourceError};
use crate::domain::query_cache::{QueryCache, QueryState, RetentionPolicy};

/// Query state of a list page.
pub type PageState = QueryState<Arc<CharacterPage>, CharacterSourceError>;

/// Query state of a single character.
pub type CharacterState = QueryState<Arc<Character>, CharacterSourceError>;

/// The list screen for one page.
#[derive(Debug, Clone)]
pub struct ListScreen {
    /// Page shown.
    pub page: PageNumber,
    /// Fetch state for the page.
    pub state: PageState,
}

/// The detail screen for one character.
#[derive(Debug, Clone)]
pub struct DetailScreen {
    /// Character shown.
    pub character_id: CharacterId,
    /// Fetch state for the character.
    pub state: CharacterState,
}

/// A resolved screen ready for rendering.
#[derive(Debug, Clone)]
pub enum Screen {
    /// Paged character table.
    List(ListScreen),
    /// Character details.
    Detail(DetailScreen),
}

impl Screen {
    /// Navigation state this screen was resolved for.
    pub const fn navigation(&self) -> NavigationState {
        match self {
            Self::List(screen) => NavigationState::List { page: screen.page },
            Self::Detail(screen) => NavigationState::Detail {
                character_id: screen.character_id,
            },
        }
    }

    /// The failure shown by this screen, if any.
    pub const fn failure(&self) -> Option<&CharacterSourceError> {
        match self {
            Self::List(screen) => screen.state.failure(),
            Self::Detail(screen) => screen.state.failure(),
        }
    }
}

/// Read-only character viewer over a [`CharacterSource`].
pub struct CharacterViewer {
    source: Arc<dyn CharacterSource>,
    pages: QueryCache<PageNumber, Arc<CharacterPage>, CharacterSourceError>,
    characters: QueryCache<CharacterId, Arc<Character>, CharacterSourceError>,
}

impl CharacterViewer {
    /// Build a viewer whose caches follow `policy`.
    pub fn new(
        source: Arc<dyn CharacterSource>,
        policy: RetentionPolicy,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            source,
            pages: QueryCache::new(policy, Arc::clone(&clock)),
            characters: QueryCache::new(policy, clock),
        }
    }

    /// Fetch list page `page` through the cache.
    ///
    /// # Errors
    ///
    /// Returns the source error for the page, shared by concurrent callers.
    pub async fn character_page(
        &self,
        page: PageNumber,
    ) -> Result<Arc<CharacterPage>, CharacterSourceError> {
        let source = Arc::clone(&self.source);
        self.pages
            .fetch(page, move || async move {
                source.list_characters(page).await.map(Arc::new)
            })
            .await
    }

    /// Fetch one character through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterSourceError::NotFound`] for unknown ids and
    /// [`CharacterSourceError::Remote`] for any other failure.
    pub async fn character(
        &self,
        character_id: CharacterId,
    ) -> Result<Arc<Character>, CharacterSourceError> {
        let source = Arc::clone(&self.source);
        self.characters
            .fetch(character_id, move || async move {
                source.get_character(character_id).await.map(Arc::new)
            })
            .await
    }

    /// Resolve `state` into a settled screen, fetching as needed.
    pub async fn screen(&self, state: NavigationState) -> Screen {
        match state {
            NavigationState::List { page } => Screen::List(ListScreen {
                page,
                state: self.character_page(page).await.into(),
            }),
            NavigationState::Detail { character_id } => Screen::Detail(DetailScreen {
                character_id,
                state: self.character(character_id).await.into(),
            }),
        }
    }

    /// Resolve `state` from whatever is already known, without fetching.
    pub fn peek_screen(&self, state: NavigationState) -> Screen {
        match state {
            NavigationState::List { page } => Screen::List(ListScreen {
                page,
                state: self.pages.peek(&page),
            }),
            NavigationState::Detail { character_id } => Screen::Detail(DetailScreen {
                character_id,
                state: self.characters.peek(&character_id),
            }),
        }
    }

    /// Apply `intent` to the `navigator` session and resolve the resulting
    /// screen.
    ///
    /// The viewer is shared; each visitor brings their own navigator.
    /// Returns `None` when a newer intent was dispatched on the same session
    /// while this one was loading; the superseded screen must not be shown.
    pub async fn navigate(
        &self,
        navigator: &Navigator,
        intent: NavigationIntent,
    ) -> Option<Screen> {
        let ticket = navigator.dispatch(intent, |state| self.page_info(state));
        let screen = self.screen(ticket.state()).await;
        if navigator.is_current(&ticket) {
            Some(screen)
        } else {
            debug!(state = ?ticket.state(), "discarding superseded screen");
            None
        }
    }

    /// Forget cached data for `state` so the next resolve fetches again.
    pub fn invalidate(&self, state: NavigationState) -> bool {
        match state {
            NavigationState::List { page } => self.pages.invalidate(&page),
            NavigationState::Detail { character_id } => {
                self.characters.invalidate(&character_id)
            }
        }
    }

    /// Page info of the list page `state` shows, if that page is loaded.
    pub fn page_info(&self, state: NavigationState) -> Option<PageInfo> {
        match state {
            NavigationState::List { page } => {
                self.pages.peek(&page).ready().map(|page| page.info.clone())
            }
            NavigationState::Detail { .. } => None,
        }
    }
}
