//! Driven port for reading characters from the remote catalogue.
//!
//! The domain owns the read contract so the viewer can run against the HTTP
//! adapter in production and the in-memory fixture in tests and demos.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pagination::{Page, PageInfo, PageNumber};
use url::Url;

use super::define_port_error;
use crate::domain::character::{
    Character, CharacterId, CharacterPage, CharacterStatus, CharacterValidationError, PAGE_SIZE,
    ResourceLink,
};

define_port_error! {
    /// Errors surfaced while reading the character catalogue.
    pub enum CharacterSourceError {
        /// Transport failure, non-success status, or an undecodable payload.
        Remote,
        /// The catalogue has no character with the requested id.
        NotFound,
    }
}

impl CharacterSourceError {
    /// Whether the failure means the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Port for the two catalogue read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterSource: Send + Sync {
    /// Fetch one page of the character listing.
    ///
    /// # Examples
    ///
    /// ```
    /// use character_viewer::domain::ports::{CharacterSource, FixtureCharacterSource};
    /// use pagination::PageNumber;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let source = FixtureCharacterSource::reference().expect("fixture builds");
    /// let page = source
    ///     .list_characters(PageNumber::FIRST)
    ///     .await
    ///     .expect("first page");
    /// assert_eq!(page.info.count, 826);
    /// # });
    /// ```
    async fn list_characters(&self, page: PageNumber)
    -> Result<CharacterPage, CharacterSourceError>;

    /// Fetch a single character by id.
    async fn get_character(&self, id: CharacterId) -> Result<Character, CharacterSourceError>;
}

/// Errors raised while assembling a fixture dataset.
#[derive(Debug, thiserror::Error)]
pub enum FixtureSourceError {
    /// A fixture URL failed to parse.
    #[error("invalid fixture url: {0}")]
    Url(#[from] url::ParseError),
    /// A fixture record failed validation.
    #[error("invalid fixture character: {0}")]
    Character(#[from] CharacterValidationError),
}

const FIXTURE_API_BASE: &str = "https://rickandmortyapi.com/api/";
const FIXTURE_CHARACTER_COUNT: u32 = 826;
const FIXTURE_EPISODE_COUNT: u32 = 51;

/// In-memory catalogue serving a fixed reference dataset.
///
/// The dataset mirrors the shape of the public catalogue: 826 characters in
/// pages of [`PAGE_SIZE`], starting with Rick Sanchez and Morty Smith.
#[derive(Debug, Clone)]
pub struct FixtureCharacterSource {
    characters: Vec<Character>,
    api_base: Url,
}

impl FixtureCharacterSource {
    /// Build the reference dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if a fixture record fails to build.
    pub fn reference() -> Result<Self, FixtureSourceError> {
        let api_base = Url::parse(FIXTURE_API_BASE)?;
        let created = Utc
            .timestamp_opt(1_509_821_326, 250_000_000)
            .single()
            .unwrap_or_default();
        let all_episodes = (1..=FIXTURE_EPISODE_COUNT).collect::<Vec<_>>();

        let mut characters = Vec::with_capacity(FIXTURE_CHARACTER_COUNT as usize);
        characters.push(fixture_character(
            &api_base,
            FixtureSeed {
                id: 1,
                name: "Rick Sanchez",
                species: "Human",
                origin: "Earth (C-137)",
                location: "Citadel of Ricks",
                episodes: &all_episodes,
            },
            created,
        )?);
        characters.push(fixture_character(
            &api_base,
            FixtureSeed {
                id: 2,
                name: "Morty Smith",
                species: "Alien",
                origin: "unknown",
                location: "Citadel of Ricks",
                episodes: &all_episodes,
            },
            created,
        )?);
        for id in 3..=FIXTURE_CHARACTER_COUNT {
            let name = format!("Character {id}");
            characters.push(fixture_character(
                &api_base,
                FixtureSeed {
                    id,
                    name: &name,
                    species: "Human",
                    origin: "unknown",
                    location: "Earth (Replacement Dimension)",
                    episodes: &[id % FIXTURE_EPISODE_COUNT + 1],
                },
                created,
            )?);
        }

        Ok(Self {
            characters,
            api_base,
        })
    }

    /// Build a fixture serving exactly the given characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture base URL fails to parse.
    pub fn with_characters(characters: Vec<Character>) -> Result<Self, FixtureSourceError> {
        Ok(Self {
            characters,
            api_base: Url::parse(FIXTURE_API_BASE)?,
        })
    }

    fn page_count(&self) -> usize {
        self.characters.len().div_ceil(PAGE_SIZE).max(1)
    }

    fn page_link(&self, page: usize) -> Option<Url> {
        let mut link = self.api_base.join("character").ok()?;
        link.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Some(link)
    }
}

struct FixtureSeed<'a> {
    id: u32,
    name: &'a str,
    species: &'a str,
    origin: &'a str,
    location: &'a str,
    episodes: &'a [u32],
}

fn fixture_character(
    api_base: &Url,
    seed: FixtureSeed<'_>,
    created: DateTime<Utc>,
) -> Result<Character, FixtureSourceError> {
    let id = seed.id;
    let episodes = seed
        .episodes
        .iter()
        .map(|episode| api_base.join(&format!("episode/{episode}")))
        .collect::<Result<Vec<_>, _>>()?;
    let origin_url = match seed.origin {
        "unknown" => None,
        _ => Some(api_base.join("location/1")?),
    };

    Ok(Character {
        id: CharacterId::new(id)?,
        name: seed.name.to_owned(),
        status: if id % 7 == 0 {
            CharacterStatus::Dead
        } else {
            CharacterStatus::Alive
        },
        species: seed.species.to_owned(),
        kind: None,
        gender: "Male".to_owned(),
        origin: ResourceLink {
            name: seed.origin.to_owned(),
            url: origin_url,
        },
        location: ResourceLink {
            name: seed.location.to_owned(),
            url: Some(api_base.join("location/3")?),
        },
        episodes,
        image: api_base.join(&format!("character/avatar/{id}.jpeg"))?,
        created,
        url: api_base.join(&format!("character/{id}"))?,
    })
}

#[async_trait]
impl CharacterSource for FixtureCharacterSource {
    async fn list_characters(
        &self,
        page: PageNumber,
    ) -> Result<CharacterPage, CharacterSourceError> {
        let pages = self.page_count();
        let index = page.get() as usize;
        if index > pages {
            return Err(CharacterSourceError::remote("There is nothing here"));
        }

        let results = self
            .characters
            .iter()
            .skip((index - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .cloned()
            .collect();
        let info = PageInfo {
            count: self.characters.len() as u64,
            pages: u32::try_from(pages).unwrap_or(u32::MAX),
            next: (index < pages)
                .then(|| self.page_link(index + 1))
                .flatten(),
            prev: (index > 1).then(|| self.page_link(index - 1)).flatten(),
        };
        Ok(Page { info, results })
    }

    async fn get_character(&self, id: CharacterId) -> Result<Character, CharacterSourceError> {
        self.characters
            .iter()
            .find(|character| character.id == id)
            .cloned()
            .ok_or_else(|| CharacterSourceError::not_found("Character not found"))
    }
}
