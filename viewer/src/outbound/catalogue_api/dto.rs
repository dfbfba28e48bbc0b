//! DTOs for decoding catalogue JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into domain
//! records in one pass. The catalogue encodes "none" as an empty string for
//! optional text and URL fields; the mapping turns those into `None`.

use std::fmt;

use chrono::{DateTime, Utc};
use pagination::Page;
use serde::Deserialize;
use url::Url;

use crate::domain::character::{
    Character, CharacterId, CharacterPage, CharacterStatus, ResourceLink,
};

pub(super) type CharacterPageDto = Page<CharacterDto>;

#[derive(Debug, Deserialize)]
pub(super) struct CharacterDto {
    pub(super) id: u32,
    pub(super) name: String,
    pub(super) status: String,
    pub(super) species: String,
    #[serde(rename = "type", default)]
    pub(super) kind: String,
    pub(super) gender: String,
    pub(super) origin: ResourceLinkDto,
    pub(super) location: ResourceLinkDto,
    #[serde(default)]
    pub(super) episode: Vec<String>,
    pub(super) image: String,
    pub(super) url: String,
    pub(super) created: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResourceLinkDto {
    pub(super) name: String,
    #[serde(default)]
    pub(super) url: String,
}

/// Error body the catalogue sends with 4xx responses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    pub(super) error: String,
}

pub(super) fn into_domain_page(page: CharacterPageDto) -> Result<CharacterPage, String> {
    page.try_map(CharacterDto::into_domain)
}

impl CharacterDto {
    pub(super) fn into_domain(self) -> Result<Character, String> {
        let id = CharacterId::new(self.id).map_err(|error| error.to_string())?;

        let status = self
            .status
            .parse::<CharacterStatus>()
            .map_err(|error| invalid(id, "status", error))?;
        let episodes = self
            .episode
            .iter()
            .map(|raw| Url::parse(raw).map_err(|error| invalid(id, "episode url", error)))
            .collect::<Result<Vec<_>, _>>()?;
        let created = DateTime::parse_from_rfc3339(&self.created)
            .map_err(|error| invalid(id, "created timestamp", error))?
            .with_timezone(&Utc);
        let origin = self
            .origin
            .into_domain()
            .map_err(|error| invalid(id, "origin url", error))?;
        let location = self
            .location
            .into_domain()
            .map_err(|error| invalid(id, "location url", error))?;
        let image = Url::parse(&self.image).map_err(|error| invalid(id, "image url", error))?;
        let url = Url::parse(&self.url).map_err(|error| invalid(id, "url", error))?;

        Ok(Character {
            id,
            name: self.name,
            status,
            species: self.species,
            kind: non_empty(self.kind),
            gender: self.gender,
            origin,
            location,
            episodes,
            image,
            created,
            url,
        })
    }
}

fn invalid(id: CharacterId, field: &str, error: impl fmt::Display) -> String {
    format!("character {id} has invalid {field}: {error}")
}

impl ResourceLinkDto {
    fn into_domain(self) -> Result<ResourceLink, url::ParseError> {
        let url = match non_empty(self.url) {
            Some(raw) => Some(Url::parse(&raw)?),
            None => None,
        };
        Ok(ResourceLink {
            name: self.name,
            url,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
