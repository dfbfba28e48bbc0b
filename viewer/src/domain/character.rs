//! Character records read from the remote catalogue.
//!
//! Records are immutable once fetched. Adapters build them from transport
//! DTOs; the presentation layer only reads them.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::Page;
use thiserror::Error;
use url::Url;

/// Number of characters the remote catalogue returns per list page.
pub const PAGE_SIZE: usize = 20;

/// Number of episode numbers shown before collapsing into "+N more".
pub const EPISODE_PREVIEW_LEN: usize = 5;

/// One page of characters.
pub type CharacterPage = Page<Character>;

/// Errors raised while validating character fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterValidationError {
    /// Identifiers are positive integers.
    #[error("character id must be a positive integer, got {raw:?}")]
    InvalidId {
        /// Offending input.
        raw: String,
    },
    /// Status was not one of the known values.
    #[error("unknown character status {raw:?}")]
    UnknownStatus {
        /// Offending input.
        raw: String,
    },
}

/// Stable, positive character identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(NonZeroU32);

impl CharacterId {
    /// Build an identifier, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`CharacterValidationError::InvalidId`] for zero.
    pub fn new(value: u32) -> Result<Self, CharacterValidationError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| CharacterValidationError::InvalidId {
                raw: value.to_string(),
            })
    }

    /// Raw numeric value.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CharacterId {
    type Err = CharacterValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CharacterValidationError::InvalidId { raw: s.to_owned() };
        let value = s.parse::<u32>().map_err(|_| invalid())?;
        NonZeroU32::new(value).map(Self).ok_or_else(invalid)
    }
}

/// Life status reported by the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterStatus {
    /// Alive.
    Alive,
    /// Dead.
    Dead,
    /// The catalogue does not know.
    Unknown,
}

impl CharacterStatus {
    /// Label as the catalogue spells it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }

    /// Lower-case token used for status tag styling.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterStatus {
    type Err = CharacterValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alive" => Ok(Self::Alive),
            "dead" => Ok(Self::Dead),
            "unknown" => Ok(Self::Unknown),
            _ => Err(CharacterValidationError::UnknownStatus { raw: s.to_owned() }),
        }
    }
}

/// Named reference to another catalogue resource, such as a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    /// Display name.
    pub name: String,
    /// Resource URL, absent when the catalogue has none.
    pub url: Option<Url>,
}

/// A catalogue character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    /// Stable identifier.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Life status.
    pub status: CharacterStatus,
    /// Species label.
    pub species: String,
    /// Sub-type, absent when the catalogue reports none.
    pub kind: Option<String>,
    /// Gender label.
    pub gender: String,
    /// Place of origin.
    pub origin: ResourceLink,
    /// Last known location.
    pub location: ResourceLink,
    /// Episode resource URLs in catalogue order.
    pub episodes: Vec<Url>,
    /// Portrait image.
    pub image: Url,
    /// Creation time of the catalogue record.
    pub created: DateTime<Utc>,
    /// Canonical resource URL.
    pub url: Url,
}

/// Leading episode numbers plus the count of the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodePreview {
    /// Up to [`EPISODE_PREVIEW_LEN`] episode numbers.
    pub shown: Vec<String>,
    /// Episodes not listed in `shown`.
    pub remaining: usize,
}

impl Character {
    /// Episode numbers taken from the last path segment of each episode URL.
    pub fn episode_numbers(&self) -> impl Iterator<Item = &str> + '_ {
        self.episodes.iter().map(episode_number)
    }

    /// First few episode numbers for compact display.
    pub fn episode_preview(&self) -> EpisodePreview {
        let shown = self
            .episode_numbers()
            .take(EPISODE_PREVIEW_LEN)
            .map(str::to_owned)
            .collect::<Vec<_>>();
        EpisodePreview {
            remaining: self.episodes.len().saturating_sub(shown.len()),
            shown,
        }
    }

    /// Sub-type, or `fallback` when the catalogue has none.
    pub fn kind_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.kind.as_deref().unwrap_or(fallback)
    }

    /// Creation date in long US form, e.g. `November 4, 2017`.
    pub fn created_display(&self) -> String {
        self.created.format("%B %-d, %Y").to_string()
    }
}

fn episode_number(url: &Url) -> &str {
    url.path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn character_with_episodes(count: usize) -> Character {
        let episodes = (1..=count)
            .map(|n| {
                Url::parse(&format!("https://catalogue.test/api/episode/{n}"))
                    .expect("valid episode url")
            })
            .collect();
        Character {
            id: CharacterId::new(1).expect("non-zero"),
            name: "Rick Sanchez".to_owned(),
            status: CharacterStatus::Alive,
            species: "Human".to_owned(),
            kind: None,
            gender: "Male".to_owned(),
            origin: ResourceLink {
                name: "Earth (C-137)".to_owned(),
                url: None,
            },
            location: ResourceLink {
                name: "Citadel of Ricks".to_owned(),
                url: None,
            },
            episodes,
            image: Url::parse("https://catalogue.test/api/character/avatar/1.jpeg")
                .expect("valid image url"),
            created: Utc
                .with_ymd_and_hms(2017, 11, 4, 18, 48, 46)
                .single()
                .expect("valid timestamp"),
            url: Url::parse("https://catalogue.test/api/character/1").expect("valid url"),
        }
    }

    #[rstest]
    #[case::plain("7", Some(7))]
    #[case::zero("0", None)]
    #[case::negative("-1", None)]
    #[case::word("rick", None)]
    #[case::empty("", None)]
    fn parses_character_ids(#[case] raw: &str, #[case] expected: Option<u32>) {
        assert_eq!(raw.parse::<CharacterId>().ok().map(CharacterId::get), expected);
    }

    #[rstest]
    #[case("Alive", CharacterStatus::Alive)]
    #[case("Dead", CharacterStatus::Dead)]
    #[case("unknown", CharacterStatus::Unknown)]
    #[case("UNKNOWN", CharacterStatus::Unknown)]
    fn parses_statuses_case_insensitively(#[case] raw: &str, #[case] expected: CharacterStatus) {
        assert_eq!(raw.parse::<CharacterStatus>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(matches!(
            "Undead".parse::<CharacterStatus>(),
            Err(CharacterValidationError::UnknownStatus { .. })
        ));
    }

    #[test]
    fn preview_collapses_after_five_episodes() {
        let preview = character_with_episodes(51).episode_preview();
        assert_eq!(preview.shown, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(preview.remaining, 46);
    }

    #[test]
    fn preview_lists_short_runs_in_full() {
        let preview = character_with_episodes(2).episode_preview();
        assert_eq!(preview.shown, vec!["1", "2"]);
        assert_eq!(preview.remaining, 0);
    }

    #[test]
    fn formats_created_date_in_long_form() {
        assert_eq!(character_with_episodes(0).created_display(), "November 4, 2017");
    }

    #[test]
    fn missing_kind_uses_fallback() {
        let character = character_with_episodes(0);
        assert_eq!(character.kind_or("-"), "-");
    }
}
