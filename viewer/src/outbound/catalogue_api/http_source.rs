//! Reqwest-backed character catalogue adapter.
//!
//! This adapter owns transport details only: URL construction, HTTP status
//! mapping, and JSON decoding into domain characters. It never retries.

use std::time::Duration;

use async_trait::async_trait;
use pagination::PageNumber;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::dto::{CharacterDto, CharacterPageDto, ErrorBodyDto, into_domain_page};
use crate::domain::character::{Character, CharacterId, CharacterPage};
use crate::domain::ports::{CharacterSource, CharacterSourceError};

/// Public catalogue endpoint used when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api";

const USER_AGENT: &str = concat!("character-viewer/", env!("CARGO_PKG_VERSION"));
const NOT_FOUND_FALLBACK: &str = "Character not found";

/// Catalogue adapter issuing HTTP GET requests below one base URL.
pub struct CatalogueHttpSource {
    client: Client,
    base_url: Url,
}

impl CatalogueHttpSource {
    /// Build an adapter rooted at `base_url`.
    ///
    /// Without a `timeout` the transport default applies.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use character_viewer::outbound::catalogue_api::{CatalogueHttpSource, DEFAULT_API_BASE_URL};
    ///
    /// let base_url = url::Url::parse(DEFAULT_API_BASE_URL).expect("valid url");
    /// let source = CatalogueHttpSource::new(base_url, Some(Duration::from_secs(5)));
    /// assert!(source.is_ok());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: with_trailing_slash(base_url),
        })
    }

    fn list_url(&self, page: PageNumber) -> Result<Url, CharacterSourceError> {
        let mut url = self.endpoint("character")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    fn character_url(&self, id: CharacterId) -> Result<Url, CharacterSourceError> {
        self.endpoint(&format!("character/{id}"))
    }

    fn endpoint(&self, path: &str) -> Result<Url, CharacterSourceError> {
        self.base_url.join(path).map_err(|error| {
            CharacterSourceError::remote(format!("invalid catalogue url for {path}: {error}"))
        })
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, Vec<u8>), CharacterSourceError> {
        debug!(%url, "requesting catalogue resource");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "catalogue returned non-success status");
        }
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl CharacterSource for CatalogueHttpSource {
    async fn list_characters(
        &self,
        page: PageNumber,
    ) -> Result<CharacterPage, CharacterSourceError> {
        let (status, body) = self.get(self.list_url(page)?).await?;
        if !status.is_success() {
            return Err(map_status_error("characters", status, &body));
        }
        parse_page(&body)
    }

    async fn get_character(&self, id: CharacterId) -> Result<Character, CharacterSourceError> {
        let (status, body) = self.get(self.character_url(id)?).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CharacterSourceError::not_found(not_found_message(&body)));
        }
        if !status.is_success() {
            return Err(map_status_error("character", status, &body));
        }
        parse_character(&body)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_page(body: &[u8]) -> Result<CharacterPage, CharacterSourceError> {
    let decoded: CharacterPageDto = serde_json::from_slice(body).map_err(|error| {
        CharacterSourceError::remote(format!("invalid character page payload: {error}"))
    })?;
    into_domain_page(decoded).map_err(CharacterSourceError::remote)
}

fn parse_character(body: &[u8]) -> Result<Character, CharacterSourceError> {
    let decoded: CharacterDto = serde_json::from_slice(body).map_err(|error| {
        CharacterSourceError::remote(format!("invalid character payload: {error}"))
    })?;
    decoded.into_domain().map_err(CharacterSourceError::remote)
}

fn not_found_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .map(|decoded| decoded.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| NOT_FOUND_FALLBACK.to_owned())
}

fn map_transport_error(error: reqwest::Error) -> CharacterSourceError {
    let kind = if error.is_timeout() {
        "timed out"
    } else {
        "failed"
    };
    warn!(%error, "catalogue request {kind}");
    CharacterSourceError::remote(format!("catalogue request {kind}: {error}"))
}

fn map_status_error(what: &str, status: StatusCode, body: &[u8]) -> CharacterSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("Failed to fetch {what} (status {})", status.as_u16())
    } else {
        format!("Failed to fetch {what} (status {}: {preview})", status.as_u16())
    };
    CharacterSourceError::remote(message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let text = String::from_utf8_lossy(body);
    let mut words = text.split_whitespace();
    let mut preview = String::new();
    for word in words.by_ref() {
        if !preview.is_empty() {
            preview.push(' ');
        }
        preview.push_str(word);
        if preview.chars().count() > PREVIEW_CHAR_LIMIT {
            let cut = preview.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
            return format!("{cut}...");
        }
    }
    preview
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network catalogue mapping helpers.

    use super::*;
    use rstest::rstest;

    const RICK: &str = r#"{
        "id": 1,
        "name": "Rick Sanchez",
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": { "name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1" },
        "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
        "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
        "episode": [
            "https://rickandmortyapi.com/api/episode/1",
            "https://rickandmortyapi.com/api/episode/2"
        ],
        "url": "https://rickandmortyapi.com/api/character/1",
        "created": "2017-11-04T18:48:46.250Z"
    }"#;

    fn source(base: &str) -> CatalogueHttpSource {
        CatalogueHttpSource::new(Url::parse(base).expect("valid base"), None)
            .expect("client builds")
    }

    #[rstest]
    #[case::bare("https://catalogue.test/api")]
    #[case::slashed("https://catalogue.test/api/")]
    fn builds_urls_below_base_path(#[case] base: &str) {
        let source = source(base);
        let page = PageNumber::new(3).expect("non-zero");
        let id = CharacterId::new(2).expect("non-zero");

        assert_eq!(
            source.list_url(page).expect("list url").as_str(),
            "https://catalogue.test/api/character?page=3"
        );
        assert_eq!(
            source.character_url(id).expect("detail url").as_str(),
            "https://catalogue.test/api/character/2"
        );
    }

    #[test]
    fn parses_character_payload_into_domain() {
        let character = parse_character(RICK.as_bytes()).expect("payload decodes");
        assert_eq!(character.id.get(), 1);
        assert_eq!(character.name, "Rick Sanchez");
        assert_eq!(character.kind, None, "empty type means none");
        assert_eq!(character.episode_numbers().collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(character.origin.url.is_some());
    }

    #[test]
    fn empty_location_url_becomes_none() {
        let body = RICK.replace(
            r#""url": "https://rickandmortyapi.com/api/location/1""#,
            r#""url": """#,
        );
        let character = parse_character(body.as_bytes()).expect("payload decodes");
        assert!(character.origin.url.is_none());
    }

    #[test]
    fn parses_page_payload() {
        let body = format!(
            r#"{{
                "info": {{ "count": 826, "pages": 42, "next": "https://rickandmortyapi.com/api/character?page=2", "prev": null }},
                "results": [{RICK}]
            }}"#
        );
        let page = parse_page(body.as_bytes()).expect("payload decodes");
        assert_eq!(page.info.count, 826);
        assert_eq!(page.len(), 1);
        assert_eq!(page.info.next_page_number().map(PageNumber::get), Some(2));
    }

    #[rstest]
    #[case::not_json("<html>")]
    #[case::wrong_shape(r#"{"items": []}"#)]
    #[case::bad_status(r#"{"info": {"count": 1, "pages": 1, "next": null, "prev": null}, "results": [{"id": 1, "name": "x", "status": "Undead", "species": "x", "gender": "x", "origin": {"name": "x"}, "location": {"name": "x"}, "image": "https://x.test/1.jpeg", "url": "https://x.test/1", "created": "2017-11-04T18:48:46.250Z"}]}"#)]
    fn malformed_pages_are_remote_errors(#[case] body: &str) {
        let error = parse_page(body.as_bytes()).expect_err("decode should fail");
        assert!(matches!(error, CharacterSourceError::Remote { .. }));
    }

    #[test]
    fn zero_id_is_rejected() {
        let body = RICK.replace(r#""id": 1"#, r#""id": 0"#);
        assert!(parse_character(body.as_bytes()).is_err());
    }

    #[rstest]
    #[case::catalogue_message(br#"{"error":"Character not found"}"#.as_slice(), "Character not found")]
    #[case::blank_message(br#"{"error":" "}"#.as_slice(), NOT_FOUND_FALLBACK)]
    #[case::no_body(b"".as_slice(), NOT_FOUND_FALLBACK)]
    fn not_found_uses_catalogue_message(#[case] body: &[u8], #[case] expected: &str) {
        assert_eq!(not_found_message(body), expected);
    }

    #[rstest]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::bad_gateway(StatusCode::BAD_GATEWAY)]
    #[case::missing_page(StatusCode::NOT_FOUND)]
    fn statuses_map_to_remote_errors(#[case] status: StatusCode) {
        let error = map_status_error("characters", status, b"{\"error\": \"There is nothing here\"}");
        assert!(matches!(error, CharacterSourceError::Remote { .. }));
        assert!(
            error.message().contains(&status.as_u16().to_string()),
            "message should name the status"
        );
        assert!(error.message().starts_with("Failed to fetch characters"));
    }

    #[test]
    fn body_preview_is_compacted_and_truncated() {
        assert_eq!(body_preview(b"  a \n b\tc "), "a b c");
        let long = "x ".repeat(200);
        let preview = body_preview(long.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }
}
