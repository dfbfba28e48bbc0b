//! Catalogue HTTP adapter against a local stand-in for the remote API.
//!
//! The stand-in is an Actix server on an ephemeral port serving canned
//! payloads, so status mapping and decoding run over a real socket.

use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use mockable::DefaultClock;
use pagination::PageNumber;
use reqwest::Url;
use rstest::rstest;

use character_viewer::domain::ports::{CharacterSource, CharacterSourceError};
use character_viewer::domain::query_cache::RetentionPolicy;
use character_viewer::domain::{CharacterId, CharacterViewer};
use character_viewer::outbound::catalogue_api::CatalogueHttpSource;

const PAGE_ONE: &str = include_str!("fixtures/character_page_1.json");
const RICK: &str = include_str!("fixtures/character_1.json");

#[derive(Default)]
struct Hits(AtomicUsize);

fn json(status: actix_web::http::StatusCode, body: &'static str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("application/json")
        .body(body)
}

async fn list(req: HttpRequest, hits: web::Data<Hits>) -> HttpResponse {
    use actix_web::http::StatusCode;

    hits.0.fetch_add(1, Ordering::SeqCst);
    let page = req
        .query_string()
        .strip_prefix("page=")
        .unwrap_or_default()
        .to_owned();
    match page.as_str() {
        "1" => json(StatusCode::OK, PAGE_ONE),
        "5" => json(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded"),
        "7" => json(StatusCode::OK, r#"{"results": "nope"}"#),
        "8" => {
            actix_web::rt::time::sleep(Duration::from_secs(2)).await;
            json(StatusCode::OK, PAGE_ONE)
        }
        _ => json(StatusCode::NOT_FOUND, r#"{"error":"There is nothing here"}"#),
    }
}

async fn detail(path: web::Path<String>) -> HttpResponse {
    use actix_web::http::StatusCode;

    match path.as_str() {
        "1" => json(StatusCode::OK, RICK),
        "13" => json(StatusCode::OK, "<html>maintenance</html>"),
        "500" => json(StatusCode::SERVICE_UNAVAILABLE, ""),
        _ => json(StatusCode::NOT_FOUND, r#"{"error":"Character not found"}"#),
    }
}

struct StubCatalogue {
    base_url: Url,
    hits: web::Data<Hits>,
    handle: ServerHandle,
}

impl StubCatalogue {
    fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let hits = web::Data::new(Hits::default());
        let server_hits = hits.clone();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_hits.clone())
                .route("/api/character", web::get().to(list))
                .route("/api/character/{id}", web::get().to(detail))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen on stub socket")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: Url::parse(&format!("http://{addr}/api")).expect("stub url"),
            hits,
            handle,
        }
    }

    fn source(&self, timeout: Option<Duration>) -> CatalogueHttpSource {
        CatalogueHttpSource::new(self.base_url.clone(), timeout).expect("client builds")
    }

    fn hits(&self) -> usize {
        self.hits.0.load(Ordering::SeqCst)
    }

    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn page(value: u32) -> PageNumber {
    PageNumber::new(value).expect("non-zero page")
}

fn character_id(value: u32) -> CharacterId {
    CharacterId::new(value).expect("non-zero id")
}

#[actix_web::test]
async fn first_page_decodes_catalogue_envelope() {
    let stub = StubCatalogue::spawn();

    let loaded = stub
        .source(None)
        .list_characters(page(1))
        .await
        .expect("page 1 loads");

    assert_eq!(loaded.info.count, 826);
    assert_eq!(loaded.info.pages, 42);
    assert!(loaded.info.has_next());
    assert!(!loaded.info.has_previous());
    assert_eq!(
        loaded.results.first().map(|c| c.name.as_str()),
        Some("Rick Sanchez")
    );
    assert!(
        loaded.results[1].origin.url.is_none(),
        "empty origin url decodes as none"
    );
    stub.stop().await;
}

#[actix_web::test]
async fn character_decodes_with_episode_preview() {
    let stub = StubCatalogue::spawn();

    let rick = stub
        .source(None)
        .get_character(character_id(1))
        .await
        .expect("Rick loads");

    assert_eq!(rick.name, "Rick Sanchez");
    assert_eq!(rick.kind_or("Unknown"), "Unknown");
    assert_eq!(rick.created_display(), "November 4, 2017");
    let preview = rick.episode_preview();
    assert_eq!(preview.shown, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(preview.remaining, 2);
    stub.stop().await;
}

#[rstest]
#[case::past_last_page(99, "There is nothing here")]
#[case::server_error(5, "status 500")]
#[case::malformed_payload(7, "invalid character page payload")]
#[actix_web::test]
async fn list_failures_are_remote(#[case] requested: u32, #[case] fragment: &str) {
    let stub = StubCatalogue::spawn();

    let error = stub
        .source(None)
        .list_characters(page(requested))
        .await
        .expect_err("page should fail");

    assert!(matches!(error, CharacterSourceError::Remote { .. }));
    assert!(
        error.message().contains(fragment),
        "{:?} should mention {fragment:?}",
        error.message()
    );
    stub.stop().await;
}

#[rstest]
#[case::unknown_id(9999, true)]
#[case::undecodable(13, false)]
#[case::unavailable(500, false)]
#[actix_web::test]
async fn detail_failures_distinguish_not_found(#[case] id: u32, #[case] not_found: bool) {
    let stub = StubCatalogue::spawn();

    let error = stub
        .source(None)
        .get_character(character_id(id))
        .await
        .expect_err("character should fail");

    assert_eq!(error.is_not_found(), not_found);
    if not_found {
        assert_eq!(error.message(), "Character not found");
    }
    stub.stop().await;
}

#[actix_web::test]
async fn slow_responses_hit_the_timeout() {
    let stub = StubCatalogue::spawn();

    let error = stub
        .source(Some(Duration::from_millis(100)))
        .list_characters(page(8))
        .await
        .expect_err("request should time out");

    assert!(matches!(error, CharacterSourceError::Remote { .. }));
    stub.stop().await;
}

#[actix_web::test]
async fn viewer_collapses_concurrent_reads_into_one_request() {
    let stub = StubCatalogue::spawn();
    let viewer = CharacterViewer::new(
        Arc::new(stub.source(None)),
        RetentionPolicy::default(),
        Arc::new(DefaultClock),
    );

    let (first, second) = tokio::join!(viewer.character_page(page(1)), viewer.character_page(page(1)));
    let third = viewer.character_page(page(1)).await;

    for loaded in [first, second, third] {
        assert_eq!(loaded.expect("page 1 loads").info.count, 826);
    }
    assert_eq!(stub.hits(), 1);
    stub.stop().await;
}
