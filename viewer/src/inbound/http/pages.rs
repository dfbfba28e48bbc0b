//! Page handlers for the list and detail screens.
//!
//! ```text
//! GET /                    list screen, `?page=` selects the page
//! GET /character/{id}      detail screen
//! ```
//!
//! Status codes follow the screen: 200 when loaded, 404 for the not-found
//! display, 502 when the catalogue failed.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::{debug, warn};

use super::render;
use super::state::HttpState;
use crate::domain::navigation::{NavigationError, NavigationState};
use crate::domain::viewer::Screen;

/// List screen.
#[get("/")]
pub async fn list_page(state: web::Data<HttpState>, req: HttpRequest) -> HttpResponse {
    serve(&state, &req).await
}

/// Detail screen. The path segment is validated by navigation parsing, so a
/// malformed id gets the same not-found display as an unknown one.
#[get("/character/{character_id}")]
pub async fn character_page(state: web::Data<HttpState>, req: HttpRequest) -> HttpResponse {
    serve(&state, &req).await
}

/// Fallback for paths outside the viewer's routes.
pub async fn route_not_found(req: HttpRequest) -> HttpResponse {
    html(
        StatusCode::NOT_FOUND,
        render::route_not_found_document(req.path()),
    )
}

async fn serve(state: &HttpState, req: &HttpRequest) -> HttpResponse {
    let navigation = match NavigationState::from_uri(req.path(), Some(req.query_string())) {
        Ok(navigation) => navigation,
        Err(NavigationError::InvalidCharacterId { raw }) => {
            debug!(%raw, "rejected character id");
            return html(StatusCode::NOT_FOUND, render::character_not_found_document());
        }
        Err(NavigationError::UnknownRoute { path }) => {
            return html(StatusCode::NOT_FOUND, render::route_not_found_document(&path));
        }
    };

    let screen = state.viewer.screen(navigation).await;
    html(status_for(&screen), render::screen_document(&screen))
}

fn status_for(screen: &Screen) -> StatusCode {
    match screen.failure() {
        None => StatusCode::OK,
        Some(error) if error.is_not_found() => StatusCode::NOT_FOUND,
        Some(error) => {
            warn!(%error, state = ?screen.navigation(), "catalogue read failed");
            StatusCode::BAD_GATEWAY
        }
    }
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}
