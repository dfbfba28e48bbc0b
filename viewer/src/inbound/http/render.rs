//! HTML rendering for the list and detail screens.
//!
//! Rendering is a pure function of a [`Screen`]; handlers choose the status
//! code. All catalogue text passes through [`escape`] before it reaches the
//! document.

use crate::domain::character::Character;
use crate::domain::navigation::NavigationState;
use crate::domain::query_cache::QueryState;
use crate::domain::viewer::{DetailScreen, ListScreen, Screen};
use crate::domain::{CharacterPage, ports::CharacterSourceError};
use crate::middleware::trace::TraceId;

const APP_TITLE: &str = "Rick & Morty Characters";

/// Render a full HTML document for `screen`.
pub fn screen_document(screen: &Screen) -> String {
    match screen {
        Screen::List(list) => document(APP_TITLE, &list_body(list)),
        Screen::Detail(detail) => {
            let title = detail
                .state
                .ready()
                .map_or_else(|| APP_TITLE.to_owned(), |character| character.name.clone());
            document(&title, &detail_body(detail))
        }
    }
}

/// Render the not-found display used for malformed character ids.
pub fn character_not_found_document() -> String {
    let back = NavigationState::default().to_uri();
    let body = format!(
        "{}\n{}",
        back_link(&back),
        error_block("Character not found")
    );
    document(APP_TITLE, &body)
}

/// Render the page served for paths outside the viewer's routes.
pub fn route_not_found_document(path: &str) -> String {
    let home = NavigationState::default().to_uri();
    let body = format!(
        "{}\n<p><a href=\"{}\">{}</a></p>",
        error_block(&format!("No page at {path}")),
        escape(&home),
        escape(APP_TITLE)
    );
    document(APP_TITLE, &body)
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n<header><h1>{}</h1></header>\n\
         <main>\n{body}\n</main>\n</body>\n</html>\n",
        escape(title),
        escape(APP_TITLE)
    )
}

fn list_body(screen: &ListScreen) -> String {
    let loaded = match &screen.state {
        QueryState::Ready(page) => page,
        other => return unsettled_block(other),
    };
    let state = NavigationState::List { page: screen.page };
    let mut html = String::from("<div class=\"character-list\">\n");
    html.push_str(&format!(
        "<div class=\"table-info\"><p>Showing {} characters (Total: {})</p></div>\n",
        loaded.len(),
        loaded.info.count
    ));
    html.push_str(
        "<table class=\"character-table\">\n<thead><tr>\
         <th>ID</th><th>Name</th><th>Status</th><th>Species</th>\
         <th>Type</th><th>Gender</th><th>Origin</th><th>Episodes</th>\
         </tr></thead>\n<tbody>\n",
    );
    for character in &loaded.results {
        html.push_str(&list_row(state, character));
    }
    html.push_str("</tbody>\n</table>\n");
    html.push_str(&pagination(state, screen, loaded));
    html.push_str("</div>");
    html
}

fn list_row(state: NavigationState, character: &Character) -> String {
    let detail = state.select_character(character.id).to_uri();
    format!(
        "<tr><td class=\"id-cell\">{id}</td>\
         <td><a class=\"name-link\" href=\"{href}\">{name}</a></td>\
         <td>{status}</td><td>{species}</td><td>{kind}</td><td>{gender}</td>\
         <td>{origin}</td>\
         <td><span class=\"episode-count\">{episodes} episodes</span></td></tr>\n",
        id = character.id,
        href = escape(&detail),
        name = escape(&character.name),
        status = status_tag(character),
        species = escape(&character.species),
        kind = escape(character.kind_or("-")),
        gender = escape(&character.gender),
        origin = escape(&character.origin.name),
        episodes = character.episodes.len(),
    )
}

fn pagination(state: NavigationState, screen: &ListScreen, loaded: &CharacterPage) -> String {
    let previous = state.previous_page(&loaded.info);
    let next = state.next_page(&loaded.info);
    format!(
        "<nav class=\"pagination\">{} <span>Page {} of {}</span> {}</nav>\n",
        page_control("Previous", "prev", state, previous),
        screen.page,
        loaded.info.pages,
        page_control("Next", "next", state, next),
    )
}

fn page_control(
    label: &str,
    rel: &str,
    current: NavigationState,
    target: NavigationState,
) -> String {
    if target == current {
        format!("<span class=\"page-control disabled\" aria-disabled=\"true\">{label}</span>")
    } else {
        format!(
            "<a class=\"page-control\" rel=\"{rel}\" href=\"{}\">{label}</a>",
            escape(&target.to_uri())
        )
    }
}

fn detail_body(screen: &DetailScreen) -> String {
    let character = match &screen.state {
        QueryState::Ready(character) => character,
        other => {
            let back = NavigationState::Detail {
                character_id: screen.character_id,
            }
            .go_back()
            .to_uri();
            return format!("{}\n{}", back_link(&back), unsettled_block(other));
        }
    };
    let state = NavigationState::Detail {
        character_id: character.id,
    };
    let mut html = String::from("<div class=\"character-details\">\n");
    html.push_str(&format!(
        "<div class=\"details-header\">{}<h2>{}</h2></div>\n",
        back_link(&state.go_back().to_uri()),
        escape(&character.name)
    ));
    html.push_str(&format!(
        "<div class=\"details-image\"><img src=\"{}\" alt=\"{}\"></div>\n",
        escape(character.image.as_str()),
        escape(&character.name)
    ));

    html.push_str(&format!(
        "<section class=\"info-section\"><h3>Basic Info</h3>\n\
         <p><strong>Status:</strong> {}</p>\n\
         <p><strong>Species:</strong> {}</p>\n\
         <p><strong>Type:</strong> {}</p>\n\
         <p><strong>Gender:</strong> {}</p>\n</section>\n",
        status_tag(character),
        escape(&character.species),
        escape(character.kind_or("Unknown")),
        escape(&character.gender)
    ));

    html.push_str(&format!(
        "<section class=\"info-section\"><h3>Location</h3>\n\
         <p><strong>Origin:</strong> {}</p>\n\
         <p><strong>Current Location:</strong> {}</p>\n",
        escape(&character.origin.name),
        escape(&character.location.name)
    ));
    for (label, link) in [
        ("Origin URL", &character.origin),
        ("Location URL", &character.location),
    ] {
        if let Some(url) = &link.url {
            html.push_str(&format!(
                "<p><strong>{label}:</strong> {}</p>\n",
                external_link(url.as_str(), "View Location")
            ));
        }
    }
    html.push_str("</section>\n");

    html.push_str(&episodes_section(character));

    html.push_str(&format!(
        "<section class=\"info-section\"><h3>Created</h3>\n\
         <p>{}</p>\n\
         <p><strong>Character ID:</strong> {}</p>\n\
         <p><strong>API URL:</strong> {}</p>\n</section>\n",
        escape(&character.created_display()),
        character.id,
        external_link(character.url.as_str(), "View API Data")
    ));
    html.push_str("</div>");
    html
}

fn episodes_section(character: &Character) -> String {
    let preview = character.episode_preview();
    let mut tags = preview
        .shown
        .iter()
        .map(|number| format!("<span class=\"episode-tag\">Episode {}</span>", escape(number)))
        .collect::<Vec<_>>();
    if preview.remaining > 0 {
        tags.push(format!(
            "<span class=\"episode-tag\">+{} more</span>",
            preview.remaining
        ));
    }
    format!(
        "<section class=\"info-section\"><h3>Episodes</h3>\n\
         <p>Appears in <strong>{}</strong> episodes</p>\n\
         <div class=\"episode-list\">{}</div>\n</section>\n",
        character.episodes.len(),
        tags.join("")
    )
}

fn status_tag(character: &Character) -> String {
    format!(
        "<span class=\"status-tag status-{}\">{}</span>",
        character.status.tag(),
        character.status.as_str()
    )
}

fn back_link(href: &str) -> String {
    format!(
        "<a class=\"back-btn\" href=\"{}\">&larr; Back</a>",
        escape(href)
    )
}

fn external_link(href: &str, label: &str) -> String {
    format!(
        "<a class=\"api-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>",
        escape(href)
    )
}

fn unsettled_block<V>(state: &QueryState<V, CharacterSourceError>) -> String {
    match state {
        QueryState::Failed(error) => error_block(error.message()),
        _ => "<div class=\"loading\">Loading...</div>".to_owned(),
    }
}

/// Error display; carries the request's trace id when one is in scope.
fn error_block(message: &str) -> String {
    let trace = TraceId::current()
        .map(|id| format!("<p class=\"trace-id\">Trace ID: {id}</p>"))
        .unwrap_or_default();
    format!(
        "<div class=\"error\" role=\"alert\">Error: {}{trace}</div>",
        escape(message)
    )
}
