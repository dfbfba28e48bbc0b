//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{CatalogueBackend, ServerConfig};
pub use state_builders::{build_character_source, build_http_state};

use std::future::Future;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

use crate::Trace;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::pages::{character_page, list_page, route_not_found};
use crate::inbound::http::state::HttpState;

/// Shared data handed to every worker's `App`.
#[derive(Clone)]
pub struct AppDependencies {
    /// Probe flags.
    pub health_state: web::Data<HealthState>,
    /// Page handler state.
    pub http_state: web::Data<HttpState>,
}

/// Assemble the viewer application.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(list_page)
        .service(character_page)
        .service(ready)
        .service(live)
        .default_service(web::to(route_not_found))
}

/// Construct an Actix HTTP server for `config`.
///
/// `health_state` is marked ready once the listener is bound. Actix's own
/// signal handling is disabled; pair the server with [`drain_on`].
///
/// # Errors
///
/// Propagates [`std::io::Error`] when building the catalogue source or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let bind_addr = config.bind_addr();
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "character viewer listening");
    health_state.mark_ready();
    Ok(server)
}

/// Wait for `shutdown`, then fail liveness and stop the server gracefully.
pub async fn drain_on<F>(shutdown: F, health_state: web::Data<HealthState>, handle: ServerHandle)
where
    F: Future<Output = ()>,
{
    shutdown.await;
    info!("shutdown requested, draining");
    health_state.mark_unhealthy();
    handle.stop(true).await;
}

/// Resolves on the first SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}
