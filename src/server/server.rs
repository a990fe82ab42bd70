use anyhow::{Context, Result};
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::{Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::state::{ServerState, SharedFetcher};
use super::{log_requests, ServerConfig};
use crate::fetch::scrape_grid;
use crate::sequence::map_to_sequence;

#[cfg(feature = "slowdown")]
use super::slowdown_request;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };
    Json(stats)
}

/// Always answers 200: an empty object means there is nothing to play.
async fn scrape(State(fetcher): State<SharedFetcher>, Path(identifier): Path<String>) -> Response {
    let grid = scrape_grid(fetcher.as_ref(), &identifier).await;
    info!("Scraped {} weeks for {}", grid.len(), identifier);
    Json(grid).into_response()
}

async fn sequence(
    State(fetcher): State<SharedFetcher>,
    Path(identifier): Path<String>,
) -> Response {
    let grid = scrape_grid(fetcher.as_ref(), &identifier).await;
    Json(map_to_sequence(&grid)).into_response()
}

pub fn make_app(config: ServerConfig, fetcher: SharedFetcher) -> Router {
    let state = ServerState::new(config.clone(), fetcher);

    let scrape_routes: Router = Router::new()
        .route("/scrape/{identifier}", get(scrape))
        .route("/sequence/{identifier}", get(sequence))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    #[allow(unused_mut)]
    let mut app: Router = home_router.merge(scrape_routes);

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, fetcher: SharedFetcher) -> Result<()> {
    let port = config.port;
    let app = make_app(config, fetcher);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;

    info!("App listening on port {}", port);
    Ok(axum::serve(listener, app).await?)
}
