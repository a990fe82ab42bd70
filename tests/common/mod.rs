//! Common test infrastructure
//!
//! Spawns a fake upstream serving profile pages, and a scrape server fetching
//! from it over real HTTP.

#![allow(dead_code)]

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use commit_chords::fetch::HttpProfileFetcher;
use commit_chords::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const ACTIVE_USER: &str = "octocat";
pub const GARBLED_USER: &str = "garbled";
pub const SHORT_WEEK_USER: &str = "newcomer";

/// One week per entry, each a list of day colors.
pub fn profile_page(weeks: &[&[&str]]) -> String {
    let groups: String = weeks
        .iter()
        .enumerate()
        .map(|(x, days)| {
            let rects: String = days
                .iter()
                .enumerate()
                .map(|(y, fill)| {
                    format!(
                        r#"<rect class="day" width="10" height="10" x="{}" y="{}" fill="{}" data-count="1" data-date="2018-01-01"></rect>"#,
                        13 - x,
                        y * 12,
                        fill
                    )
                })
                .collect();
            format!(r#"<g transform="translate({}, 0)">{}</g>"#, x * 13, rects)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><link rel="stylesheet" href="/site.css"><title>profile</title></head>
<body>
<div class="js-contribution-graph"><h2>Contributions in the last year</h2>
<svg width="676" height="104" class="js-calendar-graph-svg">
<g transform="translate(16, 20)" data-hydro-click="">{}
<text x="13" y="-10" class="month">Jan</text>
<text text-anchor="start" class="wday" dx="-14" dy="8" style="display: none;">Sun</text>
</g>
</svg>
</div>
</body>
</html>"#,
        groups
    )
}

pub const ACTIVE_WEEKS: [&[&str]; 3] = [
    &["#196127", "#239a3b", "#7bc96f", "#c6e48b", "#ebedf0", "#ebedf0", "#ebedf0"],
    &["#ebedf0", "#ebedf0", "#ebedf0", "#ebedf0", "#ebedf0", "#ebedf0", "#ebedf0"],
    &["#c6e48b", "#c6e48b", "#196127", "#196127", "#7bc96f", "#239a3b", "#ebedf0"],
];

async fn upstream_profile(Path(identifier): Path<String>) -> Response {
    match identifier.as_str() {
        ACTIVE_USER => Html(profile_page(&ACTIVE_WEEKS)).into_response(),
        SHORT_WEEK_USER => Html(profile_page(&[&["#7bc96f", "#ebedf0", "#196127"]])).into_response(),
        GARBLED_USER => Html(r##"<html><svg><g><g><rect fill="#196127"></g></g></svg>"##)
            .into_response(),
        _ => (StatusCode::NOT_FOUND, Html("<html><body>Not Found</body></html>")).into_response(),
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://127.0.0.1:{}", port)
}

/// Scrape server backed by a fake upstream. Both live until the runtime ends.
pub struct TestServer {
    pub base_url: String,
    pub upstream_url: String,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let upstream_url = serve(Router::new().route("/{identifier}", get(upstream_profile))).await;

        let fetcher =
            HttpProfileFetcher::new(&upstream_url, 5).expect("Failed to create fetcher");
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
            frontend_dir_path: None,
        };
        let base_url = serve(make_app(config, Arc::new(fetcher))).await;

        TestServer {
            base_url,
            upstream_url,
        }
    }
}
