mod client;

pub use client::{GridClient, HttpProfileFetcher, ProfileFetcher};

use crate::grid::{extract_or_empty, ColorGrid};
use tracing::error;

/// Fetches the profile page and extracts its calendar. Any failure is logged
/// and reported as an empty grid.
pub async fn scrape_grid(fetcher: &dyn ProfileFetcher, identifier: &str) -> ColorGrid {
    match fetcher.fetch_document(identifier).await {
        Ok(document) => extract_or_empty(&document),
        Err(err) => {
            error!("Could not fetch profile of {}: {}", identifier, err);
            ColorGrid::default()
        }
    }
}
