use axum::extract::FromRef;

use crate::fetch::ProfileFetcher;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type SharedFetcher = Arc<dyn ProfileFetcher>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub fetcher: SharedFetcher,
}

impl ServerState {
    pub fn new(config: ServerConfig, fetcher: SharedFetcher) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            fetcher,
        }
    }
}

impl FromRef<ServerState> for SharedFetcher {
    fn from_ref(input: &ServerState) -> Self {
        input.fetcher.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
