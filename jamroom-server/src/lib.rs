mod config;
mod context;
mod docs;
mod errors;
mod events;
mod gateway;
mod health;
mod library;
mod protocol;
mod relay;
mod rooms;
mod schemas;
mod serialized;

use std::{
    net::{Ipv6Addr, SocketAddr},
    time::{Duration, Instant},
};

use axum::routing::get;
use jamroom_collab::LibraryError;
use log::{debug, info};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use config::*;
pub use context::ServerContext;
pub use errors::{ErrorKind, ServerError};
pub use events::ServerEvent;
pub use gateway::Gateway;

pub type Router = axum::Router<ServerContext>;

/// How often host requests and idle rooms are checked
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Could not prepare the music directory: {0}")]
    Library(#[from] LibraryError),
    #[error("Could not listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server stopped unexpectedly: {0}")]
    Serve(std::io::Error),
}

/// Starts the jamroom server
pub async fn run_server(config: ServerConfig) -> Result<(), RunError> {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, config.port).into();
    let context = ServerContext::new(config);

    ensure_music_dir(&context).await?;

    tokio::spawn(gateway::forward_events(context.clone()));
    tokio::spawn(sweep(context.clone()));

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| RunError::Bind { addr, source })?;

    info!("Listening on {}", addr);

    axum::serve(listener, router(context).into_make_service())
        .await
        .map_err(RunError::Serve)
}

async fn ensure_music_dir(context: &ServerContext) -> Result<(), LibraryError> {
    tokio::fs::create_dir_all(&context.config.music_dir).await?;

    let tracks = context.collab.library.list().await?;
    info!(
        "Serving {} tracks from {}",
        tracks.len(),
        context.config.music_dir.display()
    );

    Ok(())
}

/// Builds every route of the server
pub fn router(context: ServerContext) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/rooms", rooms::router())
        .nest("/api/ws", gateway::router())
        .merge(library::router(&context.config))
        .merge(health::router())
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context)
}

/// Expires host requests and prunes rooms nobody joined
async fn sweep(context: ServerContext) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        interval.tick().await;

        let now = Instant::now();
        let rooms = &context.collab.rooms;

        rooms.expire_host_requests(now);

        let pruned = rooms.prune_idle(now);
        if pruned > 0 {
            debug!("Pruned {} idle rooms", pruned);
        }
    }
}
