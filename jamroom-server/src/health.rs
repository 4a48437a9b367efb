use axum::{extract::State, routing::get, Json};

use crate::{
    context::ServerContext,
    serialized::{ClientConfig, Health, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/health",
    tag = "status",
    responses(
        (status = 200, body = Health, description = "The server is up")
    )
)]
pub async fn health(State(context): State<ServerContext>) -> Json<Health> {
    let counts = context.collab.rooms.counts();

    Json(Health {
        status: "ok".to_string(),
        rooms: counts.rooms,
        users: counts.users,
    })
}

#[utoipa::path(
    get,
    path = "/api/client-config",
    tag = "status",
    responses(
        (status = 200, body = ClientConfig, description = "How clients stay in sync and reconnect")
    )
)]
pub async fn client_config(State(context): State<ServerContext>) -> Json<ClientConfig> {
    Json(context.collab.config().to_serialized())
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/client-config", get(client_config))
}
