use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{
    errors::{ErrorBody, ErrorKind},
    health, library, rooms,
    schemas::{NewRoomSchema, UploadSchema},
    serialized::{
        ClientConfig, CreatedRoom, Health, Playback, QueueItem, Reconnect, Room, RoomMember,
        RoomSummary, Track,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        rooms::list_rooms,
        rooms::room,
        rooms::create_room,
        library::list_tracks,
        library::upload,
        health::health,
        health::client_config,
    ),
    components(schemas(
        ErrorBody,
        ErrorKind,
        NewRoomSchema,
        UploadSchema,
        ClientConfig,
        CreatedRoom,
        Health,
        Playback,
        QueueItem,
        Reconnect,
        Room,
        RoomMember,
        RoomSummary,
        Track,
    )),
    tags(
        (name = "rooms", description = "Create and inspect rooms"),
        (name = "music", description = "The shared track library"),
        (name = "status", description = "Health and client settings"),
    ),
    info(
        title = "jamroom API",
        description = "jamroom-server exposes endpoints to manage listening rooms and their music. Real-time control happens over the WebSocket at /api/ws."
    )
)]
pub struct ApiDoc;

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
