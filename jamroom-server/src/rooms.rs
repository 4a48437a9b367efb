use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json,
};
use jamroom_collab::{random_string, NewRoom};
use log::info;

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{NewRoomSchema, ValidatedJson},
    serialized::{CreatedRoom, Room, RoomSummary, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "rooms",
    responses(
        (status = 200, body = Vec<RoomSummary>)
    )
)]
pub async fn list_rooms(State(context): State<ServerContext>) -> impl IntoResponse {
    let rooms: Vec<RoomSummary> = context.collab.rooms.list().to_serialized();

    Json(rooms)
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    tag = "rooms",
    params(
        ("id" = String, Path, description = "The room id")
    ),
    responses(
        (status = 200, body = Room),
        (status = 404, body = ErrorBody, description = "The room does not exist")
    )
)]
pub async fn room(
    State(context): State<ServerContext>,
    Path(id): Path<String>,
) -> ServerResult<Json<Room>> {
    let room = context.collab.rooms.room(&id)?;

    Ok(Json(room.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "rooms",
    request_body = NewRoomSchema,
    responses(
        (status = 200, body = CreatedRoom),
        (status = 400, body = ErrorBody, description = "The request body is invalid")
    )
)]
pub async fn create_room(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewRoomSchema>,
) -> ServerResult<Json<CreatedRoom>> {
    let user_id = random_string(16);

    let new_room = NewRoom {
        name: body.name,
        password: body.password,
        owner: Some(user_id.clone()),
    };

    // Password hashing is CPU bound
    let collab = context.collab.clone();
    let room = tokio::task::spawn_blocking(move || collab.rooms.create_room(new_room))
        .await
        .map_err(|e| ServerError::Unknown(e.to_string()))??;

    info!("{} created room {}", body.username, room.id);

    Ok(Json(CreatedRoom {
        room_id: room.id.clone(),
        user_id,
        room: room.to_serialized(),
    }))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/:id", get(room))
}

#[cfg(test)]
mod test {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use jamroom_collab::{ConnectionId, JoinRequest};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{context::ServerContext, router, ServerConfig};

    fn create_context() -> ServerContext {
        let config = ServerConfig {
            music_dir: std::env::temp_dir(),
            ..Default::default()
        };

        ServerContext::new(config)
    }

    async fn request(context: &ServerContext, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(context.clone()).oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn created_rooms_can_be_fetched() {
        let context = create_context();

        let (status, created) = request(
            &context,
            post_json(
                "/api/rooms",
                json!({"name": "Study Group", "username": "Alice"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let id = created["roomId"].as_str().unwrap().to_string();
        assert_eq!(created["room"]["name"], "Study Group");
        assert_eq!(created["userId"].as_str().unwrap().len(), 16);

        let get = Request::get(format!("/api/rooms/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, room) = request(&context, get).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(room["id"], id.as_str());
        assert_eq!(room["hasPassword"], false);

        let list = Request::get("/api/rooms").body(Body::empty()).unwrap();
        let (_, rooms) = request(&context, list).await;
        let ids: Vec<_> = rooms
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(ids, vec!["lobby".to_string(), id]);
    }

    #[tokio::test]
    async fn unknown_rooms_are_not_found() {
        let context = create_context();

        let get = Request::get("/api/rooms/nope").body(Body::empty()).unwrap();
        let (status, body) = request(&context, get).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not-found");
    }

    #[tokio::test]
    async fn invalid_room_bodies_are_rejected() {
        let context = create_context();

        let (status, body) =
            request(&context, post_json("/api/rooms", json!({"name": "", "username": "Alice"})))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");

        let (status, _) =
            request(&context, post_json("/api/rooms", json!({"username": "Alice"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(context.collab.rooms.list().len(), 1);
    }

    #[tokio::test]
    async fn the_creator_is_host_even_when_joining_second() {
        let context = create_context();

        let (_, created) = request(
            &context,
            post_json(
                "/api/rooms",
                json!({"name": "Study Group", "username": "Alice"}),
            ),
        )
        .await;

        let room_id = created["roomId"].as_str().unwrap().to_string();
        let user_id = created["userId"].as_str().unwrap().to_string();

        let join = |username: &str, user_id: Option<String>| {
            let connection_id = ConnectionId::new();
            context
                .collab
                .rooms
                .join(JoinRequest {
                    room_id: room_id.clone(),
                    connection_id,
                    username: username.to_string(),
                    user_id,
                    password: None,
                })
                .unwrap();

            connection_id
        };

        let bob = join("Bob", None);
        let alice = join("Alice", Some(user_id));

        let room = context.collab.rooms.room(&room_id).unwrap();
        assert_eq!(room.host(), Some(alice));
        assert_ne!(room.host(), Some(bob));

        let members: Vec<_> = room.members().into_iter().map(|m| m.username).collect();
        assert_eq!(members, vec!["Bob", "Alice"]);
    }
}
