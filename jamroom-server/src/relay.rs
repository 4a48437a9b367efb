use jamroom_collab::{ConnectionId, JoinRequest, LibraryError, PlaybackAction, RoomError};
use jamroom_core::TrackRef;
use log::debug;
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};
use validator::ValidationErrors;

use crate::{
    context::ServerContext,
    errors::ErrorKind,
    events::ServerEvent,
    protocol::{ClientMessage, PlayPayload},
};

/// A gateway message that could not be handled.
///
/// Relay errors only ever reach the connection that caused them.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Message could not be read: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Message is invalid: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("Message handling was interrupted: {0}")]
    Interrupted(#[from] JoinError),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed(_) | Self::Invalid(_) => ErrorKind::Validation,
            Self::Room(e) => e.into(),
            Self::Library(e) => e.into(),
            Self::Interrupted(_) => ErrorKind::Internal,
        }
    }
}

impl From<&RelayError> for ServerEvent {
    fn from(value: &RelayError) -> Self {
        Self::Error {
            kind: value.kind(),
            message: value.to_string(),
        }
    }
}

/// Handles one text frame from a connection.
///
/// Effects on the room reach members through collab events. Failures are
/// answered with an `error` event to the sender only.
pub async fn process(context: &ServerContext, connection: ConnectionId, text: &str) {
    if let Err(error) = handle(context, connection, text).await {
        debug!("Message from connection {} failed: {}", connection, error);
        context.gateway.send(connection, (&error).into());
    }
}

async fn handle(
    context: &ServerContext,
    connection: ConnectionId,
    text: &str,
) -> Result<(), RelayError> {
    let message = ClientMessage::decode(text)?;
    debug!("Connection {} sent {}", connection, message.name());

    let rooms = &context.collab.rooms;

    match message {
        ClientMessage::JoinRoom(payload) => {
            let request = JoinRequest {
                room_id: payload.room_id,
                connection_id: connection,
                username: payload.username,
                user_id: payload.user_id,
                password: payload.password,
            };

            // Room passwords are hashed and checked with Argon2, keep that off the runtime
            let collab = context.collab.clone();
            spawn_blocking(move || collab.rooms.join(request)).await??;
        }
        ClientMessage::LeaveRoom => {
            rooms.leave(connection)?;
        }
        ClientMessage::PlayTrack(PlayPayload { track, position }) => {
            let track = match track {
                Some(filename) => Some(resolve_track(context, &filename).await?),
                None => None,
            };

            rooms.control(connection, PlaybackAction::Play { track, position })?;
        }
        ClientMessage::PauseTrack(payload) => {
            rooms.control(
                connection,
                PlaybackAction::Pause {
                    position: payload.position,
                },
            )?;
        }
        ClientMessage::StopTrack => {
            rooms.control(connection, PlaybackAction::Stop)?;
        }
        ClientMessage::SeekTrack(payload) => {
            rooms.control(
                connection,
                PlaybackAction::Seek {
                    position: payload.position,
                },
            )?;
        }
        ClientMessage::ChangeVolume(payload) => {
            rooms.control(
                connection,
                PlaybackAction::Volume {
                    volume: payload.volume,
                },
            )?;
        }
        ClientMessage::LoadTrack(payload) => {
            let track = resolve_track(context, &payload.track).await?;
            rooms.control(connection, PlaybackAction::Load { track })?;
        }
        ClientMessage::NextTrack => {
            rooms.control(connection, PlaybackAction::Next)?;
        }
        ClientMessage::AddToQueue(payload) => {
            let track = resolve_track(context, &payload.track).await?;
            rooms.enqueue(connection, track)?;
        }
        ClientMessage::RemoveFromQueue(payload) => {
            rooms.dequeue(connection, payload.item_id)?;
        }
        ClientMessage::SyncTime => {
            rooms.sync(connection)?;
        }
        ClientMessage::RequestHost => {
            rooms.request_host(connection)?;
        }
        ClientMessage::AcceptHostTransfer(payload) => {
            rooms.accept_host_transfer(connection, payload.connection_id)?;
        }
        ClientMessage::RejectHostTransfer(payload) => {
            rooms.reject_host_transfer(connection, payload.connection_id)?;
        }
        ClientMessage::TransferHost(payload) => {
            rooms.transfer_host(connection, payload.connection_id)?;
        }
    }

    Ok(())
}

/// Looks a track up in the library. Runs before any room lock is taken.
async fn resolve_track(context: &ServerContext, filename: &str) -> Result<TrackRef, RelayError> {
    Ok(context.collab.library.track(filename).await?)
}
