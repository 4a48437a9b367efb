use jamroom_collab::{CollabEvent, ConnectionId};
use jamroom_core::Config;
use serde::Serialize;

use crate::{
    errors::ErrorKind,
    serialized::{
        ClientConfig, DenialReason, Playback, QueueItem, Room, RoomMember, ToSerialized,
    },
};

/// Messages the server pushes to clients over the gateway
#[derive(Debug, Clone, Serialize)]
#[serde(
    rename_all = "kebab-case",
    rename_all_fields = "camelCase",
    tag = "type"
)]
pub enum ServerEvent {
    /// Sent once when a socket connects.
    Welcome {
        connection_id: ConnectionId,
        config: ClientConfig,
    },
    /// The full state of the room the client just joined.
    RoomState { room: Room },
    /// The member list of a room changed.
    UsersUpdated {
        room_id: String,
        users: Vec<RoomMember>,
        host: Option<ConnectionId>,
    },
    /// Someone joined the room.
    UserJoined { room_id: String, user: RoomMember },
    /// Someone left the room or disconnected.
    UserLeft { room_id: String, user: RoomMember },
    /// The host changed the authoritative playback state.
    PlaybackUpdated {
        room_id: String,
        playback: Playback,
        /// The connection that made the change
        by: ConnectionId,
    },
    /// A queue was modified and updated
    QueueUpdated {
        room_id: String,
        history: Vec<QueueItem>,
        items: Vec<QueueItem>,
    },
    /// The authoritative playback state, in answer to `sync-time`.
    SyncTime { room_id: String, playback: Playback },
    /// Sent to the host only.
    HostRequested {
        room_id: String,
        requester: RoomMember,
    },
    HostChanged { room_id: String, host: RoomMember },
    /// Sent to the requester only.
    HostRequestDenied {
        room_id: String,
        reason: DenialReason,
    },
    /// A message from this connection could not be handled.
    Error { kind: ErrorKind, message: String },
}

impl ServerEvent {
    pub fn welcome(connection_id: ConnectionId, config: &Config) -> Self {
        Self::Welcome {
            connection_id,
            config: config.to_serialized(),
        }
    }
}

impl From<CollabEvent> for ServerEvent {
    fn from(value: CollabEvent) -> Self {
        match value {
            CollabEvent::RoomState { snapshot } => Self::RoomState {
                room: snapshot.to_serialized(),
            },
            CollabEvent::UsersUpdated {
                room_id,
                members,
                host,
            } => Self::UsersUpdated {
                room_id,
                users: members.to_serialized(),
                host,
            },
            CollabEvent::UserJoined { room_id, member } => Self::UserJoined {
                room_id,
                user: member.to_serialized(),
            },
            CollabEvent::UserLeft { room_id, member } => Self::UserLeft {
                room_id,
                user: member.to_serialized(),
            },
            CollabEvent::PlaybackUpdated {
                room_id,
                playback,
                by,
            } => Self::PlaybackUpdated {
                room_id,
                playback: playback.to_serialized(),
                by,
            },
            CollabEvent::QueueUpdated {
                room_id,
                history,
                items,
            } => Self::QueueUpdated {
                room_id,
                history: history.to_serialized(),
                items: items.to_serialized(),
            },
            CollabEvent::SyncTime { room_id, playback } => Self::SyncTime {
                room_id,
                playback: playback.to_serialized(),
            },
            CollabEvent::HostRequested { room_id, requester } => Self::HostRequested {
                room_id,
                requester: requester.to_serialized(),
            },
            CollabEvent::HostChanged { room_id, host } => Self::HostChanged {
                room_id,
                host: host.to_serialized(),
            },
            CollabEvent::HostRequestDenied { room_id, reason } => Self::HostRequestDenied {
                room_id,
                reason: reason.to_serialized(),
            },
        }
    }
}
