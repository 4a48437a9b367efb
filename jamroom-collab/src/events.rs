use crossbeam::channel::{Receiver, Sender};
use jamroom_core::PlaybackSnapshot;

use crate::{ConnectionId, Member, QueueItem, RoomId, RoomSnapshot};

pub type EventSender = Sender<Delivery>;
pub type EventReceiver = Receiver<Delivery>;

/// Events emitted by rooms, to be relayed to connected clients
#[derive(Debug, Clone)]
pub enum CollabEvent {
    /// The full state of a room, sent to a member that just joined.
    RoomState { snapshot: RoomSnapshot },
    /// A new member joined a room
    UserJoined { room_id: RoomId, member: Member },
    /// A member left a room or disconnected
    UserLeft { room_id: RoomId, member: Member },
    /// The member list of a room changed
    UsersUpdated {
        room_id: RoomId,
        members: Vec<Member>,
        host: Option<ConnectionId>,
    },
    /// The authoritative playback state changed
    PlaybackUpdated {
        room_id: RoomId,
        playback: PlaybackSnapshot,
        /// The connection that caused the change
        by: ConnectionId,
    },
    /// A queue was modified and updated
    QueueUpdated {
        room_id: RoomId,
        history: Vec<QueueItem>,
        items: Vec<QueueItem>,
    },
    /// The current playback state, resent on request without changes
    SyncTime {
        room_id: RoomId,
        playback: PlaybackSnapshot,
    },
    /// A member asks the host to hand over control
    HostRequested { room_id: RoomId, requester: Member },
    /// The host pointer of a room moved
    HostChanged { room_id: RoomId, host: Member },
    /// A host request did not go through
    HostRequestDenied {
        room_id: RoomId,
        reason: DenialReason,
    },
}

/// Why a host request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The host said no
    Rejected,
    /// The host did not answer in time
    Expired,
    /// Someone else became host, or the host left
    Superseded,
}

/// An event addressed to an explicit list of connections.
///
/// Recipients are resolved when the event is emitted, so membership changes
/// that happen later do not affect who receives it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event: CollabEvent,
    pub recipients: Vec<ConnectionId>,
}

impl CollabEvent {
    /// Returns the room this event belongs to
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::RoomState { snapshot } => &snapshot.id,
            Self::UserJoined { room_id, .. }
            | Self::UserLeft { room_id, .. }
            | Self::UsersUpdated { room_id, .. }
            | Self::PlaybackUpdated { room_id, .. }
            | Self::QueueUpdated { room_id, .. }
            | Self::SyncTime { room_id, .. }
            | Self::HostRequested { room_id, .. }
            | Self::HostChanged { room_id, .. }
            | Self::HostRequestDenied { room_id, .. } => room_id,
        }
    }
}
