//! All schemas that are exposed from endpoints and the gateway are defined here
//! along with the ToSerialized impls

use std::sync::Arc;

use jamroom_collab::{
    ConnectionId, DenialReason as CollabDenialReason, Member, QueueItem as CollabQueueItem,
    Room as CollabRoom, RoomSnapshot, RoomSummary as CollabRoomSummary,
};
use jamroom_core::{Config, PlaybackSnapshot, PlaybackState, ReconnectPolicy, TrackRef};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    filename: String,
    name: String,
    size: u64,
    url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomMember {
    #[schema(value_type = u64)]
    connection_id: ConnectionId,
    user_id: String,
    username: String,
    /// RFC 3339 timestamp
    joined_at: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Playback {
    track: Option<Track>,
    /// One of `playing`, `paused`, `stopped`
    #[schema(value_type = String)]
    state: PlaybackState,
    /// The offset in seconds when the message was created
    position: f64,
    volume: f32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    #[schema(value_type = u64)]
    id: jamroom_collab::QueueItemId,
    track: Track,
    added_by: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: String,
    name: String,
    has_password: bool,
    persistent: bool,
    members: Vec<RoomMember>,
    #[schema(value_type = Option<u64>)]
    host: Option<ConnectionId>,
    playback: Playback,
    history: Vec<QueueItem>,
    queue: Vec<QueueItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    id: String,
    name: String,
    member_count: usize,
    #[schema(value_type = String)]
    state: PlaybackState,
    track: Option<Track>,
    has_password: bool,
}

/// Returned when a room is created over HTTP
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    pub room_id: String,
    /// Pass this when joining to keep the same identity
    pub user_id: String,
    pub room: Room,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    pub status: String,
    pub rooms: usize,
    pub users: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reconnect {
    initial_delay_in_seconds: f64,
    multiplier: f64,
    max_delay_in_seconds: f64,
    max_attempts: u32,
    /// Every delay before giving up, in seconds
    schedule_in_seconds: Vec<f64>,
}

/// The rules browser clients synchronize and reconnect by
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    drift_tolerance_in_seconds: f64,
    sync_interval_in_seconds: f64,
    host_request_timeout_in_seconds: f64,
    reconnect: Reconnect,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DenialReason {
    Rejected,
    Expired,
    Superseded,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl<I, O> ToSerialized<Option<O>> for Option<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Option<O> {
        self.as_ref().map(|x| x.to_serialized())
    }
}

impl ToSerialized<Track> for TrackRef {
    fn to_serialized(&self) -> Track {
        Track {
            filename: self.filename.clone(),
            name: self.name.clone(),
            size: self.size,
            url: self.url.clone(),
        }
    }
}

impl ToSerialized<RoomMember> for Member {
    fn to_serialized(&self) -> RoomMember {
        RoomMember {
            connection_id: self.connection_id,
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            joined_at: self.joined_at.to_rfc3339(),
        }
    }
}

impl ToSerialized<Playback> for PlaybackSnapshot {
    fn to_serialized(&self) -> Playback {
        Playback {
            track: self.track.to_serialized(),
            state: self.state,
            position: self.position,
            volume: self.volume,
        }
    }
}

impl ToSerialized<QueueItem> for CollabQueueItem {
    fn to_serialized(&self) -> QueueItem {
        QueueItem {
            id: self.id,
            track: self.track.to_serialized(),
            added_by: self.added_by.clone(),
        }
    }
}

impl ToSerialized<Room> for RoomSnapshot {
    fn to_serialized(&self) -> Room {
        Room {
            id: self.id.clone(),
            name: self.name.clone(),
            has_password: self.has_password,
            persistent: self.persistent,
            members: self.members.to_serialized(),
            host: self.host,
            playback: self.playback.to_serialized(),
            history: self.history.to_serialized(),
            queue: self.queue.to_serialized(),
        }
    }
}

impl ToSerialized<Room> for Arc<CollabRoom> {
    fn to_serialized(&self) -> Room {
        self.snapshot().to_serialized()
    }
}

impl ToSerialized<RoomSummary> for CollabRoomSummary {
    fn to_serialized(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            member_count: self.member_count,
            state: self.state,
            track: self.track.to_serialized(),
            has_password: self.has_password,
        }
    }
}

impl ToSerialized<Reconnect> for ReconnectPolicy {
    fn to_serialized(&self) -> Reconnect {
        Reconnect {
            initial_delay_in_seconds: self.initial_delay_in_seconds,
            multiplier: self.multiplier,
            max_delay_in_seconds: self.max_delay_in_seconds,
            max_attempts: self.max_attempts,
            schedule_in_seconds: self.schedule().iter().map(|d| d.as_secs_f64()).collect(),
        }
    }
}

impl ToSerialized<ClientConfig> for Config {
    fn to_serialized(&self) -> ClientConfig {
        ClientConfig {
            drift_tolerance_in_seconds: self.drift_tolerance_in_seconds,
            sync_interval_in_seconds: self.sync_interval_in_seconds,
            host_request_timeout_in_seconds: self.host_request_timeout_in_seconds,
            reconnect: self.reconnect.to_serialized(),
        }
    }
}

impl ToSerialized<DenialReason> for CollabDenialReason {
    fn to_serialized(&self) -> DenialReason {
        match self {
            CollabDenialReason::Rejected => DenialReason::Rejected,
            CollabDenialReason::Expired => DenialReason::Expired,
            CollabDenialReason::Superseded => DenialReason::Superseded,
        }
    }
}
