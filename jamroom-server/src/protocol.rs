//! The messages clients send over the gateway.
//!
//! Every message is a JSON object with a kebab-case `type` tag and camelCase
//! fields. Positions are seconds and must not be negative. A message that
//! fails to decode or validate is answered with an `error` event.

use jamroom_collab::{ConnectionId, QueueItemId};
use serde::Deserialize;
use validator::Validate;

use crate::relay::RelayError;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(JoinRoomPayload),
    LeaveRoom,
    PlayTrack(PlayPayload),
    PauseTrack(PausePayload),
    StopTrack,
    SeekTrack(SeekPayload),
    ChangeVolume(VolumePayload),
    LoadTrack(TrackPayload),
    NextTrack,
    AddToQueue(TrackPayload),
    RemoveFromQueue(QueueItemPayload),
    SyncTime,
    RequestHost,
    AcceptHostTransfer(MemberPayload),
    RejectHostTransfer(MemberPayload),
    TransferHost(MemberPayload),
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    #[validate(length(min = 1, max = 64))]
    pub room_id: String,
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 1, max = 64))]
    pub user_id: Option<String>,
    #[validate(length(max = 128))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlayPayload {
    /// File name of the track to switch to, keeps the current one if absent
    #[validate(length(min = 1, max = 255))]
    pub track: Option<String>,
    #[validate(range(min = 0.0))]
    pub position: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PausePayload {
    #[validate(range(min = 0.0))]
    pub position: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeekPayload {
    #[validate(range(min = 0.0))]
    pub position: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VolumePayload {
    #[validate(range(min = 0.0, max = 1.0))]
    pub volume: f32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackPayload {
    #[validate(length(min = 1, max = 255))]
    pub track: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemPayload {
    pub item_id: QueueItemId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberPayload {
    pub connection_id: ConnectionId,
}

impl ClientMessage {
    /// Parses and validates a raw text frame
    pub fn decode(text: &str) -> Result<Self, RelayError> {
        let message: Self = serde_json::from_str(text)?;
        message.validate()?;

        Ok(message)
    }

    /// The wire name of the message, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "join-room",
            Self::LeaveRoom => "leave-room",
            Self::PlayTrack(_) => "play-track",
            Self::PauseTrack(_) => "pause-track",
            Self::StopTrack => "stop-track",
            Self::SeekTrack(_) => "seek-track",
            Self::ChangeVolume(_) => "change-volume",
            Self::LoadTrack(_) => "load-track",
            Self::NextTrack => "next-track",
            Self::AddToQueue(_) => "add-to-queue",
            Self::RemoveFromQueue(_) => "remove-from-queue",
            Self::SyncTime => "sync-time",
            Self::RequestHost => "request-host",
            Self::AcceptHostTransfer(_) => "accept-host-transfer",
            Self::RejectHostTransfer(_) => "reject-host-transfer",
            Self::TransferHost(_) => "transfer-host",
        }
    }

    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Self::JoinRoom(p) => p.validate(),
            Self::PlayTrack(p) => p.validate(),
            Self::PauseTrack(p) => p.validate(),
            Self::SeekTrack(p) => p.validate(),
            Self::ChangeVolume(p) => p.validate(),
            Self::LoadTrack(p) | Self::AddToQueue(p) => p.validate(),
            Self::RemoveFromQueue(p) => p.validate(),
            Self::AcceptHostTransfer(p) | Self::RejectHostTransfer(p) | Self::TransferHost(p) => {
                p.validate()
            }
            Self::LeaveRoom
            | Self::StopTrack
            | Self::NextTrack
            | Self::SyncTime
            | Self::RequestHost => Ok(()),
        }
    }
}
