use chrono::{DateTime, Utc};
use jamroom_core::Id;

/// A live client connection. Only used to type [ConnectionId].
pub struct Connection;

pub type ConnectionId = Id<Connection>;

/// Represents a connection's presence in a room
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub connection_id: ConnectionId,
    /// Stable identity chosen by the client, survives reconnects
    pub user_id: String,
    /// Display name, not guaranteed to be unique
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(connection_id: ConnectionId, user_id: String, username: String) -> Self {
        Self {
            connection_id,
            user_id,
            username,
            joined_at: Utc::now(),
        }
    }
}
