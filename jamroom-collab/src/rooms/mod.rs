mod connection;
mod room;

use std::{sync::Arc, time::Instant};

use crate::{
    util::{is_valid_room_id, random_string},
    AuthError, CollabContext, QueueItem, QueueItemId,
};

pub use connection::*;
pub use room::*;

use jamroom_core::{PlaybackError, PlaybackSnapshot, TrackRef};
use log::{info, warn};
use thiserror::Error;

/// The process-wide room registry.
///
/// Rooms are looked up by id, connections by the room they are in. A
/// connection is a member of at most one room at a time.
pub struct RoomManager {
    context: CollabContext,
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room {0} does not exist")]
    RoomNotFound(RoomId),
    #[error("{0} is not a valid room id")]
    InvalidRoomId(String),
    #[error("Connection is not in a room")]
    NotInRoom,
    #[error("Only the host can do that")]
    NotHost,
    #[error("Already the host of this room")]
    AlreadyHost,
    #[error("Wrong room password")]
    InvalidPassword,
    #[error("The host role is held for the room's creator")]
    HostReserved,
    #[error("A host request is already pending")]
    HostRequestPending,
    #[error("There is no pending host request from that member")]
    NoHostRequest,
    #[error("Member is not in this room")]
    MemberNotFound,
    #[error("Queue item does not exist")]
    QueueItemNotFound,
    #[error("The queue is empty")]
    QueueEmpty,
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// A new room to create
#[derive(Debug)]
pub struct NewRoom {
    pub name: String,
    pub password: Option<String>,
    /// User id of the creator, who becomes host on joining
    pub owner: Option<String>,
}

/// A connection that wants to enter a room
#[derive(Debug)]
pub struct JoinRequest {
    pub room_id: RoomId,
    pub connection_id: ConnectionId,
    pub username: String,
    /// Generated when not supplied
    pub user_id: Option<String>,
    pub password: Option<String>,
}

/// How many rooms and connected users exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomCounts {
    pub rooms: usize,
    pub users: usize,
}

impl RoomManager {
    const ROOM_ID_LENGTH: usize = 8;
    const USER_ID_LENGTH: usize = 16;

    pub fn new(context: &CollabContext) -> Self {
        let manager = Self {
            context: context.clone(),
        };

        if let Some(id) = context.config.default_room.clone() {
            manager.ensure_default_room(id);
        }

        manager
    }

    fn ensure_default_room(&self, id: RoomId) {
        if !is_valid_room_id(&id) {
            warn!("Default room id {} is not valid, no default room is created", id);
            return;
        }

        let room = Room::new(&self.context, id.clone(), id.clone(), None, true);
        self.context.rooms.insert(id.clone(), Arc::new(room));

        info!("Default room {} is open", id);
    }

    /// Creates a new room with a random id
    pub fn create_room(&self, new_room: NewRoom) -> Result<Arc<Room>, RoomError> {
        let password = new_room
            .password
            .map(|p| self.context.auth.hash_password(&p))
            .transpose()?;

        loop {
            let id = random_string(Self::ROOM_ID_LENGTH);

            let entry = self.context.rooms.entry(id.clone());
            if let dashmap::mapref::entry::Entry::Vacant(vacant) = entry {
                let room = Arc::new(Room::with_owner(
                    &self.context,
                    id,
                    new_room.name.clone(),
                    password.clone(),
                    false,
                    new_room.owner.clone(),
                ));

                vacant.insert(room.clone());
                info!("Room {} created with id {}", new_room.name, room.id);

                return Ok(room);
            }
        }
    }

    /// Returns a room by id
    pub fn room(&self, id: &str) -> Result<Arc<Room>, RoomError> {
        self.context
            .rooms
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| RoomError::RoomNotFound(id.to_string()))
    }

    /// Returns the room a connection is in
    pub fn room_of(&self, connection: ConnectionId) -> Result<Arc<Room>, RoomError> {
        let room_id = self
            .context
            .connections
            .get(&connection)
            .map(|r| r.value().clone())
            .ok_or(RoomError::NotInRoom)?;

        self.room(&room_id).map_err(|_| RoomError::NotInRoom)
    }

    /// Adds a connection to a room, creating the room if it doesn't exist.
    ///
    /// A connection that is already in another room leaves that room first,
    /// but only once the new room has accepted it.
    pub fn join(&self, request: JoinRequest) -> Result<RoomSnapshot, RoomError> {
        if !is_valid_room_id(&request.room_id) {
            return Err(RoomError::InvalidRoomId(request.room_id));
        }

        let connection = request.connection_id;
        let password = request.password.as_deref();

        let target = self.get_or_create(&request.room_id, password)?;
        target.verify_password(password)?;

        let current = self
            .context
            .connections
            .get(&connection)
            .map(|r| r.value().clone());

        if let Some(current) = current {
            if current != request.room_id {
                self.leave(connection)?;
            }
        }

        let member = Member::new(
            connection,
            request
                .user_id
                .unwrap_or_else(|| random_string(Self::USER_ID_LENGTH)),
            request.username,
        );

        let mut room = target;

        loop {
            // Index first, so leaving works as soon as the join is visible
            self.context
                .connections
                .insert(connection, request.room_id.clone());

            match room.join(member.clone()) {
                JoinOutcome::Joined(snapshot) => return Ok(snapshot),
                JoinOutcome::Closed => {
                    // Deleted in between, so this join recreates it
                    room = self.get_or_create(&request.room_id, password)?;
                    room.verify_password(password)?;
                }
            }
        }
    }

    fn get_or_create(&self, id: &str, password: Option<&str>) -> Result<Arc<Room>, RoomError> {
        if let Ok(room) = self.room(id) {
            return Ok(room);
        }

        let password = password
            .map(|p| self.context.auth.hash_password(p))
            .transpose()?;

        let room = self
            .context
            .rooms
            .entry(id.to_string())
            .or_insert_with(|| {
                info!("Room {} created on first join", id);
                Arc::new(Room::new(
                    &self.context,
                    id.to_string(),
                    id.to_string(),
                    password,
                    false,
                ))
            })
            .value()
            .clone();

        Ok(room)
    }

    /// Removes a connection from its room
    pub fn leave(&self, connection: ConnectionId) -> Result<LeaveOutcome, RoomError> {
        let room = self.room_of(connection)?;
        self.context.connections.remove(&connection);

        room.leave(connection)
    }

    /// Called when a connection goes away. Does nothing if it was not in a room.
    pub fn disconnect(&self, connection: ConnectionId) {
        if let Ok(room) = self.room_of(connection) {
            let _ = room.leave(connection);
        }

        self.context.connections.remove(&connection);
    }

    pub fn control(
        &self,
        connection: ConnectionId,
        action: PlaybackAction,
    ) -> Result<PlaybackSnapshot, RoomError> {
        self.room_of(connection)?.control(connection, action)
    }

    pub fn enqueue(&self, connection: ConnectionId, track: TrackRef) -> Result<QueueItem, RoomError> {
        self.room_of(connection)?.enqueue(connection, track)
    }

    pub fn dequeue(
        &self,
        connection: ConnectionId,
        item_id: QueueItemId,
    ) -> Result<QueueItem, RoomError> {
        self.room_of(connection)?.dequeue(connection, item_id)
    }

    pub fn sync(&self, connection: ConnectionId) -> Result<PlaybackSnapshot, RoomError> {
        self.room_of(connection)?.sync(connection)
    }

    pub fn request_host(&self, connection: ConnectionId) -> Result<(), RoomError> {
        self.room_of(connection)?.request_host(connection)
    }

    pub fn accept_host_transfer(
        &self,
        connection: ConnectionId,
        requester: ConnectionId,
    ) -> Result<(), RoomError> {
        self.room_of(connection)?
            .accept_host_transfer(connection, requester)
    }

    pub fn reject_host_transfer(
        &self,
        connection: ConnectionId,
        requester: ConnectionId,
    ) -> Result<(), RoomError> {
        self.room_of(connection)?
            .reject_host_transfer(connection, requester)
    }

    pub fn transfer_host(
        &self,
        connection: ConnectionId,
        target: ConnectionId,
    ) -> Result<(), RoomError> {
        self.room_of(connection)?.transfer_host(connection, target)
    }

    /// Expires unanswered host requests and stale host reservations in every room
    pub fn expire_host_requests(&self, now: Instant) {
        let timeout = self.context.config.host_request_timeout();

        for room in self.list_all() {
            room.expire_host_requests(now, timeout);
            room.expire_reservation(now);
        }
    }

    /// Deletes rooms that were created but never joined
    pub fn prune_idle(&self, now: Instant) -> usize {
        let ttl = self.context.config.empty_room_ttl();
        let mut pruned = 0;

        for room in self.list_all() {
            if room.close_if_abandoned(now, ttl) {
                self.context
                    .rooms
                    .remove_if(&room.id, |_, r| Arc::ptr_eq(r, &room));

                info!("Room {} was never joined and was deleted", room.id);
                pruned += 1;
            }
        }

        pruned
    }

    /// Get all rooms in memory, oldest first
    pub fn list_all(&self) -> Vec<Arc<Room>> {
        let mut rooms: Vec<_> = self.context.rooms.iter().map(|r| r.clone()).collect();
        rooms.sort_by_key(|r| r.created_at());

        rooms
    }

    pub fn list(&self) -> Vec<RoomSummary> {
        self.list_all().iter().map(|r| r.summary()).collect()
    }

    pub fn counts(&self) -> RoomCounts {
        RoomCounts {
            rooms: self.context.rooms.len(),
            users: self.context.connections.len(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use jamroom_core::{Config, PlaybackState, TrackRef};

    use super::{JoinRequest, LeaveOutcome, NewRoom, PlaybackAction, RoomError};
    use crate::{
        Collab, CollabEvent, ConnectionId, DenialReason, Delivery, DirectoryLibrary, UploadPolicy,
    };

    fn create_collab(config: Config) -> Collab {
        let library = DirectoryLibrary::new(std::env::temp_dir(), UploadPolicy::default());
        Collab::new(config, library)
    }

    fn join(collab: &Collab, room_id: &str, username: &str) -> ConnectionId {
        let connection_id = ConnectionId::new();

        collab
            .rooms
            .join(JoinRequest {
                room_id: room_id.to_string(),
                connection_id,
                username: username.to_string(),
                user_id: None,
                password: None,
            })
            .unwrap();

        connection_id
    }

    fn received_by(deliveries: &[Delivery], connection: ConnectionId) -> Vec<&CollabEvent> {
        deliveries
            .iter()
            .filter(|d| d.recipients.contains(&connection))
            .map(|d| &d.event)
            .collect()
    }

    fn play(position: f64) -> PlaybackAction {
        PlaybackAction::Play {
            track: Some(TrackRef::new("song.mp3", 1)),
            position: Some(position),
        }
    }

    #[test]
    fn first_member_becomes_host() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");

        let room = collab.rooms.room("study-group").unwrap();
        assert_eq!(room.host(), Some(alice));
        assert_eq!(room.member_count(), 2);

        let snapshot = collab.rooms.room("study-group").unwrap().snapshot();
        assert_eq!(snapshot.host, Some(alice));
        assert!(snapshot.members.iter().any(|m| m.connection_id == bob));
    }

    #[test]
    fn joining_member_receives_the_room_state() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        collab.pending_events();

        let bob = join(&collab, "study-group", "Bob");
        let deliveries = collab.pending_events();

        let state = received_by(&deliveries, bob)
            .into_iter()
            .find_map(|e| match e {
                CollabEvent::RoomState { snapshot } => Some(snapshot),
                _ => None,
            })
            .expect("Bob gets the room state");

        let names: Vec<_> = state.members.iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(state.host, Some(alice));

        let to_alice = received_by(&deliveries, alice);
        assert!(to_alice
            .iter()
            .any(|e| matches!(e, CollabEvent::UserJoined { member, .. } if member.username == "Bob")));
        assert!(!to_alice
            .iter()
            .any(|e| matches!(e, CollabEvent::RoomState { .. })));
    }

    #[test]
    fn only_the_host_controls_playback() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");
        collab.pending_events();

        let result = collab.rooms.control(bob, play(12.));
        assert!(matches!(result, Err(RoomError::NotHost)));
        assert!(collab.pending_events().is_empty());

        let playback = collab.rooms.control(alice, play(12.)).unwrap();
        assert_eq!(playback.state, PlaybackState::Playing);

        let deliveries = collab.pending_events();
        for connection in [alice, bob] {
            assert!(received_by(&deliveries, connection)
                .iter()
                .any(|e| matches!(e, CollabEvent::PlaybackUpdated { by, .. } if *by == alice)));
        }
    }

    #[test]
    fn any_member_can_enqueue_but_only_the_host_skips() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");

        let item = collab
            .rooms
            .enqueue(bob, TrackRef::new("next.mp3", 1))
            .unwrap();
        assert_eq!(item.added_by, "Bob");

        assert!(matches!(
            collab.rooms.control(bob, PlaybackAction::Next),
            Err(RoomError::NotHost)
        ));

        let playback = collab.rooms.control(alice, PlaybackAction::Next).unwrap();
        assert_eq!(playback.track.unwrap().filename, "next.mp3");
        assert!(matches!(
            collab.rooms.control(alice, PlaybackAction::Next),
            Err(RoomError::QueueEmpty)
        ));
    }

    #[test]
    fn empty_rooms_are_deleted() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "lobby", "Bob");

        assert_eq!(collab.rooms.leave(alice).unwrap(), LeaveOutcome::Deleted);
        assert_eq!(collab.rooms.leave(bob).unwrap(), LeaveOutcome::Remaining);

        let ids: Vec<_> = collab.rooms.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["lobby"]);
        assert_eq!(collab.rooms.counts().users, 0);
    }

    #[test]
    fn host_leaving_promotes_the_longest_member() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");
        let carol = join(&collab, "study-group", "Carol");
        collab.pending_events();

        collab.rooms.disconnect(alice);

        let room = collab.rooms.room("study-group").unwrap();
        assert_eq!(room.host(), Some(bob));

        let deliveries = collab.pending_events();
        assert!(received_by(&deliveries, carol)
            .iter()
            .any(|e| matches!(e, CollabEvent::HostChanged { host, .. } if host.connection_id == bob)));
        assert!(received_by(&deliveries, alice).is_empty());
    }

    #[test]
    fn switching_rooms_leaves_the_previous_one() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "lobby", "Alice");
        collab
            .rooms
            .join(JoinRequest {
                room_id: "study-group".to_string(),
                connection_id: alice,
                username: "Alice".to_string(),
                user_id: None,
                password: None,
            })
            .unwrap();

        assert_eq!(collab.rooms.room("lobby").unwrap().member_count(), 0);
        assert_eq!(collab.rooms.room_of(alice).unwrap().id, "study-group");
        assert_eq!(collab.rooms.counts().users, 1);
    }

    #[test]
    fn host_requests_can_be_accepted() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");
        collab.pending_events();

        collab.rooms.request_host(bob).unwrap();
        assert!(matches!(
            collab.rooms.request_host(bob),
            Err(RoomError::HostRequestPending)
        ));

        let deliveries = collab.pending_events();
        assert!(received_by(&deliveries, alice)
            .iter()
            .any(|e| matches!(e, CollabEvent::HostRequested { requester, .. } if requester.connection_id == bob)));
        assert!(received_by(&deliveries, bob).is_empty());

        assert!(matches!(
            collab.rooms.accept_host_transfer(bob, bob),
            Err(RoomError::NotHost)
        ));
        collab.rooms.accept_host_transfer(alice, bob).unwrap();

        assert_eq!(collab.rooms.room_of(alice).unwrap().host(), Some(bob));
        assert!(matches!(
            collab.rooms.control(alice, PlaybackAction::Stop),
            Err(RoomError::NotHost)
        ));
    }

    #[test]
    fn rejected_host_requests_only_reach_the_requester() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");
        let carol = join(&collab, "study-group", "Carol");

        collab.rooms.request_host(bob).unwrap();
        collab.pending_events();

        collab.rooms.reject_host_transfer(alice, bob).unwrap();
        let deliveries = collab.pending_events();

        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].recipients, vec![bob]);
        assert!(matches!(
            deliveries[0].event,
            CollabEvent::HostRequestDenied {
                reason: DenialReason::Rejected,
                ..
            }
        ));

        assert!(matches!(
            collab.rooms.reject_host_transfer(alice, carol),
            Err(RoomError::NoHostRequest)
        ));
        assert_eq!(collab.rooms.room_of(alice).unwrap().host(), Some(alice));
    }

    #[test]
    fn host_requests_expire_and_are_superseded() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");
        let carol = join(&collab, "study-group", "Carol");

        collab.rooms.request_host(bob).unwrap();
        collab.pending_events();

        collab.rooms.expire_host_requests(Instant::now());
        assert!(collab.pending_events().is_empty());

        collab
            .rooms
            .expire_host_requests(Instant::now() + Duration::from_secs(31));
        let deliveries = collab.pending_events();
        assert!(matches!(
            received_by(&deliveries, bob).as_slice(),
            [CollabEvent::HostRequestDenied {
                reason: DenialReason::Expired,
                ..
            }]
        ));

        collab.rooms.request_host(bob).unwrap();
        collab.pending_events();

        collab.rooms.transfer_host(alice, carol).unwrap();
        let deliveries = collab.pending_events();
        assert!(received_by(&deliveries, bob).iter().any(|e| matches!(
            e,
            CollabEvent::HostRequestDenied {
                reason: DenialReason::Superseded,
                ..
            }
        )));
        assert_eq!(collab.rooms.room_of(bob).unwrap().host(), Some(carol));
    }

    #[test]
    fn password_rooms_reject_wrong_passwords() {
        let collab = create_collab(Config::default());

        let room = collab
            .rooms
            .create_room(NewRoom {
                name: "Study Group".to_string(),
                password: Some("hunter2".to_string()),
                owner: None,
            })
            .unwrap();

        let request = |password: Option<&str>| JoinRequest {
            room_id: room.id.clone(),
            connection_id: ConnectionId::new(),
            username: "Alice".to_string(),
            user_id: None,
            password: password.map(|p| p.to_string()),
        };

        assert!(matches!(
            collab.rooms.join(request(None)),
            Err(RoomError::InvalidPassword)
        ));
        assert!(matches!(
            collab.rooms.join(request(Some("hunter3"))),
            Err(RoomError::InvalidPassword)
        ));

        let snapshot = collab.rooms.join(request(Some("hunter2"))).unwrap();
        assert_eq!(snapshot.name, "Study Group");
        assert!(snapshot.has_password);
    }

    #[test]
    fn invalid_room_ids_are_rejected() {
        let collab = create_collab(Config::default());

        let result = collab.rooms.join(JoinRequest {
            room_id: "../etc".to_string(),
            connection_id: ConnectionId::new(),
            username: "Alice".to_string(),
            user_id: None,
            password: None,
        });

        assert!(matches!(result, Err(RoomError::InvalidRoomId(_))));
        assert!(collab.rooms.room("../etc").is_err());
    }

    #[test]
    fn rooms_nobody_joined_are_pruned() {
        let config = Config {
            default_room: None,
            ..Default::default()
        };
        let collab = create_collab(config);

        let abandoned = collab
            .rooms
            .create_room(NewRoom {
                name: "Nobody".to_string(),
                password: None,
                owner: None,
            })
            .unwrap();
        let used = collab
            .rooms
            .create_room(NewRoom {
                name: "Somebody".to_string(),
                password: None,
                owner: None,
            })
            .unwrap();
        join(&collab, &used.id, "Alice");

        assert_eq!(collab.rooms.prune_idle(Instant::now()), 0);

        let later = Instant::now() + Duration::from_secs(301);
        assert_eq!(collab.rooms.prune_idle(later), 1);
        assert!(collab.rooms.room(&abandoned.id).is_err());
        assert!(collab.rooms.room(&used.id).is_ok());
    }

    #[test]
    fn failed_joins_keep_the_current_room() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");

        let locked = collab
            .rooms
            .create_room(NewRoom {
                name: "Locked".to_string(),
                password: Some("pw".to_string()),
                owner: None,
            })
            .unwrap();
        collab.pending_events();

        let result = collab.rooms.join(JoinRequest {
            room_id: locked.id.clone(),
            connection_id: alice,
            username: "Alice".to_string(),
            user_id: None,
            password: Some("wrong".to_string()),
        });

        assert!(matches!(result, Err(RoomError::InvalidPassword)));
        assert_eq!(collab.rooms.room_of(alice).unwrap().id, "study-group");

        let room = collab.rooms.room("study-group").unwrap();
        assert_eq!(room.host(), Some(alice));
        assert_eq!(room.member_count(), 2);
        assert!(received_by(&collab.pending_events(), bob).is_empty());
    }

    #[test]
    fn joining_the_same_room_twice_changes_nothing() {
        let collab = create_collab(Config::default());

        let alice = join(&collab, "study-group", "Alice");
        let bob = join(&collab, "study-group", "Bob");

        let snapshot = collab
            .rooms
            .join(JoinRequest {
                room_id: "study-group".to_string(),
                connection_id: bob,
                username: "Bob".to_string(),
                user_id: None,
                password: None,
            })
            .unwrap();

        let names: Vec<_> = snapshot.members.iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(snapshot.host, Some(alice));
        assert_eq!(collab.rooms.counts().users, 2);
    }

    #[test]
    fn room_creators_become_host_when_they_join() {
        let collab = create_collab(Config::default());

        let room = collab
            .rooms
            .create_room(NewRoom {
                name: "Study Group".to_string(),
                password: None,
                owner: Some("alice-id".to_string()),
            })
            .unwrap();

        let bob = join(&collab, &room.id, "Bob");
        assert_eq!(room.host(), None);
        assert!(matches!(
            collab.rooms.request_host(bob),
            Err(RoomError::HostReserved)
        ));
        collab.pending_events();

        let alice = ConnectionId::new();
        let snapshot = collab
            .rooms
            .join(JoinRequest {
                room_id: room.id.clone(),
                connection_id: alice,
                username: "Alice".to_string(),
                user_id: Some("alice-id".to_string()),
                password: None,
            })
            .unwrap();

        assert_eq!(snapshot.host, Some(alice));
        assert_eq!(room.host(), Some(alice));

        let deliveries = collab.pending_events();
        assert!(received_by(&deliveries, bob)
            .iter()
            .any(|e| matches!(e, CollabEvent::HostChanged { host, .. } if host.connection_id == alice)));
    }

    #[test]
    fn host_reservations_expire() {
        let collab = create_collab(Config::default());

        let room = collab
            .rooms
            .create_room(NewRoom {
                name: "Study Group".to_string(),
                password: None,
                owner: Some("alice-id".to_string()),
            })
            .unwrap();

        let bob = join(&collab, &room.id, "Bob");

        collab.rooms.expire_host_requests(Instant::now());
        assert_eq!(room.host(), None);

        collab
            .rooms
            .expire_host_requests(Instant::now() + Duration::from_secs(301));
        assert_eq!(room.host(), Some(bob));
    }
}
