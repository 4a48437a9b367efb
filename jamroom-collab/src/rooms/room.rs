use std::time::{Duration, Instant};

use jamroom_core::{Playback, PlaybackSnapshot, PlaybackState, TrackRef};
use log::info;
use parking_lot::{Mutex, MutexGuard};

use crate::{
    events::{CollabEvent, DenialReason, Delivery},
    CollabContext, LinearQueue, QueueItem, QueueItemId,
};

use super::{ConnectionId, Member, RoomError};

pub type RoomId = String;

/// A room: a set of members listening to one shared playback state.
///
/// All mutable state lives behind a single mutex. Every operation locks it,
/// mutates, emits its events, and unlocks, so operations on one room are
/// applied one at a time and their events leave in the same order.
pub struct Room {
    pub id: RoomId,
    context: CollabContext,
    /// Argon2 hash of the room password, if any
    password: Option<String>,
    /// Persistent rooms are never deleted
    persistent: bool,
    created_at: Instant,
    state: Mutex<RoomState>,
}

struct RoomState {
    name: String,
    /// Members in join order
    members: Vec<Member>,
    host: Option<ConnectionId>,
    playback: Playback,
    queue: LinearQueue,
    host_requests: Vec<HostRequest>,
    /// User id of the creator, who takes host when joining
    reserved_for: Option<String>,
    /// Set once the first member joins
    ever_joined: bool,
    /// Set when the room is removed from the registry
    closed: bool,
}

#[derive(Debug, Clone)]
struct HostRequest {
    requester: ConnectionId,
    requested_at: Instant,
}

/// A point-in-time copy of a room's state
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub name: String,
    pub has_password: bool,
    pub persistent: bool,
    pub members: Vec<Member>,
    pub host: Option<ConnectionId>,
    pub playback: PlaybackSnapshot,
    pub history: Vec<QueueItem>,
    pub queue: Vec<QueueItem>,
}

/// A short description of a room, used for listings
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub member_count: usize,
    pub state: PlaybackState,
    pub track: Option<TrackRef>,
    pub has_password: bool,
}

/// A host-only change to the authoritative playback state
#[derive(Debug, Clone)]
pub enum PlaybackAction {
    Play {
        track: Option<TrackRef>,
        position: Option<f64>,
    },
    Pause {
        position: Option<f64>,
    },
    Stop,
    Seek {
        position: f64,
    },
    Volume {
        volume: f32,
    },
    Load {
        track: TrackRef,
    },
    /// Plays the next item of the queue from the start
    Next,
}

/// What happened to the room after a member left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Remaining,
    Deleted,
}

/// Outcome of a join attempt
pub(super) enum JoinOutcome {
    Joined(RoomSnapshot),
    /// The room was deleted while the join was in flight
    Closed,
}

impl Room {
    pub fn new(
        context: &CollabContext,
        id: RoomId,
        name: String,
        password: Option<String>,
        persistent: bool,
    ) -> Self {
        Self::with_owner(context, id, name, password, persistent, None)
    }

    /// Creates a room whose host role is held for the member with the `owner`
    /// user id until they join or the empty room TTL passes.
    pub fn with_owner(
        context: &CollabContext,
        id: RoomId,
        name: String,
        password: Option<String>,
        persistent: bool,
        owner: Option<String>,
    ) -> Self {
        Self {
            id,
            context: context.clone(),
            password,
            persistent,
            created_at: Instant::now(),
            state: Mutex::new(RoomState {
                name,
                members: vec![],
                host: None,
                playback: Playback::new(),
                queue: LinearQueue::default(),
                host_requests: vec![],
                reserved_for: owner,
                ever_joined: false,
                closed: false,
            }),
        }
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub(super) fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Checks the given password against the room password, if there is one
    pub fn verify_password(&self, password: Option<&str>) -> Result<(), RoomError> {
        let Some(hash) = &self.password else {
            return Ok(());
        };

        let password = password.ok_or(RoomError::InvalidPassword)?;

        self.context
            .auth
            .verify_password(password, hash)
            .map_err(|_| RoomError::InvalidPassword)
    }

    pub(super) fn join(&self, member: Member) -> JoinOutcome {
        let mut state = self.state.lock();

        if state.closed {
            return JoinOutcome::Closed;
        }

        let connection = member.connection_id;

        if state.member(connection).is_none() {
            info!("{} joined room {}", member.username, state.name);

            self.release_stale_reservation(&mut state, Instant::now());

            let is_owner = state.reserved_for.as_deref() == Some(member.user_id.as_str());
            let may_take_host = state.reserved_for.is_none() || is_owner;

            state.members.push(member.clone());
            state.ever_joined = true;

            self.emit(
                CollabEvent::UserJoined {
                    room_id: self.id.clone(),
                    member,
                },
                state.others(connection),
            );

            if is_owner {
                state.reserved_for = None;
            }

            // The owner, or else the first member of a hostless room, takes control
            if is_owner && state.host != Some(connection) {
                self.move_host(&mut state, Some(connection));
            } else if may_take_host && state.host.is_none() {
                state.host = Some(connection);
            }
        }

        let snapshot = self.snapshot_locked(&state);

        self.emit(
            CollabEvent::RoomState {
                snapshot: snapshot.clone(),
            },
            vec![connection],
        );
        self.emit_users_updated(&state);

        JoinOutcome::Joined(snapshot)
    }

    /// Removes a member. Deletes the room if it is now empty and not persistent.
    pub(super) fn leave(&self, connection: ConnectionId) -> Result<LeaveOutcome, RoomError> {
        let mut state = self.state.lock();

        let index = state
            .members
            .iter()
            .position(|m| m.connection_id == connection)
            .ok_or(RoomError::NotInRoom)?;

        let member = state.members.remove(index);
        state.host_requests.retain(|r| r.requester != connection);

        info!("{} left room {}", member.username, state.name);

        if state.members.is_empty() && !self.persistent {
            state.closed = true;
            self.context.rooms.remove(&self.id);

            info!("Room {} is empty and was deleted", state.name);
            return Ok(LeaveOutcome::Deleted);
        }

        let recipients = state.everyone();

        self.emit(
            CollabEvent::UserLeft {
                room_id: self.id.clone(),
                member,
            },
            recipients,
        );

        if state.host == Some(connection) {
            // Hand control to whoever has been here the longest
            let successor = state.members.first().map(|m| m.connection_id);
            self.move_host(&mut state, successor);
        }

        self.emit_users_updated(&state);
        Ok(LeaveOutcome::Remaining)
    }

    /// Applies a host-only playback change and echoes it to every member
    pub fn control(
        &self,
        connection: ConnectionId,
        action: PlaybackAction,
    ) -> Result<PlaybackSnapshot, RoomError> {
        let mut state = self.state.lock();
        state.ensure_host(connection)?;

        let queue_changed = matches!(action, PlaybackAction::Next);

        match action {
            PlaybackAction::Play { track, position } => state.playback.play(track, position)?,
            PlaybackAction::Pause { position } => state.playback.pause(position)?,
            PlaybackAction::Stop => state.playback.stop(),
            PlaybackAction::Seek { position } => state.playback.seek(position)?,
            PlaybackAction::Volume { volume } => state.playback.set_volume(volume)?,
            PlaybackAction::Load { track } => state.playback.load(track),
            PlaybackAction::Next => {
                let item = state.queue.next().ok_or(RoomError::QueueEmpty)?;
                state.playback.play(Some(item.track), Some(0.))?;
            }
        }

        if queue_changed {
            self.emit_queue_updated(&state);
        }

        let playback = state.playback.snapshot();

        self.emit(
            CollabEvent::PlaybackUpdated {
                room_id: self.id.clone(),
                playback: playback.clone(),
                by: connection,
            },
            state.everyone(),
        );

        Ok(playback)
    }

    /// Adds a track to the end of the queue. Any member may do this.
    pub fn enqueue(&self, connection: ConnectionId, track: TrackRef) -> Result<QueueItem, RoomError> {
        let mut state = self.state.lock();
        let member = state.ensure_member(connection)?.clone();

        let item = state.queue.push(track, member.username);
        self.emit_queue_updated(&state);

        Ok(item)
    }

    /// Removes an upcoming item from the queue. Only the host may do this.
    pub fn dequeue(
        &self,
        connection: ConnectionId,
        item_id: QueueItemId,
    ) -> Result<QueueItem, RoomError> {
        let mut state = self.state.lock();
        state.ensure_host(connection)?;

        let item = state
            .queue
            .remove(item_id)
            .ok_or(RoomError::QueueItemNotFound)?;

        self.emit_queue_updated(&state);
        Ok(item)
    }

    /// Resends the authoritative playback state to the requester only
    pub fn sync(&self, connection: ConnectionId) -> Result<PlaybackSnapshot, RoomError> {
        let state = self.state.lock();
        state.ensure_member(connection)?;

        let playback = state.playback.snapshot();

        self.emit(
            CollabEvent::SyncTime {
                room_id: self.id.clone(),
                playback: playback.clone(),
            },
            vec![connection],
        );

        Ok(playback)
    }

    /// Asks the current host to hand over control
    pub fn request_host(&self, connection: ConnectionId) -> Result<(), RoomError> {
        let mut state = self.state.lock();
        let requester = state.ensure_member(connection)?.clone();

        self.release_stale_reservation(&mut state, Instant::now());
        if state.host.is_none() && state.reserved_for.is_some() {
            return Err(RoomError::HostReserved);
        }

        let Some(host) = state.host else {
            // Nobody to ask, so the requester simply takes over
            self.move_host(&mut state, Some(connection));
            return Ok(());
        };

        if host == connection {
            return Err(RoomError::AlreadyHost);
        }

        if state.host_requests.iter().any(|r| r.requester == connection) {
            return Err(RoomError::HostRequestPending);
        }

        state.host_requests.push(HostRequest {
            requester: connection,
            requested_at: Instant::now(),
        });

        info!("{} asked for host in room {}", requester.username, state.name);

        self.emit(
            CollabEvent::HostRequested {
                room_id: self.id.clone(),
                requester,
            },
            vec![host],
        );

        Ok(())
    }

    /// The host accepts a pending request. Everybody learns about the new host.
    pub fn accept_host_transfer(
        &self,
        connection: ConnectionId,
        requester: ConnectionId,
    ) -> Result<(), RoomError> {
        let mut state = self.state.lock();
        state.ensure_host(connection)?;
        state.take_request(requester)?;

        if state.member(requester).is_none() {
            return Err(RoomError::MemberNotFound);
        }

        self.move_host(&mut state, Some(requester));
        Ok(())
    }

    /// The host rejects a pending request. Only the requester is told.
    pub fn reject_host_transfer(
        &self,
        connection: ConnectionId,
        requester: ConnectionId,
    ) -> Result<(), RoomError> {
        let mut state = self.state.lock();
        state.ensure_host(connection)?;
        state.take_request(requester)?;

        self.emit(
            CollabEvent::HostRequestDenied {
                room_id: self.id.clone(),
                reason: DenialReason::Rejected,
            },
            vec![requester],
        );

        Ok(())
    }

    /// The host hands control to another member directly
    pub fn transfer_host(
        &self,
        connection: ConnectionId,
        target: ConnectionId,
    ) -> Result<(), RoomError> {
        let mut state = self.state.lock();
        state.ensure_host(connection)?;

        if target == connection {
            return Err(RoomError::AlreadyHost);
        }

        if state.member(target).is_none() {
            return Err(RoomError::MemberNotFound);
        }

        self.move_host(&mut state, Some(target));
        Ok(())
    }

    /// Drops host requests older than the timeout and tells their requesters
    pub fn expire_host_requests(&self, now: Instant, timeout: Duration) {
        let mut state = self.state.lock();

        let (expired, pending): (Vec<_>, Vec<_>) = state
            .host_requests
            .drain(..)
            .partition(|r| now.saturating_duration_since(r.requested_at) >= timeout);

        state.host_requests = pending;

        for request in expired {
            self.emit(
                CollabEvent::HostRequestDenied {
                    room_id: self.id.clone(),
                    reason: DenialReason::Expired,
                },
                vec![request.requester],
            );
        }
    }

    /// Gives up the owner's claim on the host role once the empty room TTL
    /// has passed, promoting the longest member of a hostless room.
    pub fn expire_reservation(&self, now: Instant) {
        let mut state = self.state.lock();
        self.release_stale_reservation(&mut state, now);
    }

    fn release_stale_reservation(&self, state: &mut MutexGuard<'_, RoomState>, now: Instant) {
        let ttl = self.context.config.empty_room_ttl();

        if state.reserved_for.is_none() || now.saturating_duration_since(self.created_at) < ttl {
            return;
        }

        state.reserved_for = None;
        info!("Host reservation of room {} expired", state.name);

        if state.host.is_none() {
            let successor = state.members.first().map(|m| m.connection_id);
            self.move_host(state, successor);
        }
    }

    /// Closes the room if nobody ever joined it and it is older than `ttl`.
    /// Returns true if the room was closed.
    pub(super) fn close_if_abandoned(&self, now: Instant, ttl: Duration) -> bool {
        let mut state = self.state.lock();

        let abandoned = !self.persistent
            && !state.ever_joined
            && state.members.is_empty()
            && now.saturating_duration_since(self.created_at) >= ttl;

        if abandoned {
            state.closed = true;
        }

        abandoned
    }

    pub fn host(&self) -> Option<ConnectionId> {
        self.state.lock().host
    }

    pub fn members(&self) -> Vec<Member> {
        self.state.lock().members.clone()
    }

    pub fn member_count(&self) -> usize {
        self.state.lock().members.len()
    }

    pub fn name(&self) -> String {
        self.state.lock().name.clone()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let state = self.state.lock();
        self.snapshot_locked(&state)
    }

    pub fn summary(&self) -> RoomSummary {
        let state = self.state.lock();

        RoomSummary {
            id: self.id.clone(),
            name: state.name.clone(),
            member_count: state.members.len(),
            state: state.playback.state(),
            track: state.playback.track().cloned(),
            has_password: self.has_password(),
        }
    }

    fn snapshot_locked(&self, state: &MutexGuard<'_, RoomState>) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            name: state.name.clone(),
            has_password: self.has_password(),
            persistent: self.persistent,
            members: state.members.clone(),
            host: state.host,
            playback: state.playback.snapshot(),
            history: state.queue.history(),
            queue: state.queue.items(),
        }
    }

    /// Points the host at a new member, drops every pending request, and
    /// tells the room. Requesters other than the new host are told their
    /// request is void.
    fn move_host(&self, state: &mut MutexGuard<'_, RoomState>, new_host: Option<ConnectionId>) {
        state.host = new_host;

        let stale: Vec<_> = state
            .host_requests
            .drain(..)
            .map(|r| r.requester)
            .filter(|r| Some(*r) != new_host)
            .collect();

        for requester in stale {
            self.emit(
                CollabEvent::HostRequestDenied {
                    room_id: self.id.clone(),
                    reason: DenialReason::Superseded,
                },
                vec![requester],
            );
        }

        let Some(host) = new_host.and_then(|h| state.member(h).cloned()) else {
            return;
        };

        info!("{} is now the host of room {}", host.username, state.name);

        self.emit(
            CollabEvent::HostChanged {
                room_id: self.id.clone(),
                host,
            },
            state.everyone(),
        );
    }

    fn emit_users_updated(&self, state: &MutexGuard<'_, RoomState>) {
        self.emit(
            CollabEvent::UsersUpdated {
                room_id: self.id.clone(),
                members: state.members.clone(),
                host: state.host,
            },
            state.everyone(),
        );
    }

    fn emit_queue_updated(&self, state: &MutexGuard<'_, RoomState>) {
        self.emit(
            CollabEvent::QueueUpdated {
                room_id: self.id.clone(),
                history: state.queue.history(),
                items: state.queue.items(),
            },
            state.everyone(),
        );
    }

    fn emit(&self, event: CollabEvent, recipients: Vec<ConnectionId>) {
        if recipients.is_empty() {
            return;
        }

        self.context.emit(Delivery { event, recipients });
    }
}

impl RoomState {
    fn member(&self, connection: ConnectionId) -> Option<&Member> {
        self.members.iter().find(|m| m.connection_id == connection)
    }

    fn ensure_member(&self, connection: ConnectionId) -> Result<&Member, RoomError> {
        self.member(connection).ok_or(RoomError::NotInRoom)
    }

    fn ensure_host(&self, connection: ConnectionId) -> Result<(), RoomError> {
        self.ensure_member(connection)?;

        if self.host == Some(connection) {
            Ok(())
        } else {
            Err(RoomError::NotHost)
        }
    }

    fn take_request(&mut self, requester: ConnectionId) -> Result<HostRequest, RoomError> {
        let index = self
            .host_requests
            .iter()
            .position(|r| r.requester == requester)
            .ok_or(RoomError::NoHostRequest)?;

        Ok(self.host_requests.remove(index))
    }

    fn everyone(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id).collect()
    }

    fn others(&self, connection: ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .map(|m| m.connection_id)
            .filter(|c| *c != connection)
            .collect()
    }
}
