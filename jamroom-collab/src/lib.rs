mod auth;
mod events;
mod library;
mod queues;
mod rooms;
mod util;

use std::sync::Arc;

pub use auth::*;
pub use events::*;
pub use library::*;
pub use queues::*;
pub use rooms::*;
pub use util::*;

use crossbeam::channel::unbounded;
use dashmap::DashMap;
use jamroom_core::Config;
use log::error;

/// The jamroom collab system, facilitating room management, membership, and the shared library.
pub struct Collab {
    config: Config,
    event_receiver: EventReceiver,

    pub rooms: RoomManager,
    pub library: Arc<dyn TrackStore>,
}

/// A type passed to various components of the collab system, to access state and emit events.
#[derive(Clone)]
pub struct CollabContext {
    pub config: Config,
    pub auth: Arc<Auth>,

    pub rooms: Arc<DashMap<RoomId, Arc<Room>>>,
    /// Which room each connection is in
    pub connections: Arc<DashMap<ConnectionId, RoomId>>,

    event_sender: EventSender,
}

impl Collab {
    pub fn new(config: Config, library: impl TrackStore) -> Self {
        let (event_sender, event_receiver) = unbounded();

        let context = CollabContext {
            config: config.clone(),
            auth: Arc::new(Auth::new()),
            rooms: Default::default(),
            connections: Default::default(),
            event_sender,
        };

        let room_manager = RoomManager::new(&context);

        Self {
            config,
            event_receiver,
            rooms: room_manager,
            library: Arc::new(library),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a receiver of every event emitted by rooms, in emission order
    pub fn events(&self) -> EventReceiver {
        self.event_receiver.clone()
    }

    /// Drains the events emitted so far without waiting
    pub fn pending_events(&self) -> Vec<Delivery> {
        self.event_receiver.try_iter().collect()
    }
}

impl CollabContext {
    pub fn emit(&self, delivery: Delivery) {
        if let Err(e) = self.event_sender.send(delivery) {
            error!("Failed to emit event: {}", e);
        }
    }
}
