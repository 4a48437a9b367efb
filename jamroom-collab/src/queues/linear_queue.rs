use std::collections::VecDeque;

use jamroom_core::{Id, TrackRef};

pub type QueueItemId = Id<QueueItem>;

/// A track waiting to be played in a room
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub track: TrackRef,
    /// Username of the member that queued the track
    pub added_by: String,
}

/// A linear queue of items.
///
/// Not synchronized on its own, the owning room's lock guards it.
#[derive(Debug, Default)]
pub struct LinearQueue {
    history: VecDeque<QueueItem>,
    items: VecDeque<QueueItem>,
}

impl LinearQueue {
    /// How many played items are remembered
    pub const HISTORY_SIZE: usize = 20;

    pub fn push(&mut self, track: TrackRef, added_by: String) -> QueueItem {
        let item = QueueItem {
            id: QueueItemId::new(),
            track,
            added_by,
        };

        self.items.push_back(item.clone());
        item
    }

    /// Removes an upcoming item, returning it if it existed
    pub fn remove(&mut self, id: QueueItemId) -> Option<QueueItem> {
        let index = self.items.iter().position(|i| i.id == id)?;
        self.items.remove(index)
    }

    /// Takes the next item and moves it into the history
    pub fn next(&mut self) -> Option<QueueItem> {
        let item = self.items.pop_front()?;

        self.history.push_back(item.clone());
        while self.history.len() > Self::HISTORY_SIZE {
            self.history.pop_front();
        }

        Some(item)
    }

    pub fn items(&self) -> Vec<QueueItem> {
        self.items.iter().cloned().collect()
    }

    pub fn history(&self) -> Vec<QueueItem> {
        self.history.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
