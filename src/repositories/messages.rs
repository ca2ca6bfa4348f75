use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::watch;

use crate::records::{Message, Sender, record_id};
use crate::store::{Store, StoreError};

pub(crate) const MESSAGES_KEY: &str = "messages";

/// Per-complaint append-only log. Referential integrity against the
/// complaints collection is deliberately not enforced; orphaned messages
/// stay in the collection and are simply never requested.
#[derive(Clone)]
pub struct MessagesRepository {
    store: Store,
    revision: Arc<watch::Sender<u64>>,
}

impl MessagesRepository {
    pub fn new(store: Store) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            store,
            revision: Arc::new(revision),
        }
    }

    pub fn load_all(&self) -> Vec<Message> {
        super::load_collection(&self.store, MESSAGES_KEY)
    }

    pub fn save_all(&self, messages: &[Message]) -> Result<(), StoreError> {
        super::save_collection(&self.store, MESSAGES_KEY, messages)?;
        self.revision.send_modify(|revision| *revision += 1);
        Ok(())
    }

    /// All messages on one thread, oldest first. Insertion order and
    /// timestamp order coincide since both derive from the creation instant.
    pub fn thread(&self, complaint_id: i64) -> Vec<Message> {
        let mut thread: Vec<Message> = self
            .load_all()
            .into_iter()
            .filter(|message| message.complaint_id == complaint_id)
            .collect();
        thread.sort_by_key(|message| message.timestamp);
        thread
    }

    pub fn send(
        &self,
        complaint_id: i64,
        sender: Sender,
        sender_name: &str,
        body: &str,
        now: OffsetDateTime,
    ) -> Result<Message, StoreError> {
        let _guard = self.store.lock();
        let mut messages = self.load_all();
        let message = Message {
            id: record_id(now),
            complaint_id,
            sender,
            message: body.to_string(),
            timestamp: now,
            sender_name: sender_name.to_string(),
            read: false,
        };
        messages.push(message.clone());
        self.save_all(&messages)?;
        Ok(message)
    }

    /// Sweeps every user-sent message on the thread to read in one write.
    /// Messages on other threads and admin-sent messages are untouched.
    pub fn mark_thread_read(&self, complaint_id: i64) -> Result<(), StoreError> {
        let _guard = self.store.lock();
        let mut messages = self.load_all();
        let mut changed = false;
        for message in messages.iter_mut() {
            if message.complaint_id == complaint_id && message.sender == Sender::User && !message.read
            {
                message.read = true;
                changed = true;
            }
        }
        if changed {
            self.save_all(&messages)?;
        }
        Ok(())
    }

    /// Unread = user-sent and not yet swept. Computed by filtering the full
    /// collection per thread; fine at this scale.
    pub fn unread_count(&self, complaint_id: i64) -> usize {
        self.load_all()
            .iter()
            .filter(|message| {
                message.complaint_id == complaint_id
                    && message.sender == Sender::User
                    && !message.read
            })
            .count()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Change feed bumped on every write. The polling view only needs the
    /// counter; a push transport could await the receiver instead.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
