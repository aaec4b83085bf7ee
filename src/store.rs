//! store.rs: bounded in-memory message store, newest first.
//!
//! Stands in for the persistence layer: it owns the newest-first ordering
//! the aggregator relies on. Oldest entries are dropped past `cap`.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::message::{Message, TextError};
use crate::tone::ToneAnalysis;

pub const DEFAULT_CAPACITY: usize = 2000;

#[derive(Debug)]
pub struct MessageStore {
    inner: RwLock<VecDeque<Message>>,
    cap: usize,
    next_id: AtomicU64,
}

impl MessageStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 100_000);
        Self {
            inner: RwLock::new(VecDeque::with_capacity(cap.min(DEFAULT_CAPACITY))),
            cap,
            next_id: AtomicU64::new(1),
        }
    }

    /// Validate, assign an id and store a new submission.
    pub fn submit(&self, text: &str, now: DateTime<Utc>) -> Result<Message, TextError> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let msg = Message::new(format!("msg-{n:06}"), text, now)?;
        self.insert(msg.clone());
        Ok(msg)
    }

    /// Insert an already-built message as the newest entry.
    pub fn insert(&self, msg: Message) {
        let mut v = self.write();
        v.push_front(msg);
        v.truncate(self.cap);
    }

    /// Returns `false` when the message is unknown (e.g. already evicted).
    pub fn attach_analysis(&self, id: &str, analysis: ToneAnalysis) -> bool {
        let mut v = self.write();
        match v.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.analysis = Some(analysis);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<Message> {
        self.read().iter().find(|m| m.id == id).cloned()
    }

    /// Snapshot of the last `n` messages, newest first.
    pub fn recent(&self, n: usize) -> Vec<Message> {
        self.read().iter().take(n).cloned().collect()
    }

    pub fn all(&self) -> Vec<Message> {
        self.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Writers never leave the deque half-updated; poisoned guards are recovered.
    fn read(&self) -> RwLockReadGuard<'_, VecDeque<Message>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<Message>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_bounded() {
        let store = MessageStore::with_capacity(3);
        let now = Utc::now();
        for i in 0..5 {
            store.submit(&format!("message {i}"), now).unwrap();
        }
        let texts: Vec<_> = store.all().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["message 4", "message 3", "message 2"]);
        assert_eq!(store.recent(2).len(), 2);
    }

    #[test]
    fn ids_are_unique_and_lookup_works() {
        let store = MessageStore::default();
        let a = store.submit("one", Utc::now()).unwrap();
        let b = store.submit("two", Utc::now()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.get(&a.id).map(|m| m.text), Some("one".to_string()));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn invalid_text_is_not_stored() {
        let store = MessageStore::default();
        assert!(store.submit("   ", Utc::now()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn analysis_attaches_after_the_fact() {
        let store = MessageStore::default();
        let m = store.submit("hello", Utc::now()).unwrap();
        let a = ToneAnalysis::default().with_sentiment("positive");
        assert!(store.attach_analysis(&m.id, a.clone()));
        assert_eq!(store.get(&m.id).unwrap().analysis, Some(a));
        assert!(!store.attach_analysis("nope", ToneAnalysis::default()));
    }
}
