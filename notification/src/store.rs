//! Ordered, keyed collection of the active notifications of one session.

use crate::notification::{Key, Notification};
use log::*;
use std::collections::HashMap;

/// Insertion-ordered store. Pure data: no rendering, no timers.
///
/// Removal leaves a stale slot in `order` that is skipped by [`Store::list`] and
/// compacted once stale slots outnumber live entries, which keeps `push`,
/// `remove` and `get` O(1) amortized.
#[derive(Debug, Default)]
pub struct Store {
    entries: HashMap<Key, (u64, Notification)>,
    order: Vec<(u64, Key)>,
    next_seq: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `notification` at the end of the stack.
    ///
    /// Returns `false` without changing anything when the key is already present.
    pub fn push(&mut self, notification: Notification) -> bool {
        let key = notification.key().clone();
        if self.contains(&key) {
            warn!("Ignoring push of notification {key}: key already in store");
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.push((seq, key.clone()));
        self.entries.insert(key, (seq, notification));
        true
    }

    /// Removes `key`, keeping the relative order of the remaining entries.
    /// Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &Key) -> Option<Notification> {
        let (_, notification) = self.entries.remove(key)?;
        if self.order.len() > 2 * self.entries.len() + 8 {
            self.compact();
        }
        Some(notification)
    }

    pub fn get(&self, key: &Key) -> Option<&Notification> {
        self.entries.get(key).map(|(_, notification)| notification)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Ordered snapshot of the stack, first pushed first.
    pub fn list(&self) -> Vec<&Notification> {
        self.order
            .iter()
            .filter_map(|(seq, key)| match self.entries.get(key) {
                Some((live_seq, notification)) if live_seq == seq => Some(notification),
                _ => None,
            })
            .collect()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.list().into_iter().map(|n| n.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn compact(&mut self) {
        let entries = &self.entries;
        self.order
            .retain(|(seq, key)| entries.get(key).is_some_and(|(live_seq, _)| live_seq == seq));
        trace!("Compacted notification store to {} slots", self.order.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = Store::new();
        let a = Notification::info("a");
        let b = Notification::info("b");
        let c = Notification::info("c");
        let (ka, kb, kc) = (a.key().clone(), b.key().clone(), c.key().clone());

        store.push(a);
        store.push(b);
        store.push(c);
        assert_eq!(store.keys(), vec![ka.clone(), kb.clone(), kc.clone()]);

        assert!(store.remove(&kb).is_some());
        assert_eq!(store.keys(), vec![ka, kc]);
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut store = Store::new();
        let a = Notification::info("a");
        let b = Notification::info("b");
        let (ka, kb) = (a.key().clone(), b.key().clone());
        store.push(a);
        store.push(b);

        assert!(store.remove(&ka).is_some());
        assert!(store.remove(&ka).is_none());
        assert!(store.remove(&Key::new()).is_none());
        assert_eq!(store.keys(), vec![kb]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_push_is_ignored() {
        let mut store = Store::new();
        let a = Notification::info("a");
        assert!(store.push(a.clone()));
        assert!(!store.push(a));
        assert_eq!(store.len(), 1);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_repush_after_remove_appends_once() {
        let mut store = Store::new();
        let a = Notification::info("a");
        let b = Notification::info("b");
        let (ka, kb) = (a.key().clone(), b.key().clone());
        store.push(a.clone());
        store.push(b);
        store.remove(&ka);
        store.push(a);

        assert_eq!(store.keys(), vec![kb, ka]);
    }

    #[test]
    fn test_compaction_keeps_order_of_survivors() {
        let mut store = Store::new();
        let notifications: Vec<Notification> =
            (0..100).map(|i| Notification::info(format!("n{i}"))).collect();
        for notification in &notifications {
            store.push(notification.clone());
        }
        for (i, notification) in notifications.iter().enumerate() {
            if i % 10 != 0 && i != 42 {
                store.remove(notification.key());
            }
        }

        let messages: Vec<String> = store
            .list()
            .iter()
            .map(|n| n.payload()["message"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            messages,
            vec!["n0", "n10", "n20", "n30", "n40", "n42", "n50", "n60", "n70", "n80", "n90"]
        );
        assert!(store.order.len() <= 2 * store.len() + 8);
    }

    #[test]
    fn test_get_and_clear() {
        let mut store = Store::new();
        let a = Notification::info("a");
        let ka = a.key().clone();
        store.push(a);

        assert_eq!(store.get(&ka).map(|n| n.key()), Some(&ka));
        assert!(store.contains(&ka));
        store.clear();
        assert!(store.is_empty());
        assert!(store.get(&ka).is_none());
        assert!(!store.contains(&ka));
    }
}
