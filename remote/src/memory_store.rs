use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

pub const STORE_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
  Put { key: String, value: String },
  Delete { key: String },
}

/// Shared ordered key/value store with change notifications.
#[derive(Debug, Clone)]
pub struct MemoryStore {
  entries: Arc<Mutex<BTreeMap<String, String>>>,
  events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
    Self {
      entries: Arc::new(Mutex::new(BTreeMap::new())),
      events,
    }
  }

  pub async fn put(&self, key: &str, value: &str) {
    let mut entries = self.entries.lock().await;
    entries.insert(key.to_string(), value.to_string());
    // Published under the lock so watchers see the same order as the store.
    let _ = self.events.send(StoreEvent::Put {
      key: key.to_string(),
      value: value.to_string(),
    });
  }

  pub async fn delete(&self, key: &str) -> bool {
    let mut entries = self.entries.lock().await;
    let removed = entries.remove(key).is_some();
    if removed {
      let _ = self.events.send(StoreEvent::Delete { key: key.to_string() });
    }
    removed
  }

  pub async fn get(&self, key: &str) -> Option<String> {
    self.entries.lock().await.get(key).cloned()
  }

  pub async fn get_prefix(&self, prefix: &str) -> Vec<(String, String)> {
    let entries = self.entries.lock().await;
    Self::collect_prefix(&entries, prefix)
  }

  /// Current entries under `prefix` plus a receiver for every later change.
  pub async fn snapshot_and_subscribe(&self, prefix: &str) -> (Vec<(String, String)>, broadcast::Receiver<StoreEvent>) {
    let entries = self.entries.lock().await;
    let receiver = self.events.subscribe();
    (Self::collect_prefix(&entries, prefix), receiver)
  }

  fn collect_prefix(entries: &BTreeMap<String, String>, prefix: &str) -> Vec<(String, String)> {
    entries
      .range(prefix.to_string()..)
      .take_while(|(key, _)| key.starts_with(prefix))
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect()
  }
}
