use std::sync::Arc;

use courier_actor_core_rs::actor::TransportError;
use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};

#[cfg(test)]
mod tests;

pub const DESTINATION_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Destination {
  sender: mpsc::Sender<Vec<u8>>,
  receiver: Mutex<Option<mpsc::Receiver<Vec<u8>>>>,
}

impl Destination {
  fn new() -> Self {
    let (sender, receiver) = mpsc::channel(DESTINATION_CAPACITY);
    Self {
      sender,
      receiver: Mutex::new(Some(receiver)),
    }
  }
}

#[derive(Debug, Clone)]
enum Slot {
  Open(Arc<Destination>),
  Released,
}

/// Bounded FIFO queues of frames keyed by destination. Each destination has at most one consumer.
///
/// A released destination refuses frames until it is subscribed again.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
  destinations: Arc<DashMap<String, Slot>>,
}

impl MemoryBroker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queues a frame, waiting while the destination is full. Frames published before the
  /// consumer subscribes are kept.
  pub async fn publish(&self, destination: &str, frame: Vec<u8>) -> Result<(), TransportError> {
    let slot = self
      .destinations
      .entry(destination.to_string())
      .or_insert_with(|| Slot::Open(Arc::new(Destination::new())))
      .clone();
    let Slot::Open(queue) = slot else {
      return Err(TransportError::Failure(format!("destination {} was released", destination)));
    };
    let sender = queue.sender.clone();
    sender
      .send(frame)
      .await
      .map_err(|_| TransportError::Failure(format!("destination {} is no longer consumed", destination)))
  }

  /// Takes the receiving end of a destination, reopening it if it was released.
  pub async fn subscribe(&self, destination: &str) -> Result<mpsc::Receiver<Vec<u8>>, TransportError> {
    let queue = {
      let mut slot = self
        .destinations
        .entry(destination.to_string())
        .or_insert_with(|| Slot::Open(Arc::new(Destination::new())));
      let open = match slot.value() {
        Slot::Open(queue) => Some(queue.clone()),
        Slot::Released => None,
      };
      match open {
        Some(queue) => queue,
        None => {
          let queue = Arc::new(Destination::new());
          *slot = Slot::Open(queue.clone());
          queue
        }
      }
    };
    let receiver = queue
      .receiver
      .lock()
      .await
      .take()
      .ok_or_else(|| TransportError::Failure(format!("destination {} already has a consumer", destination)));
    receiver
  }

  /// Drops the destination's queue and any frame still in it.
  pub fn release(&self, destination: &str) {
    self.destinations.insert(destination.to_string(), Slot::Released);
  }

  pub fn contains(&self, destination: &str) -> bool {
    self
      .destinations
      .get(destination)
      .is_some_and(|slot| matches!(slot.value(), Slot::Open(_)))
  }
}
