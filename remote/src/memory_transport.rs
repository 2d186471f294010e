use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use courier_actor_core_rs::actor::actor_system::ActorSystem;
use courier_actor_core_rs::actor::remote::{Transport, TransportFactory};
use courier_actor_core_rs::actor::TransportError;
use tokio::sync::Mutex;

use crate::MemoryBroker;

pub const MEMORY_REMOTE_TYPE: &str = "memory";
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Connection onto a [`MemoryBroker`]. Destinations map one to one onto broker queues.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
  broker: MemoryBroker,
  url: String,
  connected: Arc<AtomicBool>,
  consumed: Arc<Mutex<Vec<String>>>,
}

impl MemoryTransport {
  pub fn new(broker: MemoryBroker) -> Self {
    Self {
      broker,
      url: String::new(),
      connected: Arc::new(AtomicBool::new(false)),
      consumed: Arc::new(Mutex::new(Vec::new())),
    }
  }

  /// Factory to register under [`MEMORY_REMOTE_TYPE`]; every connection shares `broker`.
  pub fn factory(broker: &MemoryBroker) -> TransportFactory {
    let broker = broker.clone();
    TransportFactory::new(move || MemoryTransport::new(broker.clone()))
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub fn is_connected(&self) -> bool {
    self.connected.load(Ordering::Acquire)
  }
}

#[async_trait]
impl Transport for MemoryTransport {
  fn configure(&mut self, url: &str, _: &HashMap<String, String>) {
    self.url = url.to_string();
  }

  async fn connect(&self) -> Result<(), TransportError> {
    if !self.url.starts_with(MEMORY_URL_SCHEME) {
      return Err(TransportError::Failure(format!("unsupported url {:?}", self.url)));
    }
    self.connected.store(true, Ordering::Release);
    tracing::debug!("Connected to {}", self.url);
    Ok(())
  }

  async fn send(&self, destination: &str, frame: Vec<u8>) -> Result<(), TransportError> {
    if !self.is_connected() {
      return Err(TransportError::NotConnected(destination.to_string()));
    }
    self.broker.publish(destination, frame).await
  }

  async fn receive(&self, destination: &str, system: ActorSystem) -> Result<(), TransportError> {
    let mut frames = self.broker.subscribe(destination).await?;
    self.consumed.lock().await.push(destination.to_string());
    tracing::info!("Consuming destination {}", destination);
    while let Some(frame) = frames.recv().await {
      if let Err(e) = system.invoke_wire(&frame).await {
        tracing::warn!("Frame received on {} not handled: {}", destination, e);
      }
    }
    Ok(())
  }

  async fn close(&self) {
    self.connected.store(false, Ordering::Release);
    for destination in self.consumed.lock().await.drain(..) {
      self.broker.release(&destination);
    }
  }
}
