use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use async_trait::async_trait;

use crate::actor::actor_system::ActorSystem;
use crate::actor::TransportError;

/// Delivery mechanism for actors whose options mark them remote.
///
/// One connection is opened per remote actor: it is created by the [`TransportFactory`]
/// registered for the actor's remote type, configured with its url, then connected.
/// For an actor hosted by the local system, `receive` runs for the actor's whole
/// lifetime and hands every inbound frame to [`ActorSystem::invoke_wire`].
#[async_trait]
pub trait Transport: Debug + Send + Sync + 'static {
  fn configure(&mut self, url: &str, options: &HashMap<String, String>);

  async fn connect(&self) -> Result<(), TransportError>;

  async fn send(&self, destination: &str, frame: Vec<u8>) -> Result<(), TransportError>;

  async fn receive(&self, destination: &str, system: ActorSystem) -> Result<(), TransportError>;

  async fn close(&self);
}

pub type TransportHandle = Arc<dyn Transport>;

#[derive(Clone)]
pub struct TransportFactory(Arc<dyn Fn() -> Box<dyn Transport> + Send + Sync + 'static>);

impl Debug for TransportFactory {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "TransportFactory")
  }
}

impl PartialEq for TransportFactory {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for TransportFactory {}

impl TransportFactory {
  pub fn new<F, T>(f: F) -> Self
  where
    F: Fn() -> T + Send + Sync + 'static,
    T: Transport, {
    TransportFactory(Arc::new(move || Box::new(f()) as Box<dyn Transport>))
  }

  pub fn create(&self) -> Box<dyn Transport> {
    (self.0)()
  }

  pub(crate) async fn open(&self, url: &str) -> Result<TransportHandle, TransportError> {
    let mut transport = self.create();
    transport.configure(url, &HashMap::new());
    transport.connect().await?;
    Ok(Arc::from(transport))
  }
}
