use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::actor::core::ActorOptions;
use crate::actor::RegistryError;

/// Shared directory of remote actors, mirrored by every distributed actor system.
#[async_trait]
pub trait Registry: Debug + Send + Sync + 'static {
  async fn configure(&self, endpoints: &[String]) -> Result<(), RegistryError>;

  async fn register_actor(&self, name: &str, options: &ActorOptions) -> Result<(), RegistryError>;

  async fn unregister_actor(&self, name: &str) -> Result<(), RegistryError>;

  /// Every actor currently published.
  async fn parse_configuration(&self) -> Result<HashMap<String, ActorOptions>, RegistryError>;

  /// Replays the current records through `on_created`, then reports changes until the
  /// registry is closed.
  async fn watch(
    &self,
    on_created: ActorCreatedCallback,
    on_removed: ActorRemovedCallback,
  ) -> Result<(), RegistryError>;

  async fn close(&self);
}

pub type RegistryHandle = Arc<dyn Registry>;

#[allow(clippy::type_complexity)]
#[derive(Clone)]
pub struct ActorCreatedCallback(Arc<dyn Fn(String, ActorOptions) -> BoxFuture<'static, ()> + Send + Sync + 'static>);

impl Debug for ActorCreatedCallback {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "ActorCreatedCallback")
  }
}

impl PartialEq for ActorCreatedCallback {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for ActorCreatedCallback {}

impl ActorCreatedCallback {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(String, ActorOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    ActorCreatedCallback(Arc::new(move |name, options| Box::pin(f(name, options))))
  }

  pub async fn run(&self, name: String, options: ActorOptions) {
    (self.0)(name, options).await
  }
}

#[derive(Clone)]
pub struct ActorRemovedCallback(Arc<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync + 'static>);

impl Debug for ActorRemovedCallback {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "ActorRemovedCallback")
  }
}

impl PartialEq for ActorRemovedCallback {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for ActorRemovedCallback {}

impl ActorRemovedCallback {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    ActorRemovedCallback(Arc::new(move |name| Box::pin(f(name))))
  }

  pub async fn run(&self, name: String) {
    (self.0)(name).await
  }
}
