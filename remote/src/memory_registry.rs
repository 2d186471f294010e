use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use courier_actor_core_rs::actor::core::ActorOptions;
use courier_actor_core_rs::actor::remote::{ActorCreatedCallback, ActorRemovedCallback, Registry};
use courier_actor_core_rs::actor::RegistryError;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::{actor_key, actor_name, MemoryStore, RegistryRecord, StoreEvent, ACTOR_KEY_PREFIX};


/// Registry client backed by a [`MemoryStore`]. Give each actor system its own client
/// over a shared store.
#[derive(Debug, Clone)]
pub struct MemoryRegistry {
  store: MemoryStore,
  endpoints: Arc<RwLock<Option<Vec<String>>>>,
  token: CancellationToken,
}

impl MemoryRegistry {
  pub fn new(store: MemoryStore) -> Self {
    Self {
      store,
      endpoints: Arc::new(RwLock::new(None)),
      token: CancellationToken::new(),
    }
  }

  pub async fn endpoints(&self) -> Option<Vec<String>> {
    self.endpoints.read().await.clone()
  }

  async fn ensure_configured(&self) -> Result<(), RegistryError> {
    if self.token.is_cancelled() {
      return Err(RegistryError::Failure("registry client closed".to_string()));
    }
    match self.endpoints.read().await.as_ref() {
      Some(_) => Ok(()),
      None => Err(RegistryError::NotConfigured),
    }
  }

  /// Reports a put; returns the actor name when the record is valid.
  async fn notify_created<'a>(on_created: &ActorCreatedCallback, key: &'a str, value: &str) -> Option<&'a str> {
    let name = actor_name(key)?;
    match value.parse::<RegistryRecord>() {
      Ok(record) => {
        tracing::info!("New actor {} notified by the registry", name);
        on_created.run(name.to_string(), record.into_options()).await;
        Some(name)
      }
      Err(e) => {
        tracing::error!("Ignoring registry entry {}: {}", key, e);
        None
      }
    }
  }

  /// Brings `known` back in line with the store after missed events.
  async fn resync(
    &self,
    known: &mut HashSet<String>,
    on_created: &ActorCreatedCallback,
    on_removed: &ActorRemovedCallback,
  ) {
    let mut current = HashSet::new();
    for (key, value) in self.store.get_prefix(ACTOR_KEY_PREFIX).await {
      if let Some(name) = Self::notify_created(on_created, &key, &value).await {
        current.insert(name.to_string());
      }
    }
    for name in known.difference(&current) {
      tracing::info!("Actor {} removed from the registry", name);
      on_removed.run(name.clone()).await;
    }
    *known = current;
  }
}

#[async_trait]
impl Registry for MemoryRegistry {
  async fn configure(&self, endpoints: &[String]) -> Result<(), RegistryError> {
    if endpoints.is_empty() {
      return Err(RegistryError::Failure("no registry endpoint given".to_string()));
    }
    *self.endpoints.write().await = Some(endpoints.to_vec());
    tracing::info!("Registry client configured with {:?}", endpoints);
    Ok(())
  }

  async fn register_actor(&self, name: &str, options: &ActorOptions) -> Result<(), RegistryError> {
    self.ensure_configured().await?;
    let record = RegistryRecord::from_options(options);
    self.store.put(&actor_key(name), &record.to_string()).await;
    tracing::info!("Actor {} registered in the registry", name);
    Ok(())
  }

  async fn unregister_actor(&self, name: &str) -> Result<(), RegistryError> {
    self.ensure_configured().await?;
    if !self.store.delete(&actor_key(name)).await {
      tracing::debug!("Actor {} was not registered in the registry", name);
    }
    Ok(())
  }

  async fn parse_configuration(&self) -> Result<HashMap<String, ActorOptions>, RegistryError> {
    self.ensure_configured().await?;
    let mut configuration = HashMap::new();
    for (key, value) in self.store.get_prefix(ACTOR_KEY_PREFIX).await {
      let Some(name) = actor_name(&key) else {
        continue;
      };
      let record = value.parse::<RegistryRecord>()?;
      configuration.insert(name.to_string(), record.into_options());
    }
    Ok(configuration)
  }

  async fn watch(
    &self,
    on_created: ActorCreatedCallback,
    on_removed: ActorRemovedCallback,
  ) -> Result<(), RegistryError> {
    self.ensure_configured().await?;
    let (snapshot, mut events) = self.store.snapshot_and_subscribe(ACTOR_KEY_PREFIX).await;
    let mut known = HashSet::new();
    for (key, value) in snapshot {
      if let Some(name) = Self::notify_created(&on_created, &key, &value).await {
        known.insert(name.to_string());
      }
    }

    loop {
      tokio::select! {
        _ = self.token.cancelled() => break,
        event = events.recv() => match event {
          Ok(StoreEvent::Put { key, value }) => {
            if let Some(name) = Self::notify_created(&on_created, &key, &value).await {
              known.insert(name.to_string());
            }
          }
          Ok(StoreEvent::Delete { key }) => {
            if let Some(name) = actor_name(&key) {
              if known.remove(name) {
                tracing::info!("Actor {} removed from the registry", name);
                on_removed.run(name.to_string()).await;
              }
            }
          }
          Err(RecvError::Lagged(skipped)) => {
            tracing::warn!("Registry watch lagged behind, {} events skipped; resynchronizing", skipped);
            self.resync(&mut known, &on_created, &on_removed).await;
          }
          Err(RecvError::Closed) => break,
        },
      }
    }
    tracing::debug!("Registry watch stopped");
    Ok(())
  }

  async fn close(&self) {
    self.token.cancel();
  }
}
