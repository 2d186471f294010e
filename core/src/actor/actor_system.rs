use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::actor::core::{Actor, ActorCell, ActorOptions, ActorRef, ActorState};
use crate::actor::dispatch::{receive, Inbox, Route};
use crate::actor::message::{
  Context, Envelope, Payload, WireEnvelope, CHILD_CLOSED, HEARTBEAT_REPLY, HEARTBEAT_REQUEST, POISON_PILL,
  ROOT_ACTOR_NAME,
};
use crate::actor::remote::{ActorCreatedCallback, ActorRemovedCallback, RegistryHandle, TransportHandle};
use crate::actor::{ActorError, Config, ConfigOption, RegistryError, TransportError};

/// Entry of the actor map. Hosted actors carry a cell; mirrors of actors hosted by
/// another system only carry their options and connection.
#[derive(Debug, Clone)]
pub(crate) struct ActorAssociation {
  cell: Option<Arc<ActorCell>>,
  options: ActorOptions,
  mailbox: Option<mpsc::Sender<Envelope>>,
  connection: Option<TransportHandle>,
}

impl ActorAssociation {
  pub(crate) fn options(&self) -> &ActorOptions {
    &self.options
  }

  fn is_hosted(&self) -> bool {
    self.cell.is_some()
  }

  fn is_cell(&self, cell: &Arc<ActorCell>) -> bool {
    self.cell.as_ref().is_some_and(|current| Arc::ptr_eq(current, cell))
  }

  fn route(&self, name: &str) -> Route {
    Route::new(name, self.options.clone(), self.mailbox.clone(), self.connection.clone())
  }
}

struct ActorSystemInner {
  config: Config,
  actors: RwLock<HashMap<String, ActorAssociation>>,
  token: CancellationToken,
  stopped: AtomicBool,
}

#[derive(Clone)]
pub struct ActorSystem {
  inner: Arc<ActorSystemInner>,
}

#[derive(Clone)]
pub struct WeakActorSystem {
  inner: Weak<ActorSystemInner>,
}

impl Debug for ActorSystem {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActorSystem")
      .field("name", &self.inner.config.system_name)
      .finish()
  }
}

impl Debug for WeakActorSystem {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "WeakActorSystem")
  }
}

impl PartialEq for ActorSystem {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Eq for ActorSystem {}

static_assertions::assert_impl_all!(ActorSystem: Send, Sync);

impl WeakActorSystem {
  pub fn upgrade(&self) -> Option<ActorSystem> {
    self.inner.upgrade().map(|inner| ActorSystem { inner })
  }
}

impl ActorSystem {
  pub async fn new() -> Result<Self, ActorError> {
    Self::new_config_options([]).await
  }

  pub async fn new_config_options(options: impl IntoIterator<Item = ConfigOption>) -> Result<Self, ActorError> {
    Self::new_with_config(Config::from(options)).await
  }

  /// Starts an actor system. With a registry configured, the system first mirrors every
  /// actor the registry knows, then keeps the mirror in sync in the background; a registry
  /// that cannot be configured or read makes startup fail.
  pub async fn new_with_config(config: Config) -> Result<Self, ActorError> {
    let registry = config.registry.clone();
    let system = Self {
      inner: Arc::new(ActorSystemInner {
        config,
        actors: RwLock::new(HashMap::new()),
        token: CancellationToken::new(),
        stopped: AtomicBool::new(false),
      }),
    };
    if let Some(registry) = registry {
      system.init_distributed(registry).await?;
    }
    tracing::info!("Actor system {} started", system.name());
    Ok(system)
  }

  async fn init_distributed(&self, registry: RegistryHandle) -> Result<(), ActorError> {
    registry
      .configure(&self.inner.config.registry_endpoints)
      .await
      .map_err(|e| {
        tracing::error!("Failed to configure access to the remote registry: {}", e);
        e
      })?;
    let configuration = registry.parse_configuration().await.map_err(|e| {
      tracing::error!("Failed to parse the registry configuration: {}", e);
      e
    })?;
    for (name, options) in configuration {
      self.on_actor_created_from_registry(name, options).await;
    }
    self.start_registry_watch(registry);
    Ok(())
  }

  fn start_registry_watch(&self, registry: RegistryHandle) {
    let weak = self.downgrade();
    let on_created = ActorCreatedCallback::new({
      let weak = weak.clone();
      move |name, options| {
        let weak = weak.clone();
        async move {
          if let Some(system) = weak.upgrade() {
            system.on_actor_created_from_registry(name, options).await;
          }
        }
      }
    });
    let on_removed = ActorRemovedCallback::new(move |name| {
      let weak = weak.clone();
      async move {
        if let Some(system) = weak.upgrade() {
          system.on_actor_removed_from_registry(name).await;
        }
      }
    });
    let token = self.inner.token.clone();
    tokio::spawn(async move {
      tokio::select! {
        _ = token.cancelled() => {}
        result = registry.watch(on_created, on_removed) => {
          if let Err(e) = result {
            tracing::error!("Registry watch stopped: {}", e);
          }
        }
      }
    });
  }

  pub fn name(&self) -> &str {
    &self.inner.config.system_name
  }

  pub fn config(&self) -> &Config {
    &self.inner.config
  }

  pub fn downgrade(&self) -> WeakActorSystem {
    WeakActorSystem {
      inner: Arc::downgrade(&self.inner),
    }
  }

  /// Sentinel parent of top-level actors. It has no mailbox: sending to it fails.
  pub fn root(&self) -> ActorRef {
    ActorRef::new(ROOT_ACTOR_NAME, self.clone())
  }

  pub fn is_stopped(&self) -> bool {
    self.inner.stopped.load(Ordering::Acquire)
  }

  pub(crate) fn child_token(&self) -> CancellationToken {
    self.inner.token.child_token()
  }

  /// Spawns a top-level actor.
  pub async fn register_actor(&self, name: &str, actor: Actor, options: ActorOptions) -> Result<ActorRef, ActorError> {
    tracing::info!("Registering new actor {}", name);
    self.spawn_actor(&self.root(), name, actor, options).await
  }

  /// Spawns `name` as a child of `parent`; the parent is told [`CHILD_CLOSED`] when it closes.
  pub async fn spawn_actor(
    &self,
    parent: &ActorRef,
    name: &str,
    actor: Actor,
    options: ActorOptions,
  ) -> Result<ActorRef, ActorError> {
    if self.is_stopped() {
      return Err(ActorError::SystemStopped);
    }
    if name == ROOT_ACTOR_NAME {
      tracing::error!("Registering an actor whose name is {} is not allowed", name);
      return Err(ActorError::ReservedName(name.to_string()));
    }
    if !parent.is_root() {
      self.association(parent.name()).await?;
    }
    tracing::info!("Spawning new actor {} under {}", name, parent);

    let mut options = options.with_parent(parent.name());
    if options.buffer_size() == 0 {
      options = options.with_buffer_size(self.inner.config.default_buffer_size.max(1));
    }
    let cell = Arc::new(ActorCell::new(
      name,
      options.clone(),
      actor.into_behavior(),
      self.inner.token.child_token(),
    ));

    let mut association = ActorAssociation {
      cell: Some(cell.clone()),
      options: options.clone(),
      mailbox: None,
      connection: None,
    };
    let local_inbox = if options.remote() {
      None
    } else {
      let (tx, rx) = mpsc::channel(options.buffer_size());
      association.mailbox = Some(tx);
      Some(Inbox::Local(rx))
    };
    {
      let mut actors = self.inner.actors.write().await;
      if actors.contains_key(name) {
        tracing::info!("Actor {} already registered", name);
        return Err(ActorError::AlreadyRegistered(name.to_string()));
      }
      actors.insert(name.to_string(), association);
    }

    // Remote I/O happens with the name reserved but the map unlocked.
    let inbox = match local_inbox {
      Some(inbox) => inbox,
      None => match self.open_hosted_remote(name, &cell).await {
        Ok(inbox) => inbox,
        Err(e) => {
          self.discard_entry(name, &cell).await;
          return Err(e);
        }
      },
    };

    let handle = tokio::spawn(receive(self.clone(), cell.clone(), inbox));
    cell.set_join_handle(handle).await;

    let actor_ref = ActorRef::new(name, self.clone());
    if !options.heartbeat_interval().is_zero() {
      self.start_heartbeat(&cell, &actor_ref);
    }
    Ok(actor_ref)
  }

  async fn open_hosted_remote(&self, name: &str, cell: &Arc<ActorCell>) -> Result<Inbox, ActorError> {
    let registry = self.inner.config.registry.clone().ok_or(RegistryError::NotConfigured)?;
    let options = cell.options();
    let connection = self.open_connection(options).await?;
    if let Err(e) = registry.register_actor(name, options).await {
      tracing::error!("Failed to register {} in the remote registry: {}", name, e);
      connection.close().await;
      return Err(e.into());
    }

    let attached = {
      let mut actors = self.inner.actors.write().await;
      match actors.get_mut(name) {
        Some(association) if association.is_cell(cell) => {
          association.connection = Some(connection.clone());
          true
        }
        _ => false,
      }
    };
    if !attached {
      tracing::info!("Actor {} closed while connecting", name);
      if let Err(e) = registry.unregister_actor(name).await {
        tracing::error!("Failed to unregister {} from the remote registry: {}", name, e);
      }
      connection.close().await;
      return Err(ActorError::NotRegistered(name.to_string()));
    }

    Ok(Inbox::Remote {
      connection,
      destination: options.destination().to_string(),
    })
  }

  async fn discard_entry(&self, name: &str, cell: &Arc<ActorCell>) {
    let mut actors = self.inner.actors.write().await;
    if actors.get(name).is_some_and(|association| association.is_cell(cell)) {
      actors.remove(name);
    }
  }

  async fn open_connection(&self, options: &ActorOptions) -> Result<TransportHandle, ActorError> {
    let factory = self
      .inner
      .config
      .transport_factory(options.remote_type())
      .ok_or_else(|| TransportError::UnknownKind(options.remote_type().to_string()))?;
    Ok(factory.open(options.url()).await?)
  }

  fn start_heartbeat(&self, cell: &Arc<ActorCell>, actor_ref: &ActorRef) {
    let parent_name = cell.options().parent().to_string();
    if parent_name == ROOT_ACTOR_NAME {
      tracing::warn!("Heartbeat of {} not started: the root does not answer heartbeats", actor_ref);
      return;
    }
    let interval = cell.options().heartbeat_interval();
    let token = cell.token().child_token();
    let system = self.clone();
    let actor_ref = actor_ref.clone();
    tokio::spawn(async move {
      let mut ticker = time::interval_at(Instant::now() + interval, interval);
      loop {
        tokio::select! {
          biased;
          _ = token.cancelled() => break,
          _ = ticker.tick() => {
            match system.actor_of(&parent_name).await {
              Ok(parent) => {
                if let Err(e) = parent.tell(HEARTBEAT_REQUEST, None, &actor_ref).await {
                  tracing::error!("Heartbeat from {} to {} failed: {}", actor_ref, parent, e);
                }
              }
              Err(_) => tracing::error!("Parent {} of actor {} not found", parent_name, actor_ref),
            }
          }
        }
      }
    });
  }

  pub async fn actor_of(&self, name: &str) -> Result<ActorRef, ActorError> {
    self.association(name).await.map_err(|e| {
      tracing::debug!("Actor {} not registered", name);
      e
    })?;
    Ok(ActorRef::new(name, self.clone()))
  }

  /// Names of every actor known to the system, hosted or mirrored, sorted.
  pub async fn actor_names(&self) -> Vec<String> {
    let mut names = self.inner.actors.read().await.keys().cloned().collect::<Vec<_>>();
    names.sort();
    names
  }

  pub async fn actor_state(&self, name: &str) -> Result<ActorState, ActorError> {
    Ok(self.local_cell(name).await?.state())
  }

  pub(crate) async fn association(&self, name: &str) -> Result<ActorAssociation, ActorError> {
    self
      .inner
      .actors
      .read()
      .await
      .get(name)
      .cloned()
      .ok_or_else(|| ActorError::NotRegistered(name.to_string()))
  }

  pub(crate) async fn route(&self, name: &str) -> Result<Route, ActorError> {
    Ok(self.association(name).await?.route(name))
  }

  pub(crate) async fn local_cell(&self, name: &str) -> Result<Arc<ActorCell>, ActorError> {
    self
      .association(name)
      .await?
      .cell
      .ok_or_else(|| ActorError::NotLocal(name.to_string()))
  }

  /// Handles an envelope addressed to an actor hosted by this system, bypassing its mailbox.
  pub async fn invoke(&self, envelope: Envelope) -> Result<(), ActorError> {
    let cell = self.local_cell(envelope.receiver().name()).await.map_err(|e| {
      tracing::error!("Invoke error: {}", e);
      e
    })?;
    self.invoke_in(&cell, envelope).await
  }

  /// Decodes a frame received by a transport and handles it.
  pub async fn invoke_wire(&self, frame: &[u8]) -> Result<(), ActorError> {
    let envelope = self.decode_envelope(frame).await.map_err(|e| {
      tracing::error!("Failed to decode inbound frame: {}", e);
      e
    })?;
    self.invoke(envelope).await
  }

  /// Parses a wire envelope, resolving both actor names against this system.
  pub async fn decode_envelope(&self, frame: &[u8]) -> Result<Envelope, ActorError> {
    let wire = WireEnvelope::from_bytes(frame)?;
    let receiver = self.resolve_wire_name(&wire.receiver, false).await?;
    let sender = self.resolve_wire_name(&wire.sender, true).await?;
    Ok(wire.into_envelope(sender, receiver))
  }

  async fn resolve_wire_name(&self, name: &str, allow_root: bool) -> Result<ActorRef, ActorError> {
    if allow_root && name == ROOT_ACTOR_NAME {
      return Ok(self.root());
    }
    self
      .association(name)
      .await
      .map(|_| ActorRef::new(name, self.clone()))
      .map_err(|_| ActorError::UnknownActor(name.to_string()))
  }

  pub(crate) async fn invoke_in(&self, cell: &ActorCell, envelope: Envelope) -> Result<(), ActorError> {
    tracing::debug!("Invoking {} on {}", envelope.message_type(), cell.name());
    match envelope.message_type() {
      POISON_PILL => {
        tracing::info!("Actor {} has received a poison pill", cell.name());
        if cell.options().autoclose() || !cell.has_reaction(POISON_PILL).await {
          tracing::info!("Closing actor {}", cell.name());
          self.close_actor(cell.name()).await;
          return Ok(());
        }
      }
      HEARTBEAT_REQUEST => {
        if let Err(e) = envelope
          .sender()
          .tell(HEARTBEAT_REPLY, None, envelope.receiver())
          .await
        {
          tracing::warn!("Failed to answer the heartbeat of {}: {}", envelope.sender(), e);
        }
      }
      _ => {}
    }

    let Some(reaction) = cell.reaction_for(envelope.message_type()).await else {
      tracing::debug!("Actor {} has no reaction to {}", cell.name(), envelope.message_type());
      return Ok(());
    };
    let message_type = envelope.message_type().to_string();
    match AssertUnwindSafe(reaction.run(Context::new(envelope)))
      .catch_unwind()
      .await
    {
      Ok(Ok(())) => Ok(()),
      Ok(Err(e)) => {
        tracing::warn!("Reaction of {} to {} failed: {}", cell.name(), message_type, e);
        Err(e)
      }
      Err(panic) => {
        let reason = panic
          .downcast_ref::<&str>()
          .map(|s| s.to_string())
          .or_else(|| panic.downcast_ref::<String>().cloned())
          .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!("Reaction of {} to {} panicked: {}", cell.name(), message_type, reason);
        Err(ActorError::ReactionFailed(reason))
      }
    }
  }

  /// Closes a hosted actor: notifies its parent, stops its receive loop, withdraws it from
  /// the registry when remote, and removes it from the system. Only the first call has effect.
  pub async fn close_actor(&self, name: &str) {
    let cell = match self.local_cell(name).await {
      Ok(cell) => cell,
      Err(e) => {
        tracing::debug!("Unable to close actor {}: {}", name, e);
        return;
      }
    };
    if !cell.begin_closing() {
      tracing::debug!("Actor {} is already closing", name);
      return;
    }
    tracing::info!("Closing local actor {}", name);

    let parent_name = cell.options().parent();
    if parent_name != ROOT_ACTOR_NAME {
      let child = ActorRef::new(name, self.clone());
      match self.actor_of(parent_name).await {
        Ok(parent) => {
          if let Err(e) = parent
            .tell(CHILD_CLOSED, Some(Payload::new(name.to_string())), &child)
            .await
          {
            tracing::error!("Failed to notify {} that {} closed: {}", parent, name, e);
          }
        }
        Err(_) => tracing::error!("Parent {} of {} not registered", parent_name, name),
      }
    }

    cell.token().cancel();

    let removed = {
      let mut actors = self.inner.actors.write().await;
      if actors.get(name).is_some_and(|association| association.is_cell(&cell)) {
        actors.remove(name)
      } else {
        None
      }
    };

    if let Some(association) = removed {
      if association.options.remote() {
        if let Some(registry) = &self.inner.config.registry {
          if let Err(e) = registry.unregister_actor(name).await {
            tracing::error!("Failed to unregister {} from the remote registry: {}", name, e);
          }
        }
        if let Some(connection) = association.connection {
          connection.close().await;
        }
      }
    }
    tracing::info!("{} unregistered from the actor system", name);
  }

  /// Mirrors an actor announced by the registry. Names hosted locally are left untouched.
  pub(crate) async fn on_actor_created_from_registry(&self, name: String, options: ActorOptions) {
    {
      let actors = self.inner.actors.read().await;
      match actors.get(&name) {
        Some(association) if association.is_hosted() => {
          tracing::debug!("Actor {} is hosted by this system, registry notification ignored", name);
          return;
        }
        Some(association) if association.options == options && association.connection.is_some() => {
          tracing::debug!("Actor {} already mirrored", name);
          return;
        }
        _ => {}
      }
    }
    let connection = match self.open_connection(&options).await {
      Ok(connection) => Some(connection),
      Err(e) => {
        tracing::error!("Failed to initialize the connection with {}: {}", name, e);
        None
      }
    };

    let mut actors = self.inner.actors.write().await;
    if actors.get(&name).is_some_and(ActorAssociation::is_hosted) {
      drop(actors);
      if let Some(connection) = connection {
        connection.close().await;
      }
      return;
    }
    let association = ActorAssociation {
      cell: None,
      options,
      mailbox: None,
      connection,
    };
    let displaced = actors.insert(name.clone(), association);
    drop(actors);

    if let Some(connection) = displaced.and_then(|association| association.connection) {
      connection.close().await;
    }
    tracing::info!("Actor {} added to the local system", name);
  }

  pub(crate) async fn on_actor_removed_from_registry(&self, name: String) {
    let removed = {
      let mut actors = self.inner.actors.write().await;
      match actors.get(&name).map(ActorAssociation::is_hosted) {
        None => {
          tracing::info!("Actor {} not registered in the local system", name);
          None
        }
        Some(true) => {
          tracing::debug!("Actor {} is hosted by this system, registry notification ignored", name);
          None
        }
        Some(false) => actors.remove(&name),
      }
    };
    if let Some(association) = removed {
      if let Some(connection) = association.connection {
        connection.close().await;
      }
      tracing::info!("Actor {} removed from the local system", name);
    }
  }

  /// Closes every hosted actor, children before their parents, drops all mirrors and
  /// releases the registry. A second shutdown fails with [`ActorError::SystemStopped`].
  pub async fn shutdown(&self) -> Result<(), ActorError> {
    if self.inner.stopped.swap(true, Ordering::AcqRel) {
      tracing::error!("Actor system {} already stopped", self.name());
      return Err(ActorError::SystemStopped);
    }

    let hosted = {
      let actors = self.inner.actors.read().await;
      let mut hosted = actors
        .iter()
        .filter_map(|(name, association)| {
          association
            .cell
            .clone()
            .map(|cell| (depth_of(name, &actors), name.clone(), cell))
        })
        .collect::<Vec<_>>();
      hosted.sort_by(|a, b| b.0.cmp(&a.0));
      hosted
    };

    for (_, name, _) in &hosted {
      self.close_actor(name).await;
    }
    self.inner.token.cancel();
    for (_, _, cell) in hosted {
      if let Some(handle) = cell.take_join_handle().await {
        let _ = handle.await;
      }
    }

    let mirrors = self.inner.actors.write().await.drain().collect::<Vec<_>>();
    for (_, association) in mirrors {
      if let Some(connection) = association.connection {
        connection.close().await;
      }
    }
    if let Some(registry) = &self.inner.config.registry {
      registry.close().await;
    }
    tracing::info!("Actor system {} closed", self.name());
    Ok(())
  }
}

fn depth_of(name: &str, actors: &HashMap<String, ActorAssociation>) -> usize {
  let mut depth = 0;
  let mut current = name;
  while let Some(association) = actors.get(current) {
    let parent = association.options.parent();
    if parent == ROOT_ACTOR_NAME || depth > actors.len() {
      break;
    }
    depth += 1;
    current = parent;
  }
  depth
}
