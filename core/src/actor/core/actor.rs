use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::actor::core::{ActorOptions, Behavior, Reaction};
use crate::actor::message::Context;
use crate::actor::ActorError;

/// Definition of an actor: the reactions it starts with.
///
/// ```ignore
/// let echoer = Actor::new().react("ping", |ctx: Context| async move {
///   ctx.sender().tell("pong", None, ctx.self_ref()).await
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Actor {
  behavior: Behavior,
}

impl Actor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn react<F, Fut>(self, message_type: &str, f: F) -> Self
  where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActorError>> + Send + 'static, {
    self.with_reaction(message_type, Reaction::new(f))
  }

  pub fn react_any<F, Fut>(self, f: F) -> Self
  where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActorError>> + Send + 'static, {
    self.with_fallback(Reaction::new(f))
  }

  pub fn with_reaction(mut self, message_type: &str, reaction: Reaction) -> Self {
    self.behavior.react(message_type, reaction);
    self
  }

  pub fn with_fallback(mut self, reaction: Reaction) -> Self {
    self.behavior.react_any(reaction);
    self
  }

  pub(crate) fn into_behavior(self) -> Behavior {
    self.behavior
  }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
  Spawned = 0,
  Active = 1,
  Closing = 2,
  Closed = 3,
}

impl From<u8> for ActorState {
  fn from(value: u8) -> Self {
    match value {
      0 => ActorState::Spawned,
      1 => ActorState::Active,
      2 => ActorState::Closing,
      _ => ActorState::Closed,
    }
  }
}

/// Runtime state of an actor hosted by the local system.
#[derive(Debug)]
pub(crate) struct ActorCell {
  name: String,
  options: ActorOptions,
  behavior: RwLock<Behavior>,
  state: AtomicU8,
  token: CancellationToken,
  join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ActorCell {
  pub(crate) fn new(name: &str, options: ActorOptions, behavior: Behavior, token: CancellationToken) -> Self {
    Self {
      name: name.to_string(),
      options,
      behavior: RwLock::new(behavior),
      state: AtomicU8::new(ActorState::Spawned as u8),
      token,
      join_handle: Mutex::new(None),
    }
  }

  pub(crate) fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn options(&self) -> &ActorOptions {
    &self.options
  }

  pub(crate) fn token(&self) -> &CancellationToken {
    &self.token
  }

  pub(crate) fn state(&self) -> ActorState {
    ActorState::from(self.state.load(Ordering::Acquire))
  }

  pub(crate) fn activate(&self) {
    let _ = self.state.compare_exchange(
      ActorState::Spawned as u8,
      ActorState::Active as u8,
      Ordering::AcqRel,
      Ordering::Acquire,
    );
  }

  /// Moves the actor to `Closing`. Only the first caller wins.
  pub(crate) fn begin_closing(&self) -> bool {
    let mut current = self.state.load(Ordering::Acquire);
    loop {
      if matches!(ActorState::from(current), ActorState::Closing | ActorState::Closed) {
        return false;
      }
      match self
        .state
        .compare_exchange(current, ActorState::Closing as u8, Ordering::AcqRel, Ordering::Acquire)
      {
        Ok(_) => return true,
        Err(actual) => current = actual,
      }
    }
  }

  pub(crate) fn mark_closed(&self) {
    self.state.store(ActorState::Closed as u8, Ordering::Release);
  }

  pub(crate) async fn reaction_for(&self, message_type: &str) -> Option<Reaction> {
    self.behavior.read().await.reaction_for(message_type)
  }

  /// Whether `message_type` has its own reaction, ignoring the catch-all.
  pub(crate) async fn has_reaction(&self, message_type: &str) -> bool {
    self.behavior.read().await.has_reaction(message_type)
  }

  pub(crate) async fn become_reaction(&self, message_type: &str, reaction: Reaction) -> Result<(), ActorError> {
    self.behavior.write().await.become_reaction(message_type, reaction)
  }

  pub(crate) async fn unbecome_reaction(&self, message_type: &str) -> Result<(), ActorError> {
    self.behavior.write().await.unbecome_reaction(message_type)
  }

  pub(crate) async fn set_join_handle(&self, handle: JoinHandle<()>) {
    *self.join_handle.lock().await = Some(handle);
  }

  pub(crate) async fn take_join_handle(&self) -> Option<JoinHandle<()>> {
    self.join_handle.lock().await.take()
  }
}
