use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::actor::actor_system::ActorSystem;
use crate::actor::core::{Actor, ActorOptions, Reaction};
use crate::actor::dispatch::dispatch;
use crate::actor::message::{Context, Envelope, Payload, TracingCarrier, POISON_PILL, ROOT_ACTOR_NAME, TEMP_ACTOR_PREFIX};
use crate::actor::ActorError;

/// Name-based handle to an actor. Two refs are equal when they name the same actor.
///
/// A ref does not keep the actor alive: once the actor is closed, operations through
/// the ref fail with [`ActorError::NotRegistered`], and a new actor registered under the
/// same name is reachable through old refs.
#[derive(Clone)]
pub struct ActorRef {
  name: String,
  system: ActorSystem,
}

impl Debug for ActorRef {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ActorRef").field("name", &self.name).finish()
  }
}

impl Display for ActorRef {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name)
  }
}

impl PartialEq for ActorRef {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Eq for ActorRef {}

impl Hash for ActorRef {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}

static_assertions::assert_impl_all!(ActorRef: Send, Sync);

/// Stops a repeated send started by [`ActorRef::repeat`]. Dropping the handle does not stop it.
#[derive(Debug, Clone)]
pub struct RepeatHandle {
  token: CancellationToken,
}

impl RepeatHandle {
  pub fn cancel(&self) {
    self.token.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled()
  }
}

impl ActorRef {
  pub(crate) fn new(name: impl Into<String>, system: ActorSystem) -> Self {
    Self {
      name: name.into(),
      system,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn system(&self) -> &ActorSystem {
    &self.system
  }

  pub fn is_root(&self) -> bool {
    self.name == ROOT_ACTOR_NAME
  }

  /// Enqueues a message and returns once the receiver's mailbox accepted it.
  ///
  /// A full mailbox makes this wait for room.
  pub async fn tell(&self, message_type: &str, data: Option<Payload>, sender: &ActorRef) -> Result<(), ActorError> {
    self.send(message_type, data, sender, None).await
  }

  /// Like [`ActorRef::tell`], propagating the tracing carrier of the message being handled.
  pub async fn tell_with_context(
    &self,
    ctx: &Context,
    message_type: &str,
    data: Option<Payload>,
    sender: &ActorRef,
  ) -> Result<(), ActorError> {
    self.send(message_type, data, sender, ctx.carrier().cloned()).await
  }

  async fn send(
    &self,
    message_type: &str,
    data: Option<Payload>,
    sender: &ActorRef,
    carrier: Option<TracingCarrier>,
  ) -> Result<(), ActorError> {
    let route = self.system.route(&self.name).await.map_err(|e| {
      tracing::error!("Failed to send from {} to {}: {}", sender, self, e);
      e
    })?;
    let envelope = Envelope::new(message_type, data, sender.clone(), self.clone()).with_carrier(carrier);
    dispatch(&route, envelope).await
  }

  /// Sends a message and waits for the first reply, at most `timeout`.
  ///
  /// The reply is whatever the receiver sends back to the sender of the request, for any
  /// message type. A reply sent after the timeout is dropped.
  pub async fn ask(
    &self,
    message_type: &str,
    data: Option<Payload>,
    timeout: Duration,
  ) -> Result<Option<Payload>, ActorError> {
    self.request(message_type, data, timeout, None).await
  }

  pub async fn ask_with_context(
    &self,
    ctx: &Context,
    message_type: &str,
    data: Option<Payload>,
    timeout: Duration,
  ) -> Result<Option<Payload>, ActorError> {
    self.request(message_type, data, timeout, ctx.carrier().cloned()).await
  }

  async fn request(
    &self,
    message_type: &str,
    data: Option<Payload>,
    timeout: Duration,
    carrier: Option<TracingCarrier>,
  ) -> Result<Option<Payload>, ActorError> {
    let temp_name = format!("{}{}", TEMP_ACTOR_PREFIX, Uuid::new_v4());
    let (reply_tx, mut reply_rx) = mpsc::channel::<Option<Payload>>(1);
    let on_reply = Reaction::new(move |ctx: Context| {
      let reply_tx = reply_tx.clone();
      async move {
        // Only the first reply is kept.
        let _ = reply_tx.try_send(ctx.data().cloned());
        Ok(())
      }
    });
    let temp_actor = Actor::new()
      .with_reaction(message_type, on_reply.clone())
      .with_fallback(on_reply);

    let temp_ref = self
      .system
      .register_actor(&temp_name, temp_actor, ActorOptions::new())
      .await
      .map_err(|e| {
        tracing::error!("Failed to ask {}: {}", self, e);
        e
      })?;

    let result = match self.send(message_type, data, &temp_ref, carrier).await {
      Ok(()) => match time::timeout(timeout, reply_rx.recv()).await {
        Ok(Some(reply)) => Ok(reply),
        Ok(None) => Err(ActorError::MailboxClosed(temp_name.clone())),
        Err(_) => {
          tracing::warn!("Ask to {} timed out after {:?}", self, timeout);
          Err(ActorError::Timeout(timeout))
        }
      },
      Err(e) => Err(e),
    };

    temp_ref.close().await;
    result
  }

  /// Sends the same message every `interval`, the first one after one interval.
  ///
  /// The repetition stops when the returned handle is cancelled, the receiver's mailbox
  /// is closed, or the actor system shuts down.
  pub async fn repeat(
    &self,
    message_type: &str,
    interval: Duration,
    data: Option<Payload>,
    sender: &ActorRef,
  ) -> Result<RepeatHandle, ActorError> {
    if interval.is_zero() {
      return Err(ActorError::InvalidArgument("repeat interval must be greater than zero".to_string()));
    }
    let route = self.system.route(&self.name).await.map_err(|e| {
      tracing::error!("Failed to repeat from {} to {}: {}", sender, self, e);
      e
    })?;
    let token = self.system.child_token();
    let envelope = Envelope::new(message_type, data, sender.clone(), self.clone());
    let handle = RepeatHandle { token: token.clone() };

    tokio::spawn(async move {
      let mut ticker = time::interval_at(Instant::now() + interval, interval);
      loop {
        tokio::select! {
          biased;
          _ = token.cancelled() => break,
          _ = ticker.tick() => {
            match dispatch(&route, envelope.clone()).await {
              Ok(()) => {}
              Err(ActorError::MailboxClosed(name)) => {
                tracing::info!("Stop repeating {} to closed actor {}", envelope.message_type(), name);
                break;
              }
              Err(e) => tracing::error!("Repeat of {} to {} failed: {}", envelope.message_type(), envelope.receiver(), e),
            }
          }
        }
      }
      tracing::debug!("Repeat of {} to {} stopped", envelope.message_type(), envelope.receiver());
    });
    Ok(handle)
  }

  /// Sends a poison pill without waiting for the mailbox to accept it.
  pub async fn ask_for_close(&self, sender: &ActorRef) {
    let route = match self.system.route(&self.name).await {
      Ok(route) => route,
      Err(_) => {
        tracing::info!("Actor {} already closed", self);
        return;
      }
    };
    let envelope = Envelope::new(POISON_PILL, None, sender.clone(), self.clone());
    tokio::spawn(async move {
      let receiver = envelope.receiver().clone();
      if let Err(e) = dispatch(&route, envelope).await {
        tracing::error!("Failed to ask {} to close: {}", receiver, e);
      }
    });
  }

  /// Closes the actor right away. Closing an already closed actor does nothing.
  pub async fn close(&self) {
    self.system.close_actor(&self.name).await;
  }

  /// Replaces the reaction to `message_type`, remembering the replaced one.
  pub async fn become_reaction(&self, message_type: &str, reaction: Reaction) -> Result<(), ActorError> {
    let cell = self.system.local_cell(&self.name).await?;
    cell.become_reaction(message_type, reaction).await.map_err(|e| {
      tracing::error!("Become of {} on {} failed: {}", message_type, self, e);
      e
    })
  }

  pub async fn unbecome_reaction(&self, message_type: &str) -> Result<(), ActorError> {
    let cell = self.system.local_cell(&self.name).await?;
    cell.unbecome_reaction(message_type).await.map_err(|e| {
      tracing::error!("Unbecome of {} on {} failed: {}", message_type, self, e);
      e
    })
  }

  /// Re-sends the message being handled to each destination, keeping its original sender.
  ///
  /// Every destination is attempted; the first failure is returned.
  pub async fn forward(&self, ctx: &Context, destinations: &[&str]) -> Result<(), ActorError> {
    let mut first_error = None;
    for destination in destinations {
      let result = match self.system.actor_of(destination).await {
        Ok(target) => {
          target
            .send(
              ctx.message_type(),
              ctx.data().cloned(),
              ctx.sender(),
              ctx.carrier().cloned(),
            )
            .await
        }
        Err(e) => {
          tracing::error!("Actor {} is not part of the actor system", destination);
          Err(e)
        }
      };
      if let Err(e) = result {
        first_error.get_or_insert(e);
      }
    }
    first_error.map_or(Ok(()), Err)
  }

  /// The actor this one was spawned under; the root sentinel for top-level actors.
  pub async fn parent(&self) -> Result<ActorRef, ActorError> {
    let association = self.system.association(&self.name).await?;
    let parent = association.options().parent();
    if parent == ROOT_ACTOR_NAME {
      return Ok(self.system.root());
    }
    Ok(ActorRef::new(parent, self.system.clone()))
  }

  pub fn log_info(&self, message: impl Display) {
    tracing::info!(actor = %self.name, "{}", message);
  }

  pub fn log_error(&self, message: impl Display) {
    tracing::error!(actor = %self.name, "{}", message);
  }
}
