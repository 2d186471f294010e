use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
  #[error("No transport registered for remote type {0}")]
  UnknownKind(String),
  #[error("No connection established with {0}")]
  NotConnected(String),
  #[error("Transport failure: {0}")]
  Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("No registry configured")]
  NotConfigured,
  #[error("Invalid registry record: {0}")]
  InvalidRecord(String),
  #[error("Registry failure: {0}")]
  Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
  #[error("Actor {0} already registered")]
  AlreadyRegistered(String),
  #[error("Actor {0} not registered")]
  NotRegistered(String),
  #[error("Registering an actor whose name is {0} is not allowed")]
  ReservedName(String),
  #[error("Reaction for {0} not yet implemented")]
  NotYetImplemented(String),
  #[error("Nothing to unbecome for {0}")]
  NothingToUnbecome(String),
  #[error("Timeout while waiting for the answer after {0:?}")]
  Timeout(Duration),
  #[error("Encoding error: {0}")]
  Encoding(String),
  #[error("Unknown actor {0}")]
  UnknownActor(String),
  #[error("Actor {0} is not hosted by this actor system")]
  NotLocal(String),
  #[error("Mailbox of actor {0} is closed")]
  MailboxClosed(String),
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),
  #[error("Actor system stopped")]
  SystemStopped,
  #[error("Reaction failed: {0}")]
  ReactionFailed(String),
  #[error(transparent)]
  Transport(#[from] TransportError),
  #[error(transparent)]
  Registry(#[from] RegistryError),
}

impl ActorError {
  pub fn reaction_failed(reason: impl Into<String>) -> Self {
    ActorError::ReactionFailed(reason.into())
  }

  pub fn is_timeout(&self) -> bool {
    matches!(self, ActorError::Timeout(_))
  }
}

static_assertions::assert_impl_all!(ActorError: Send, Sync);
static_assertions::assert_impl_all!(TransportError: Send, Sync);
static_assertions::assert_impl_all!(RegistryError: Send, Sync);
