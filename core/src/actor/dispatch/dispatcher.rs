//! Delivery of envelopes into mailboxes and the per-actor receive loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;

use crate::actor::actor_system::ActorSystem;
use crate::actor::core::{ActorCell, ActorOptions};
use crate::actor::message::{encode_envelope, Envelope};
use crate::actor::remote::TransportHandle;
use crate::actor::{ActorError, TransportError};

#[cfg(test)]
mod tests;

/// Everything needed to deliver to one actor, captured without holding the system lock.
#[derive(Debug, Clone)]
pub(crate) struct Route {
  name: String,
  options: ActorOptions,
  mailbox: Option<mpsc::Sender<Envelope>>,
  connection: Option<TransportHandle>,
}

impl Route {
  pub(crate) fn new(
    name: &str,
    options: ActorOptions,
    mailbox: Option<mpsc::Sender<Envelope>>,
    connection: Option<TransportHandle>,
  ) -> Self {
    Self {
      name: name.to_string(),
      options,
      mailbox,
      connection,
    }
  }

  pub(crate) fn name(&self) -> &str {
    &self.name
  }
}

/// Source of envelopes for a hosted actor's receive loop.
pub(crate) enum Inbox {
  Local(mpsc::Receiver<Envelope>),
  Remote {
    connection: TransportHandle,
    destination: String,
  },
}

pub(crate) async fn dispatch(route: &Route, envelope: Envelope) -> Result<(), ActorError> {
  tracing::debug!(
    "Dispatching {} from {} to {}",
    envelope.message_type(),
    envelope.sender(),
    envelope.receiver()
  );

  if !route.options.remote() {
    let mailbox = route
      .mailbox
      .as_ref()
      .ok_or_else(|| ActorError::MailboxClosed(route.name.clone()))?;
    return match mailbox.send(envelope).await {
      Ok(()) => {
        tracing::debug!("Envelope dispatched to local mailbox of {}", route.name);
        Ok(())
      }
      Err(SendError(envelope)) => {
        tracing::error!(
          "Dropped {} from {}: mailbox of {} is closed",
          envelope.message_type(),
          envelope.sender(),
          route.name
        );
        Err(ActorError::MailboxClosed(route.name.clone()))
      }
    };
  }

  let connection = route
    .connection
    .as_ref()
    .ok_or_else(|| TransportError::NotConnected(route.name.clone()))?;
  let frame = encode_envelope(&envelope).map_err(|e| {
    tracing::error!("Failed to encode {} for {}: {}", envelope.message_type(), route.name, e);
    e
  })?;
  connection.send(route.options.destination(), frame).await.map_err(|e| {
    tracing::error!("Failed to send {} to {}: {}", envelope.message_type(), route.name, e);
    ActorError::from(e)
  })?;
  tracing::debug!("Envelope dispatched to remote destination {}", route.options.destination());
  Ok(())
}

/// Drains the inbox of a hosted actor until it is closed.
///
/// Envelopes are handled one at a time, in arrival order.
pub(crate) async fn receive(system: ActorSystem, cell: Arc<ActorCell>, inbox: Inbox) {
  cell.activate();
  match inbox {
    Inbox::Local(mut mailbox) => {
      loop {
        tokio::select! {
          biased;
          _ = cell.token().cancelled() => break,
          received = mailbox.recv() => match received {
            Some(envelope) => {
              if let Err(e) = system.invoke_in(&cell, envelope).await {
                tracing::debug!("Invocation on {} ended with error: {}", cell.name(), e);
              }
            }
            None => break,
          },
        }
      }
      mailbox.close();
    }
    Inbox::Remote { connection, destination } => {
      tokio::select! {
        _ = cell.token().cancelled() => {}
        result = connection.receive(&destination, system.clone()) => {
          if let Err(e) = result {
            tracing::error!("Remote receiver of {} on {} stopped: {}", cell.name(), destination, e);
          }
        }
      }
    }
  }
  tracing::info!("Closing {} receiver", cell.name());
  cell.mark_closed();
}
