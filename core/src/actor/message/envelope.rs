use std::any::Any;
use std::collections::HashMap;

use crate::actor::core::ActorRef;
use crate::actor::message::Payload;

/// Opaque tracing context propagated alongside a message.
pub type TracingCarrier = HashMap<String, String>;

/// One message in flight. Immutable once built.
#[derive(Debug, Clone)]
pub struct Envelope {
  message_type: String,
  data: Option<Payload>,
  sender: ActorRef,
  receiver: ActorRef,
  carrier: Option<TracingCarrier>,
}

impl Envelope {
  pub fn new(message_type: impl Into<String>, data: Option<Payload>, sender: ActorRef, receiver: ActorRef) -> Self {
    Self {
      message_type: message_type.into(),
      data,
      sender,
      receiver,
      carrier: None,
    }
  }

  pub fn with_carrier(mut self, carrier: Option<TracingCarrier>) -> Self {
    self.carrier = carrier;
    self
  }

  pub fn message_type(&self) -> &str {
    &self.message_type
  }

  pub fn data(&self) -> Option<&Payload> {
    self.data.as_ref()
  }

  pub fn sender(&self) -> &ActorRef {
    &self.sender
  }

  pub fn receiver(&self) -> &ActorRef {
    &self.receiver
  }

  pub fn carrier(&self) -> Option<&TracingCarrier> {
    self.carrier.as_ref()
  }
}

/// The envelope being handled, as handed to a reaction.
#[derive(Debug, Clone)]
pub struct Context {
  envelope: Envelope,
}

impl Context {
  pub(crate) fn new(envelope: Envelope) -> Self {
    Self { envelope }
  }

  pub fn message_type(&self) -> &str {
    self.envelope.message_type()
  }

  pub fn data(&self) -> Option<&Payload> {
    self.envelope.data()
  }

  pub fn data_as<T: Any>(&self) -> Option<&T> {
    self.data().and_then(|data| data.downcast_ref::<T>())
  }

  pub fn sender(&self) -> &ActorRef {
    self.envelope.sender()
  }

  /// The actor handling this message.
  pub fn self_ref(&self) -> &ActorRef {
    self.envelope.receiver()
  }

  pub fn carrier(&self) -> Option<&TracingCarrier> {
    self.envelope.carrier()
  }

  pub fn envelope(&self) -> &Envelope {
    &self.envelope
  }

  pub fn into_envelope(self) -> Envelope {
    self.envelope
  }
}
