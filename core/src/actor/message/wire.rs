use serde::{Deserialize, Serialize};

use crate::actor::core::ActorRef;
use crate::actor::message::{Envelope, Payload, TracingCarrier};
use crate::actor::ActorError;

/// JSON shape of an envelope crossing a transport. Actors travel by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvelope {
  #[serde(rename = "messageType")]
  pub message_type: String,
  #[serde(default)]
  pub data: Option<String>,
  pub sender: String,
  #[serde(rename = "self")]
  pub receiver: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tracing: Option<TracingCarrier>,
}

impl WireEnvelope {
  pub fn from_envelope(envelope: &Envelope) -> Result<Self, ActorError> {
    let data = envelope.data().map(Payload::to_wire_string).transpose()?;
    Ok(Self {
      message_type: envelope.message_type().to_string(),
      data,
      sender: envelope.sender().name().to_string(),
      receiver: envelope.receiver().name().to_string(),
      tracing: envelope.carrier().cloned(),
    })
  }

  pub fn to_bytes(&self) -> Result<Vec<u8>, ActorError> {
    serde_json::to_vec(self).map_err(|e| ActorError::Encoding(e.to_string()))
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self, ActorError> {
    serde_json::from_slice(bytes).map_err(|e| ActorError::Encoding(e.to_string()))
  }

  /// Rebuilds an envelope once both names were resolved. Data arrives as a `String` payload.
  pub fn into_envelope(self, sender: ActorRef, receiver: ActorRef) -> Envelope {
    Envelope::new(self.message_type, self.data.map(Payload::new), sender, receiver).with_carrier(self.tracing)
  }
}

pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>, ActorError> {
  WireEnvelope::from_envelope(envelope)?.to_bytes()
}
