#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use serde_json::Value;

  use crate::actor::actor_system::ActorSystem;
  use crate::actor::core::{Actor, ActorOptions};
  use crate::actor::message::{encode_envelope, Envelope, Payload, WireEnvelope};
  use crate::actor::ActorError;

  #[derive(Debug)]
  struct Opaque;

  #[tokio::test]
  async fn test_wire_shape_uses_actor_names() {
    let system = ActorSystem::new().await.unwrap();
    let receiver = system
      .register_actor("receiver", Actor::new(), ActorOptions::new())
      .await
      .unwrap();
    let envelope = Envelope::new("greet", Some(Payload::from("hello")), system.root(), receiver);

    let json: Value = serde_json::from_slice(&encode_envelope(&envelope).unwrap()).unwrap();

    assert_eq!(json["messageType"], "greet");
    assert_eq!(json["data"], "hello");
    assert_eq!(json["sender"], "root");
    assert_eq!(json["self"], "receiver");
    assert!(json.get("tracing").is_none());
  }

  #[tokio::test]
  async fn test_wire_carries_tracing_and_absent_data() {
    let system = ActorSystem::new().await.unwrap();
    let carrier = HashMap::from([("traceparent".to_string(), "00-abc-01".to_string())]);
    let envelope = Envelope::new("tick", None, system.root(), system.root()).with_carrier(Some(carrier.clone()));

    let wire = WireEnvelope::from_envelope(&envelope).unwrap();
    assert_eq!(wire.data, None);
    assert_eq!(wire.tracing, Some(carrier));

    let decoded = WireEnvelope::from_bytes(&wire.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, wire);
  }

  #[tokio::test]
  async fn test_opaque_payload_cannot_be_encoded() {
    let system = ActorSystem::new().await.unwrap();
    let envelope = Envelope::new("blob", Some(Payload::new(Opaque)), system.root(), system.root());
    assert!(matches!(encode_envelope(&envelope), Err(ActorError::Encoding(_))));
  }

  #[test]
  fn test_malformed_frame_is_an_encoding_error() {
    assert!(matches!(
      WireEnvelope::from_bytes(b"{not json"),
      Err(ActorError::Encoding(_))
    ));
    assert!(matches!(
      WireEnvelope::from_bytes(br#"{"messageType":"x"}"#),
      Err(ActorError::Encoding(_))
    ));
  }
}
