use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::actor::ActorError;

/// Type-erased message data. Cheap to clone; the value is shared, never copied.
#[derive(Clone)]
pub struct Payload {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

macro_rules! display_as_wire {
  ($payload:expr, $($ty:ty),*) => {
    $(
      if let Some(value) = $payload.downcast_ref::<$ty>() {
        return Ok(value.to_string());
      }
    )*
  };
}

impl Payload {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self {
      value: Arc::new(value),
      type_name: std::any::type_name::<T>(),
    }
  }

  pub fn is<T: Any>(&self) -> bool {
    (*self.value).is::<T>()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    (*self.value).downcast_ref::<T>()
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// Renders the payload as the text carried by remote envelopes.
  ///
  /// Strings, numbers, booleans, chars and `serde_json::Value` have a textual form;
  /// anything else is an [`ActorError::Encoding`].
  pub fn to_wire_string(&self) -> Result<String, ActorError> {
    if let Some(value) = self.downcast_ref::<serde_json::Value>() {
      return Ok(match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
      });
    }
    display_as_wire!(
      self,
      String,
      &'static str,
      char,
      bool,
      i8,
      i16,
      i32,
      i64,
      i128,
      isize,
      u8,
      u16,
      u32,
      u64,
      u128,
      usize,
      f32,
      f64
    );
    Err(ActorError::Encoding(format!(
      "payload of type {} has no wire representation",
      self.type_name
    )))
  }
}

impl Debug for Payload {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.to_wire_string() {
      Ok(text) => f.debug_tuple("Payload").field(&text).finish(),
      Err(_) => write!(f, "Payload(<{}>)", self.type_name),
    }
  }
}

impl From<String> for Payload {
  fn from(value: String) -> Self {
    Payload::new(value)
  }
}

impl From<&'static str> for Payload {
  fn from(value: &'static str) -> Self {
    Payload::new(value)
  }
}

static_assertions::assert_impl_all!(Payload: Send, Sync);

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug)]
  struct Opaque;

  #[test]
  fn test_downcast() {
    let payload = Payload::new(42u32);
    assert!(payload.is::<u32>());
    assert_eq!(payload.downcast_ref::<u32>(), Some(&42));
    assert_eq!(payload.downcast_ref::<i32>(), None);
  }

  #[test]
  fn test_wire_string() {
    assert_eq!(Payload::from("ping").to_wire_string().unwrap(), "ping");
    assert_eq!(Payload::new(1.5f64).to_wire_string().unwrap(), "1.5");
    assert_eq!(
      Payload::new(serde_json::json!({"a": 1})).to_wire_string().unwrap(),
      "{\"a\":1}"
    );
  }

  #[test]
  fn test_opaque_payload_is_not_encodable() {
    let result = Payload::new(Opaque).to_wire_string();
    assert!(matches!(result, Err(ActorError::Encoding(_))));
    assert!(format!("{:?}", Payload::new(Opaque)).contains("Opaque"));
  }
}
