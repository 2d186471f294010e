use courier_actor_core_rs::actor::core::ActorOptions;
use courier_actor_core_rs::actor::RegistryError;

use super::{actor_key, actor_name, RegistryRecord};

#[test]
fn test_record_text_form() {
  let options = ActorOptions::new()
    .with_parent("root")
    .with_remote(true)
    .with_remote_type("memory")
    .with_url("memory://bus")
    .with_destination("pinger-inbox");

  let record = RegistryRecord::from_options(&options);

  assert_eq!(record.to_string(), "root#memory#memory://bus#pinger-inbox");
}

#[test]
fn test_parsed_record_is_remote_and_autoclosing() {
  let options = "supervisor#memory#memory://bus#worker-inbox"
    .parse::<RegistryRecord>()
    .unwrap()
    .into_options();

  assert_eq!(options.parent(), "supervisor");
  assert!(options.remote());
  assert!(options.autoclose());
  assert_eq!(options.remote_type(), "memory");
  assert_eq!(options.url(), "memory://bus");
  assert_eq!(options.destination(), "worker-inbox");
}

#[test]
fn test_wrong_field_count_is_rejected() {
  for value in ["", "root#memory#memory://bus", "a#b#c#d#e"] {
    assert!(matches!(
      value.parse::<RegistryRecord>(),
      Err(RegistryError::InvalidRecord(_))
    ));
  }
}

#[test]
fn test_keys() {
  assert_eq!(actor_key("pinger"), "/courier/actor/pinger");
  assert_eq!(actor_name("/courier/actor/pinger"), Some("pinger"));
  assert_eq!(actor_name("/courier/actor/"), None);
  assert_eq!(actor_name("/other/pinger"), None);
}
