use std::fmt::{Display, Formatter};
use std::str::FromStr;

use courier_actor_core_rs::actor::core::ActorOptions;
use courier_actor_core_rs::actor::RegistryError;

#[cfg(test)]
mod tests;

pub const ACTOR_KEY_PREFIX: &str = "/courier/actor/";
const FIELD_SEPARATOR: char = '#';

pub fn actor_key(name: &str) -> String {
  format!("{}{}", ACTOR_KEY_PREFIX, name)
}

pub fn actor_name(key: &str) -> Option<&str> {
  key.strip_prefix(ACTOR_KEY_PREFIX).filter(|name| !name.is_empty())
}

/// Registry value describing where a remote actor lives: `parent#remoteType#url#destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRecord {
  pub parent: String,
  pub remote_type: String,
  pub url: String,
  pub destination: String,
}

impl RegistryRecord {
  pub fn from_options(options: &ActorOptions) -> Self {
    Self {
      parent: options.parent().to_string(),
      remote_type: options.remote_type().to_string(),
      url: options.url().to_string(),
      destination: options.destination().to_string(),
    }
  }

  /// Options of the mirror entry: always remote and closed by a poison pill.
  pub fn into_options(self) -> ActorOptions {
    ActorOptions::new()
      .with_parent(self.parent)
      .with_remote(true)
      .with_autoclose(true)
      .with_remote_type(self.remote_type)
      .with_url(self.url)
      .with_destination(self.destination)
  }
}

impl Display for RegistryRecord {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}{sep}{}{sep}{}{sep}{}",
      self.parent,
      self.remote_type,
      self.url,
      self.destination,
      sep = FIELD_SEPARATOR
    )
  }
}

impl FromStr for RegistryRecord {
  type Err = RegistryError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let fields = s.split(FIELD_SEPARATOR).collect::<Vec<_>>();
    match fields.as_slice() {
      [parent, remote_type, url, destination] => Ok(Self {
        parent: parent.to_string(),
        remote_type: remote_type.to_string(),
        url: url.to_string(),
        destination: destination.to_string(),
      }),
      _ => Err(RegistryError::InvalidRecord(format!(
        "expected 4 fields separated by '{}', got {}: {}",
        FIELD_SEPARATOR,
        fields.len(),
        s
      ))),
    }
  }
}
