use std::collections::HashMap;

use crate::actor::remote::{RegistryHandle, TransportFactory};
use crate::actor::ConfigOption;

pub const DEFAULT_SYSTEM_NAME: &str = "courier";
pub const DEFAULT_BUFFER_SIZE: usize = 64;

#[derive(Debug, Clone)]
pub struct Config {
  pub system_name: String,
  /// Mailbox capacity used when an actor's options leave `buffer_size` at zero.
  pub default_buffer_size: usize,
  /// A configured registry turns the system into a distributed one.
  pub registry: Option<RegistryHandle>,
  pub registry_endpoints: Vec<String>,
  /// Transport factories keyed by remote type.
  pub transports: HashMap<String, TransportFactory>,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      system_name: DEFAULT_SYSTEM_NAME.to_string(),
      default_buffer_size: DEFAULT_BUFFER_SIZE,
      registry: None,
      registry_endpoints: Vec::new(),
      transports: HashMap::new(),
    }
  }
}

impl Config {
  pub fn from(options: impl IntoIterator<Item = ConfigOption>) -> Config {
    let mut config = Config::default();
    for option in options {
      option.apply(&mut config);
    }
    config
  }

  pub fn is_distributed(&self) -> bool {
    self.registry.is_some()
  }

  pub fn transport_factory(&self, remote_type: &str) -> Option<&TransportFactory> {
    self.transports.get(remote_type)
  }
}
