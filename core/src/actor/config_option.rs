use crate::actor::remote::{RegistryHandle, TransportFactory};
use crate::actor::Config;

#[derive(Debug, Clone)]
pub enum ConfigOption {
  SetSystemName(String),
  SetDefaultBufferSize(usize),
  SetRegistry(RegistryHandle, Vec<String>),
  PutTransport(String, TransportFactory),
}

impl ConfigOption {
  pub fn apply(&self, config: &mut Config) {
    match self {
      ConfigOption::SetSystemName(name) => {
        config.system_name = name.clone();
      }
      ConfigOption::SetDefaultBufferSize(size) => {
        config.default_buffer_size = (*size).max(1);
      }
      ConfigOption::SetRegistry(registry, endpoints) => {
        config.registry = Some(registry.clone());
        config.registry_endpoints = endpoints.clone();
      }
      ConfigOption::PutTransport(remote_type, factory) => {
        config.transports.insert(remote_type.clone(), factory.clone());
      }
    }
  }

  pub fn with_system_name(name: &str) -> ConfigOption {
    ConfigOption::SetSystemName(name.to_string())
  }

  pub fn with_default_buffer_size(size: usize) -> ConfigOption {
    ConfigOption::SetDefaultBufferSize(size)
  }

  pub fn with_registry<I, S>(registry: RegistryHandle, endpoints: I) -> ConfigOption
  where
    I: IntoIterator<Item = S>,
    S: Into<String>, {
    ConfigOption::SetRegistry(registry, endpoints.into_iter().map(Into::into).collect())
  }

  pub fn with_transport(remote_type: &str, factory: TransportFactory) -> ConfigOption {
    ConfigOption::PutTransport(remote_type.to_string(), factory)
  }
}
