use std::time::Duration;

use crate::actor::message::ROOT_ACTOR_NAME;

/// Per-actor settings, fixed once the actor is spawned.
///
/// A zero `buffer_size` falls back to the system's default mailbox capacity, and a zero
/// `heartbeat_interval` disables heartbeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorOptions {
  parent: String,
  remote: bool,
  autoclose: bool,
  remote_type: String,
  url: String,
  destination: String,
  buffer_size: usize,
  heartbeat_interval: Duration,
}

impl Default for ActorOptions {
  fn default() -> Self {
    Self {
      parent: ROOT_ACTOR_NAME.to_string(),
      remote: false,
      autoclose: false,
      remote_type: String::new(),
      url: String::new(),
      destination: String::new(),
      buffer_size: 0,
      heartbeat_interval: Duration::ZERO,
    }
  }
}

impl ActorOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Spawning overrides the parent; registries use it to describe mirrored actors.
  pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
    self.parent = parent.into();
    self
  }

  pub fn with_remote(mut self, remote: bool) -> Self {
    self.remote = remote;
    self
  }

  pub fn with_autoclose(mut self, autoclose: bool) -> Self {
    self.autoclose = autoclose;
    self
  }

  pub fn with_remote_type(mut self, remote_type: impl Into<String>) -> Self {
    self.remote_type = remote_type.into();
    self
  }

  pub fn with_url(mut self, url: impl Into<String>) -> Self {
    self.url = url.into();
    self
  }

  pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
    self.destination = destination.into();
    self
  }

  pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
    self.buffer_size = buffer_size;
    self
  }

  pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
    self.heartbeat_interval = interval;
    self
  }

  pub fn parent(&self) -> &str {
    &self.parent
  }

  pub fn remote(&self) -> bool {
    self.remote
  }

  pub fn autoclose(&self) -> bool {
    self.autoclose
  }

  pub fn remote_type(&self) -> &str {
    &self.remote_type
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub fn destination(&self) -> &str {
    &self.destination
  }

  pub fn buffer_size(&self) -> usize {
    self.buffer_size
  }

  pub fn heartbeat_interval(&self) -> Duration {
    self.heartbeat_interval
  }
}
