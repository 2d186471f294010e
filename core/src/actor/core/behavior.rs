use std::collections::HashMap;

use crate::actor::core::Reaction;
use crate::actor::ActorError;

/// Reaction table of one actor.
///
/// `become_reaction` keeps exactly one previous reaction per message type, so a second
/// `become` for the same type overwrites the saved one and `unbecome` restores only the
/// most recently replaced reaction.
#[derive(Debug, Clone, Default)]
pub struct Behavior {
  reactions: HashMap<String, Reaction>,
  history: HashMap<String, Reaction>,
  fallback: Option<Reaction>,
}

impl Behavior {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn react(&mut self, message_type: &str, reaction: Reaction) {
    self.reactions.insert(message_type.to_string(), reaction);
  }

  /// Catch-all used for message types without their own reaction.
  pub fn react_any(&mut self, reaction: Reaction) {
    self.fallback = Some(reaction);
  }

  pub fn reaction_for(&self, message_type: &str) -> Option<Reaction> {
    self.reactions.get(message_type).or(self.fallback.as_ref()).cloned()
  }

  pub fn has_reaction(&self, message_type: &str) -> bool {
    self.reactions.contains_key(message_type)
  }

  pub fn become_reaction(&mut self, message_type: &str, reaction: Reaction) -> Result<(), ActorError> {
    if !self.has_reaction(message_type) {
      return Err(ActorError::NotYetImplemented(message_type.to_string()));
    }
    if let Some(previous) = self.reactions.insert(message_type.to_string(), reaction) {
      self.history.insert(message_type.to_string(), previous);
    }
    Ok(())
  }

  pub fn unbecome_reaction(&mut self, message_type: &str) -> Result<(), ActorError> {
    let previous = self
      .history
      .remove(message_type)
      .ok_or_else(|| ActorError::NothingToUnbecome(message_type.to_string()))?;
    self.reactions.insert(message_type.to_string(), previous);
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.reactions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.reactions.is_empty() && self.fallback.is_none()
  }
}
