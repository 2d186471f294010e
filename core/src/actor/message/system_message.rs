/// Name of the sentinel that parents top-level actors. It never hosts a mailbox.
pub const ROOT_ACTOR_NAME: &str = "root";

/// Asks the receiver to close itself.
pub const POISON_PILL: &str = "courierPoisonPill";
/// Sent by a closing child to its parent; the payload carries the child's name.
pub const CHILD_CLOSED: &str = "courierChildClosed";
pub const HEARTBEAT_REQUEST: &str = "courierHeartbeatRequest";
pub const HEARTBEAT_REPLY: &str = "courierHeartbeatReply";

pub(crate) const TEMP_ACTOR_PREFIX: &str = "temp_";

pub fn is_system_message(message_type: &str) -> bool {
  matches!(
    message_type,
    POISON_PILL | CHILD_CLOSED | HEARTBEAT_REQUEST | HEARTBEAT_REPLY
  )
}
