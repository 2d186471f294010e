//! In-process implementations of the courier remote interfaces: a frame broker with a
//! [`Transport`](courier_actor_core_rs::actor::remote::Transport) on top of it, and a
//! key/value store with a [`Registry`](courier_actor_core_rs::actor::remote::Registry) on top of it.
//! Several actor systems sharing one broker and one store behave like separate processes
//! talking through a message bus and a directory service.

mod memory_broker;
mod memory_registry;
mod memory_store;
mod memory_transport;
mod registry_record;

pub use self::{memory_broker::*, memory_registry::*, memory_store::*, memory_transport::*, registry_record::*};
