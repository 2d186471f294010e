mod actor;
mod actor_options;
mod actor_ref;
mod behavior;
mod reaction;

pub use self::{actor::*, actor_options::*, actor_ref::*, behavior::*, reaction::*};
