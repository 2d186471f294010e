mod envelope;
mod envelope_test;
mod payload;
mod system_message;
mod wire;

pub use self::{envelope::*, payload::*, system_message::*, wire::*};
