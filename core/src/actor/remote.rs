mod registry;
mod transport;

pub use self::{registry::*, transport::*};
