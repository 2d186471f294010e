mod actor_error;
pub mod actor_system;
mod config;
mod config_option;
pub mod core;
pub mod dispatch;
pub mod message;
pub mod remote;

pub use {self::actor_error::*, self::config::*, self::config_option::*};
