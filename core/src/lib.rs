//! Core of the courier actor runtime: named actors with FIFO mailboxes, request/reply,
//! supervision notifications, swappable behaviors and optional remote delivery.

pub mod actor;

pub use actor::*;
