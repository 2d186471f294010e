//! Synchronization helpers shared by the courier actor crates and their tests.

pub mod concurrent;
