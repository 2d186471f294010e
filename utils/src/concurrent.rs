mod async_barrier;
mod async_barrier_test;
mod count_down_latch;
mod count_down_latch_test;
mod wait_group;

pub use self::{async_barrier::*, count_down_latch::*, wait_group::*};
