//! Day-level time bookkeeping for the allocator.

mod grid;

pub use grid::{Interval, OutOfSpace, TimeGrid};
