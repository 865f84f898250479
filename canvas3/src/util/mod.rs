//! Internal utilities shared across the crate.

pub mod handle_alloc;
pub mod typedefs;
