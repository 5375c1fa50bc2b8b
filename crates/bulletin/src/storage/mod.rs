//! Storage backends and the cached query layer in front of them.

pub mod cached;
pub mod inmemory;
