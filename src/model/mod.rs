//! Domain entities.

pub mod types;
