//! Shared data model.

pub mod entity;

pub use entity::*;
