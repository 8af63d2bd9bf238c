//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, networking, or heavy logic. Content schemas, configuration
//! sections and the feature slice registry live here so every other crate can share them.

pub mod config;
pub mod constants;
pub mod registry;
pub mod schema;
