//! # Domain Layer
//!
//! Core types of the collaboration layer, independent of any transport or
//! storage concerns.
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Collaborator traits define data access contracts
//! - Ids are plain `i64` values matching the relational schema

pub mod entities;

// Re-export commonly used types
pub use entities::*;
