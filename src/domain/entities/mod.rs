//! # Domain Entities
//!
//! Core domain types of the real-time collaboration layer and the traits
//! through which it reaches the relational store.
//!
//! ## Core Entities
//!
//! - **Identity**: The verified principal behind a connection
//! - **ConnectionSession**: One open, authenticated connection
//! - **RoomKey**: A chat room or meeting room a connection can join
//! - **Message**: A persisted chat message
//! - **ActivityEntry**: An audit record written after a relayed message
//!
//! ## Collaborator Traits
//!
//! The relational store is an external collaborator. Each concern has a
//! narrow trait here, implemented by the infrastructure layer
//! (dependency inversion) and by in-memory fakes in tests.

mod activity;
mod identity;
mod message;
mod room;
mod session;
mod user;

pub use activity::{ActivityEntry, ActivityLog, ACTION_SENT_MESSAGE};
pub use identity::{ConnectionId, Identity};
pub use message::{Message, MessageStore, MessageType};
pub use room::{RoomDirectory, RoomKey, RoomScope};
pub use session::ConnectionSession;
pub use user::UserDirectory;
