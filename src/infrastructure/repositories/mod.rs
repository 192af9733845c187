//! Repository Implementations
//!
//! PostgreSQL implementations of the store traits defined in the domain
//! layer. Each repository handles data access for one collaborator.
//!
//! ## Available Repositories
//!
//! - **PgRoomDirectory** - Room ownership and project membership
//! - **PgMessageStore** - Message inserts and recent history
//! - **PgUserDirectory** - Sender display names
//! - **PgActivityLog** - Audit entries for relayed messages
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgMessageStore, PgRoomDirectory};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let directory = PgRoomDirectory::new(pool.clone());
//!     let messages = PgMessageStore::new(pool.clone());
//! }
//! ```

pub mod activity_repository;
pub mod message_repository;
pub mod room_repository;
pub mod user_repository;

pub use activity_repository::PgActivityLog;
pub use message_repository::PgMessageStore;
pub use room_repository::PgRoomDirectory;
pub use user_repository::PgUserDirectory;
