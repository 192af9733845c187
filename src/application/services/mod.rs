//! Application Services
//!
//! Real-time collaboration services. Everything here is in-memory state
//! plus calls into the store traits of the domain layer.
//!
//! ## Available Services
//!
//! - **ConnectionAuthenticator**: Handshake credential verification
//! - **RoomRegistry**: Per-room delivery lists and broadcast
//! - **PresenceTracker**: Users with at least one live connection
//! - **TypingCoordinator**: TTL-expiring typing indicators
//! - **RoomMembershipManager**: Authorized join/leave, single room per connection
//! - **MessageRelay**: Persist-then-broadcast chat messages
//! - **MeetingSignaling**: Meeting rooms and control fan-out
//! - **CollabHub**: Wires the above together

pub mod auth_service;
pub mod hub;
pub mod meeting;
pub mod membership;
pub mod message_relay;
pub mod presence;
pub mod rooms;
pub mod typing;

pub use auth_service::{Claims, ConnectionAuthenticator, Rejection};
pub use hub::{CollabHub, HubOptions, Stores};
pub use meeting::MeetingSignaling;
pub use membership::{JoinOutcome, RoomMembershipManager, UNKNOWN_SENDER_NAME};
pub use message_relay::MessageRelay;
pub use presence::PresenceTracker;
pub use rooms::{EventSink, RoomBroadcaster, RoomRegistry};
pub use typing::{TypingCoordinator, DEFAULT_TYPING_TTL};
