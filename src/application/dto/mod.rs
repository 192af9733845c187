//! Data Transfer Objects
//!
//! Payloads exchanged with connected clients.

pub mod events;
pub mod request;

pub use events::{
    ActiveTyper, ErrorPayload, JoinedPayload, LeftPayload, MeetingUpdatePayload,
    OutboundMessage, PresencePayload, ReadyPayload, ScreenSharingPayload, ServerEvent,
    TypingPayload, UserJoinedPayload, UserLeftPayload,
};
pub use request::{SendMessageRequest, MAX_MESSAGE_LENGTH};
