//! Request DTOs
//!
//! Validated payloads of client requests that reach the store.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::MessageType;

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Send message request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(
        length(max = 4000, message = "Message must be at most 4000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub body: String,

    #[serde(default, rename = "type")]
    pub message_type: MessageType,
}

impl SendMessageRequest {
    pub fn new(body: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            body: body.into(),
            message_type,
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Message must not be empty".into());
        return Err(err);
    }
    Ok(())
}
