//! # Response Formatting
//!
//! Shared success-response shapes. Lists and records are returned bare; only
//! confirmations wrap a message.

use serde::Serialize;

/// Confirmation response for deletes
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_serialization() {
        let response = MessageResponse::new("student deleted");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "student deleted");
    }
}
