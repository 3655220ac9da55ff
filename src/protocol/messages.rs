//! Messages exchanged with the quiz service.
//!
//! All messages are serialized as JSON over WebSocket.

use serde::{Deserialize, Serialize};

use crate::models::Mode;

/// Messages sent from the game to the quiz service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for images and a quiz generated for them.
    GenerateQuiz { mode: Mode },

    /// Check that the service is up.
    WakeUp,
}

/// Messages sent from the quiz service to the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Images plus raw quiz text, one question per line.
    Quiz { image_urls: Vec<String>, quiz: String },

    /// The request could not be served.
    Error { reason: String },

    /// Reply to [`ClientMessage::WakeUp`].
    Awake { message: String },
}

/// Default quiz service port.
pub const DEFAULT_PORT: u16 = 8713;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let msg = ClientMessage::GenerateQuiz {
            mode: Mode::FourImage,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"GenerateQuiz\""));
        assert!(json.contains("\"mode\":\"FourImage\""));

        let msg = ServerMessage::Error {
            reason: "Could not fetch enough valid images.".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"Error\""));
    }

    #[test]
    fn test_quiz_reply_parses() {
        let json = r#"{"type":"Quiz","image_urls":["https://a"],"quiz":"Q - A - B - C - D"}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Quiz {
                image_urls: vec!["https://a".to_string()],
                quiz: "Q - A - B - C - D".to_string(),
            }
        );
    }
}
