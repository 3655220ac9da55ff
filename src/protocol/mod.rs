mod messages;

pub use messages::{ClientMessage, DEFAULT_PORT, ServerMessage};
