//! Quiz service module.
//!
//! Answers quiz requests over WebSocket from an offline deck.

mod server;

pub use server::{run, serve};
