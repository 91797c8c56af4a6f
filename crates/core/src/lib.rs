//! huddle-core – Gemeinsame Typen fuer den Huddle-Relay
//!
//! Haelt die Identifikationstypen die von Protokoll-, Relay- und
//! Server-Crate geteilt werden.

pub mod types;

pub use types::{CallId, ConnectionId, MessageId};
