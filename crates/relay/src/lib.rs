//! huddle-relay – Der nebenlaeufige Zustands-Koordinator
//!
//! Dieser Crate implementiert den Kern des Huddle-Relays: er nimmt
//! dekodierte Envelopes vieler gleichzeitig verbundener Clients entgegen,
//! mutiert den geteilten Sitzungszustand (Praesenz, Calls, Tipp-Status,
//! Lesebestaetigungen) und verteilt die abgeleiteten Broadcasts.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (RelayServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  dekodiert Envelopes, leert die Sende-Queue
//!     v
//! MessageDispatcher
//!     |
//!     +-- SessionHandler  (Join, Leave, Typing, Teardown)
//!     +-- ChatHandler     (Message, File, Location, Edit, Delete,
//!     |                    Reaction, Read)
//!     +-- CallHandler     (Initiate, Accept, Reject, End, Signal)
//!
//! SessionRegistry    – Verbindung -> {Benutzername, Avatar}
//! TypingTracker      – Wer tippt gerade
//! CallManager        – Call-Roster mit serialisierten Mutationen
//! ReadReceiptTracker – Nachricht -> Lesermenge
//! EventBroadcaster   – Sende-Queues aller Verbindungen
//! ```
//!
//! Alle Mutationen an einem Call laufen hinter einem Lock; der Manager
//! gibt Ergebniswerte zurueck aus denen der Router die Broadcasts baut.
//! Damit sind Broadcasts immer konsistent mit der ausloesenden Mutation.

pub mod broadcast;
pub mod calls;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod presence;
pub mod receipts;
pub mod registry;
pub mod server_state;
pub mod tcp;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use calls::CallManager;
pub use connection::ClientConnection;
pub use dispatcher::MessageDispatcher;
pub use error::{RelayError, RelayResult};
pub use presence::TypingTracker;
pub use receipts::ReadReceiptTracker;
pub use registry::SessionRegistry;
pub use server_state::{RelayConfig, RelayState};
pub use tcp::RelayServer;
