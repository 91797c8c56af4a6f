//! Gemeinsame Identifikationstypen fuer Huddle
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Verbindungs-ID
///
/// Wird beim Accept einer Verbindung vergeben und identifiziert die
/// Verbindung ueber ihre gesamte Lebensdauer. Die Identitaet eines
/// Benutzers ist dagegen sein Benutzername (siehe Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn neu() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::neu()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Call-Kennung
///
/// Wird vom initiierenden Client vergeben und nicht interpretiert –
/// ein opaker String.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    pub fn neu(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call:{}", self.0)
    }
}

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Nachrichten-Kennung (64-bit, vom Client vergeben)
///
/// Der Relay speichert keine Nachrichteninhalte; die ID dient nur der
/// Zuordnung von Edits, Loeschungen, Reaktionen und Lesebestaetigungen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg:{}", self.0)
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_ids_sind_eindeutig() {
        assert_ne!(ConnectionId::neu(), ConnectionId::neu());
    }

    #[test]
    fn call_id_serialisiert_transparent() {
        let id = CallId::neu("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }

    #[test]
    fn message_id_serialisiert_als_zahl() {
        let id = MessageId(1700000000123);
        assert_eq!(serde_json::to_string(&id).unwrap(), "1700000000123");
        let zurueck: MessageId = serde_json::from_str("1700000000123").unwrap();
        assert_eq!(zurueck, id);
    }

    #[test]
    fn display_formate() {
        assert_eq!(CallId::neu("7").to_string(), "call:7");
        assert_eq!(MessageId(7).to_string(), "msg:7");
    }
}
