//! Read-Receipt-Tracker – Nachricht -> Lesermenge
//!
//! Der Relay speichert keine Nachrichteninhalte; pro extern vergebener
//! Nachrichten-ID wird nur die Menge der Benutzer gehalten die sie
//! bestaetigt haben. Eintraege entstehen lazy beim ersten `read` und
//! verschwinden wenn die Nachricht geloescht wird.

use dashmap::DashMap;
use huddle_core::MessageId;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Lesebestaetigungen aller bekannten Nachrichten
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct ReadReceiptTracker {
    gelesen: Arc<DashMap<MessageId, BTreeSet<String>>>,
}

impl ReadReceiptTracker {
    /// Erstellt einen neuen ReadReceiptTracker
    pub fn neu() -> Self {
        Self {
            gelesen: Arc::new(DashMap::new()),
        }
    }

    /// Markiert eine Nachricht als gelesen und gibt die komplette
    /// aktuelle Lesermenge zurueck
    ///
    /// Der Snapshot entsteht unter dem Entry-Lock, ist also konsistent
    /// mit der Mutation die ihn ausgeloest hat.
    pub fn markieren(&self, message_id: MessageId, username: &str) -> Vec<String> {
        let mut eintrag = self.gelesen.entry(message_id).or_default();
        eintrag.insert(username.to_string());
        eintrag.iter().cloned().collect()
    }

    /// Entfernt die Lesermenge einer geloeschten Nachricht (idempotent)
    pub fn loeschen(&self, message_id: &MessageId) {
        self.gelesen.remove(message_id);
    }

    /// Gibt die aktuelle Lesermenge zurueck (leer wenn unbekannt)
    pub fn leser(&self, message_id: &MessageId) -> Vec<String> {
        self.gelesen
            .get(message_id)
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for ReadReceiptTracker {
    fn default() -> Self {
        Self::neu()
    }
}
