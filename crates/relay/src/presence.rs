//! Typing-Tracker – Wer tippt gerade
//!
//! Haelt die Menge der Benutzernamen die aktuell als tippend markiert
//! sind. Jede Mutation loest im Router einen Broadcast der KOMPLETTEN
//! aktuellen Menge aus (kein Delta) – bewusste Einfachheit, die fuer
//! Verhaltensgleichheit nicht wegoptimiert werden darf.

use dashmap::DashSet;
use std::sync::Arc;

/// Menge der aktuell tippenden Benutzer
///
/// Thread-safe via Arc + DashSet. Clone teilt den inneren Zustand.
/// Einfuegen und Entfernen sind idempotent.
#[derive(Clone)]
pub struct TypingTracker {
    tippende: Arc<DashSet<String>>,
}

impl TypingTracker {
    /// Erstellt einen neuen TypingTracker
    pub fn neu() -> Self {
        Self {
            tippende: Arc::new(DashSet::new()),
        }
    }

    /// Markiert einen Benutzer als tippend (idempotent)
    pub fn setzen(&self, username: &str) {
        self.tippende.insert(username.to_string());
    }

    /// Entfernt die Tipp-Markierung (idempotent)
    ///
    /// Wird auch beim Leave/Disconnect aufgerufen.
    pub fn entfernen(&self, username: &str) {
        self.tippende.remove(username);
    }

    /// Prueft ob ein Benutzer aktuell als tippend markiert ist
    pub fn ist_tippend(&self, username: &str) -> bool {
        self.tippende.contains(username)
    }

    /// Point-in-time-Snapshot der gesamten Tipp-Menge
    ///
    /// Sortiert, damit Broadcasts deterministisch sind – Konsumenten
    /// duerfen sich trotzdem nicht auf die Reihenfolge verlassen.
    pub fn schnappschuss(&self) -> Vec<String> {
        let mut namen: Vec<String> = self.tippende.iter().map(|e| e.key().clone()).collect();
        namen.sort();
        namen
    }
}

impl Default for TypingTracker {
    fn default() -> Self {
        Self::neu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setzen_und_entfernen() {
        let tracker = TypingTracker::neu();
        tracker.setzen("alice");
        assert!(tracker.ist_tippend("alice"));
        assert_eq!(tracker.schnappschuss(), vec!["alice"]);

        tracker.entfernen("alice");
        assert!(!tracker.ist_tippend("alice"));
        assert!(tracker.schnappschuss().is_empty());
    }

    #[test]
    fn setzen_ist_idempotent() {
        let tracker = TypingTracker::neu();
        tracker.setzen("alice");
        tracker.setzen("alice");
        assert_eq!(tracker.schnappschuss().len(), 1);
    }

    #[test]
    fn entfernen_ist_idempotent() {
        let tracker = TypingTracker::neu();
        tracker.setzen("alice");
        tracker.entfernen("alice");
        tracker.entfernen("alice");
        tracker.entfernen("niemand");
        assert!(tracker.schnappschuss().is_empty());
    }

    #[test]
    fn schnappschuss_ist_sortiert() {
        let tracker = TypingTracker::neu();
        tracker.setzen("carol");
        tracker.setzen("alice");
        tracker.setzen("bob");
        assert_eq!(tracker.schnappschuss(), vec!["alice", "bob", "carol"]);
    }
}
