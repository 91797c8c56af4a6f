//! Session-Registry – Verbindung -> Identitaet
//!
//! Ordnet lebenden Verbindungen ihren Benutzernamen und Avatar zu.
//! Die Verbindung gehoert dem Transport; die Registry referenziert sie
//! nur ueber ihre `ConnectionId`.
//!
//! ## Doppelte Benutzernamen
//! Die Registry erzwingt KEINE Eindeutigkeit der Benutzernamen: zwei
//! Verbindungen koennen denselben Namen beanspruchen. Das ist bewusst
//! beibehaltene Permissivitaet des Urspruengsverhaltens, keine Absicht –
//! `verbindung_aufloesen` gibt bei Duplikaten den ersten Treffer zurueck.

use dashmap::DashMap;
use huddle_core::ConnectionId;
use std::sync::Arc;

use crate::error::{RelayError, RelayResult};

/// Profil einer angemeldeten Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profil {
    pub username: String,
    pub avatar: String,
}

/// Registry aller angemeldeten Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
/// Eine Verbindung hat zu jedem Zeitpunkt hoechstens einen Benutzernamen.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<SessionRegistryInner>,
}

struct SessionRegistryInner {
    /// Angemeldete Verbindungen, indiziert nach ConnectionId
    benutzer: DashMap<ConnectionId, Profil>,
}

impl SessionRegistry {
    /// Erstellt eine neue SessionRegistry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(SessionRegistryInner {
                benutzer: DashMap::new(),
            }),
        }
    }

    /// Meldet eine Verbindung unter einem Benutzernamen an
    ///
    /// Ein leerer Benutzername ist der einzige Fehlerfall. Ein erneuter
    /// Beitritt derselben Verbindung ueberschreibt das Profil.
    pub fn beitreten(
        &self,
        verbindung: ConnectionId,
        username: &str,
        avatar: &str,
    ) -> RelayResult<()> {
        if username.is_empty() {
            return Err(RelayError::LeererBenutzername);
        }
        self.inner.benutzer.insert(
            verbindung,
            Profil {
                username: username.to_string(),
                avatar: avatar.to_string(),
            },
        );
        Ok(())
    }

    /// Entfernt eine Verbindung aus der Registry (idempotent)
    ///
    /// Gibt das entfernte Profil zurueck, `None` wenn die Verbindung nicht
    /// (mehr) angemeldet war. Doppeltes Entfernen ist ein No-op.
    pub fn verlassen(&self, verbindung: &ConnectionId) -> Option<Profil> {
        self.inner.benutzer.remove(verbindung).map(|(_, p)| p)
    }

    /// Gibt den Benutzernamen einer Verbindung zurueck
    pub fn username_von(&self, verbindung: &ConnectionId) -> Option<String> {
        self.inner
            .benutzer
            .get(verbindung)
            .map(|e| e.username.clone())
    }

    /// Loest einen Benutzernamen zu seiner Verbindung auf
    ///
    /// Bei doppelten Namen gewinnt der erste Treffer – reproduzierbar,
    /// aber bewusst nicht weiter definiert.
    pub fn verbindung_aufloesen(&self, username: &str) -> Option<ConnectionId> {
        self.inner
            .benutzer
            .iter()
            .find(|e| e.value().username == username)
            .map(|e| *e.key())
    }

    /// Snapshot aller Profile fuer den Praesenz-Broadcast
    ///
    /// Die Reihenfolge ist nicht garantiert; Konsumenten duerfen sich
    /// nicht darauf verlassen.
    pub fn benutzer_liste(&self) -> Vec<Profil> {
        self.inner
            .benutzer
            .iter()
            .map(|e| e.value().clone())
            .collect()
    }

    /// Snapshot aller angemeldeten Verbindungen
    pub fn verbindungen(&self) -> Vec<ConnectionId> {
        self.inner.benutzer.iter().map(|e| *e.key()).collect()
    }

    /// Gibt die Anzahl der angemeldeten Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.benutzer.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beitreten_und_verlassen() {
        let registry = SessionRegistry::neu();
        let verbindung = ConnectionId::neu();

        registry.beitreten(verbindung, "alice", "a.png").unwrap();
        assert_eq!(registry.anzahl(), 1);
        assert_eq!(registry.username_von(&verbindung).unwrap(), "alice");

        let profil = registry.verlassen(&verbindung).unwrap();
        assert_eq!(profil.username, "alice");
        assert_eq!(profil.avatar, "a.png");
        assert_eq!(registry.anzahl(), 0);
    }

    #[test]
    fn leerer_benutzername_wird_abgelehnt() {
        let registry = SessionRegistry::neu();
        let ergebnis = registry.beitreten(ConnectionId::neu(), "", "a.png");
        assert!(matches!(ergebnis, Err(RelayError::LeererBenutzername)));
        assert_eq!(registry.anzahl(), 0);
    }

    #[test]
    fn verlassen_ist_idempotent() {
        let registry = SessionRegistry::neu();
        let verbindung = ConnectionId::neu();
        registry.beitreten(verbindung, "alice", "").unwrap();

        assert!(registry.verlassen(&verbindung).is_some());
        assert!(registry.verlassen(&verbindung).is_none());
        assert!(registry.verlassen(&verbindung).is_none());
    }

    #[test]
    fn doppelte_namen_sind_erlaubt_erster_treffer_gewinnt() {
        let registry = SessionRegistry::neu();
        let v1 = ConnectionId::neu();
        let v2 = ConnectionId::neu();

        registry.beitreten(v1, "alice", "eins.png").unwrap();
        registry.beitreten(v2, "alice", "zwei.png").unwrap();
        assert_eq!(registry.anzahl(), 2);

        // Aufloesung liefert genau eine der beiden Verbindungen
        let getroffen = registry.verbindung_aufloesen("alice").unwrap();
        assert!(getroffen == v1 || getroffen == v2);

        // Nach Entfernen der getroffenen Verbindung bleibt die andere auffindbar
        registry.verlassen(&getroffen);
        let verbleibend = registry.verbindung_aufloesen("alice").unwrap();
        assert_ne!(verbleibend, getroffen);
    }

    #[test]
    fn erneuter_beitritt_ueberschreibt_profil() {
        let registry = SessionRegistry::neu();
        let verbindung = ConnectionId::neu();

        registry.beitreten(verbindung, "alice", "alt.png").unwrap();
        registry.beitreten(verbindung, "alicia", "neu.png").unwrap();

        assert_eq!(registry.anzahl(), 1);
        assert_eq!(registry.username_von(&verbindung).unwrap(), "alicia");
        assert!(registry.verbindung_aufloesen("alice").is_none());
    }

    #[test]
    fn benutzer_liste_ist_vollstaendiger_snapshot() {
        let registry = SessionRegistry::neu();
        registry.beitreten(ConnectionId::neu(), "alice", "a.png").unwrap();
        registry.beitreten(ConnectionId::neu(), "bob", "b.png").unwrap();

        let mut namen: Vec<String> = registry
            .benutzer_liste()
            .into_iter()
            .map(|p| p.username)
            .collect();
        namen.sort();
        assert_eq!(namen, vec!["alice", "bob"]);
    }

    #[test]
    fn aufloesen_unbekannter_name() {
        let registry = SessionRegistry::neu();
        assert!(registry.verbindung_aufloesen("niemand").is_none());
    }
}
