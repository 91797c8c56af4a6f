//! Event-Broadcaster – Verwaltet die Sende-Queues aller Verbindungen
//!
//! Jede Verbindung registriert beim Accept eine bounded Queue; der
//! Verbindungs-Task leert sie und schreibt auf den Socket. Damit ist die
//! Reihenfolge der Sendungen pro Verbindung garantiert, und ein langsamer
//! oder geschlossener Client blockiert nie die Zustellung an andere.

use dashmap::DashMap;
use huddle_core::ConnectionId;
use huddle_protocol::ServerNachricht;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub verbindung: ConnectionId,
    pub tx: mpsc::Sender<ServerNachricht>,
}

impl ClientSender {
    /// Sendet eine Nachricht nicht-blockierend an die Verbindung
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    /// Der Fehlschlag wird geloggt und uebersprungen – er darf die
    /// Zustellung an andere Verbindungen nie abbrechen.
    pub fn senden(&self, nachricht: ServerNachricht) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(verbindung = %self.verbindung, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(verbindung = %self.verbindung, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Broadcaster fuer alle verbundenen Clients
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
/// Die Zielmengen (alle, alle ausser Absender, einzelner Benutzer) werden
/// vom Router aus der Registry berechnet; der Broadcaster kennt nur
/// Verbindungen und ihre Queues.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    /// Send-Queues, indiziert nach ConnectionId
    clients: DashMap<ConnectionId, ClientSender>,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                clients: DashMap::new(),
            }),
        }
    }

    /// Registriert eine neue Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Der Verbindungs-Task liest aus dieser Queue und sendet via Socket.
    pub fn registrieren(&self, verbindung: ConnectionId) -> mpsc::Receiver<ServerNachricht> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.inner
            .clients
            .insert(verbindung, ClientSender { verbindung, tx });
        tracing::debug!(verbindung = %verbindung, "Verbindung im Broadcaster registriert");
        rx
    }

    /// Entfernt eine Verbindung aus dem Broadcaster (idempotent)
    pub fn entfernen(&self, verbindung: &ConnectionId) {
        self.inner.clients.remove(verbindung);
        tracing::debug!(verbindung = %verbindung, "Verbindung aus Broadcaster entfernt");
    }

    /// Sendet eine Nachricht an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und die Nachricht
    /// eingereiht wurde.
    pub fn senden(&self, verbindung: &ConnectionId, nachricht: ServerNachricht) -> bool {
        match self.inner.clients.get(verbindung) {
            Some(sender) => sender.senden(nachricht),
            None => {
                tracing::debug!(verbindung = %verbindung, "Senden an unbekannte Verbindung");
                false
            }
        }
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, verbindung: &ConnectionId) -> bool {
        self.inner.clients.contains_key(verbindung)
    }

    /// Gibt die Anzahl der registrierten Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.clients.len()
    }
}

impl Default for EventBroadcaster {
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

    fn test_nachricht(name: &str) -> ServerNachricht {
        ServerNachricht::Beitritt {
            username: name.to_string(),
        }
    }

    #[tokio::test]
    async fn registrieren_und_senden() {
        let broadcaster = EventBroadcaster::neu();
        let verbindung = ConnectionId::neu();

        let mut rx = broadcaster.registrieren(verbindung);
        assert!(broadcaster.ist_registriert(&verbindung));

        assert!(broadcaster.senden(&verbindung, test_nachricht("alice")));

        let empfangen = rx.try_recv().expect("Nachricht muss vorhanden sein");
        assert!(matches!(empfangen, ServerNachricht::Beitritt { username } if username == "alice"));
    }

    #[tokio::test]
    async fn reihenfolge_pro_verbindung_bleibt_erhalten() {
        let broadcaster = EventBroadcaster::neu();
        let verbindung = ConnectionId::neu();
        let mut rx = broadcaster.registrieren(verbindung);

        for name in ["a", "b", "c"] {
            broadcaster.senden(&verbindung, test_nachricht(name));
        }

        for erwartet in ["a", "b", "c"] {
            match rx.try_recv().unwrap() {
                ServerNachricht::Beitritt { username } => assert_eq!(username, erwartet),
                andere => panic!("Falsche Variante: {:?}", andere),
            }
        }
    }

    #[tokio::test]
    async fn senden_an_unbekannte_verbindung_schlaegt_leise_fehl() {
        let broadcaster = EventBroadcaster::neu();
        assert!(!broadcaster.senden(&ConnectionId::neu(), test_nachricht("x")));
    }

    #[tokio::test]
    async fn volle_queue_verwirft_statt_zu_blockieren() {
        let broadcaster = EventBroadcaster::neu();
        let verbindung = ConnectionId::neu();
        let _rx = broadcaster.registrieren(verbindung);

        for _ in 0..64 {
            assert!(broadcaster.senden(&verbindung, test_nachricht("voll")));
        }
        // Queue ist voll – weitere Sendung wird verworfen, kein Blockieren
        assert!(!broadcaster.senden(&verbindung, test_nachricht("zuviel")));
    }

    #[tokio::test]
    async fn geschlossene_queue_wird_uebersprungen() {
        let broadcaster = EventBroadcaster::neu();
        let verbindung = ConnectionId::neu();
        let rx = broadcaster.registrieren(verbindung);
        drop(rx);

        assert!(!broadcaster.senden(&verbindung, test_nachricht("weg")));
    }

    #[tokio::test]
    async fn entfernen_ist_idempotent() {
        let broadcaster = EventBroadcaster::neu();
        let verbindung = ConnectionId::neu();
        let _rx = broadcaster.registrieren(verbindung);

        broadcaster.entfernen(&verbindung);
        broadcaster.entfernen(&verbindung);
        assert!(!broadcaster.ist_registriert(&verbindung));
        assert_eq!(broadcaster.anzahl(), 0);
    }
}
