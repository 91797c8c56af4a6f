//! Gemeinsamer Zustand des Relay-Koordinators
//!
//! Haelt alle geteilten Tracker als Arc-Referenzen die sicher zwischen
//! tokio-Tasks geteilt werden koennen, und stellt die Fan-out-Primitiven
//! bereit: an alle, an alle ausser den Absender, an einen benannten
//! Benutzer. Die Zielmengen kommen aus der Registry; der Broadcaster
//! liefert nur pro Verbindung zu.

use huddle_core::ConnectionId;
use huddle_protocol::ServerNachricht;
use std::sync::Arc;

use crate::broadcast::EventBroadcaster;
use crate::calls::CallManager;
use crate::presence::TypingTracker;
use crate::receipts::ReadReceiptTracker;
use crate::registry::SessionRegistry;

/// Konfiguration fuer den Relay-Koordinator
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Anzeigename des Servers
    pub server_name: String,
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server_name: "Huddle Relay".to_string(),
            max_clients: 512,
        }
    }
}

/// Gemeinsamer Relay-Zustand (thread-safe, Arc-geteilt)
pub struct RelayState {
    /// Relay-Konfiguration
    pub config: Arc<RelayConfig>,
    /// Registry der angemeldeten Verbindungen
    pub registry: SessionRegistry,
    /// Wer tippt gerade
    pub typing: TypingTracker,
    /// Call-Roster und -Lebenszyklus
    pub calls: CallManager,
    /// Lesebestaetigungen
    pub receipts: ReadReceiptTracker,
    /// Send-Queues aller Verbindungen
    pub broadcaster: EventBroadcaster,
}

impl RelayState {
    /// Erstellt einen neuen RelayState
    pub fn neu(config: RelayConfig) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            registry: SessionRegistry::neu(),
            typing: TypingTracker::neu(),
            calls: CallManager::neu(),
            receipts: ReadReceiptTracker::neu(),
            broadcaster: EventBroadcaster::neu(),
        })
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    /// Sendet eine Nachricht an alle angemeldeten Verbindungen
    ///
    /// Fehlschlaege einzelner Verbindungen werden uebersprungen und
    /// brechen die Zustellung an die uebrigen nie ab. Gibt die Anzahl
    /// der erfolgreichen Sendungen zurueck.
    pub fn an_alle_senden(&self, nachricht: ServerNachricht) -> usize {
        let mut gesendet = 0;
        for verbindung in self.registry.verbindungen() {
            if self.broadcaster.senden(&verbindung, nachricht.clone()) {
                gesendet += 1;
            }
        }
        gesendet
    }

    /// Sendet eine Nachricht an alle angemeldeten Verbindungen ausser einer
    pub fn an_alle_ausser_senden(
        &self,
        ausgeschlossen: &ConnectionId,
        nachricht: ServerNachricht,
    ) -> usize {
        let mut gesendet = 0;
        for verbindung in self.registry.verbindungen() {
            if &verbindung == ausgeschlossen {
                continue;
            }
            if self.broadcaster.senden(&verbindung, nachricht.clone()) {
                gesendet += 1;
            }
        }
        gesendet
    }

    /// Sendet eine Nachricht an die Verbindung eines benannten Benutzers
    ///
    /// Aufloesung ueber die Registry (erster Treffer bei Duplikaten).
    /// Unbekannter Benutzer ist ein No-op und wird nur geloggt.
    pub fn an_benutzer_senden(&self, username: &str, nachricht: ServerNachricht) -> bool {
        match self.registry.verbindung_aufloesen(username) {
            Some(verbindung) => self.broadcaster.senden(&verbindung, nachricht),
            None => {
                tracing::debug!(benutzer = %username, "Zielbenutzer nicht verbunden");
                false
            }
        }
    }
}
