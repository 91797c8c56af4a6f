//! Message-Dispatcher – Routet dekodierte Envelopes an die Handler
//!
//! Der Dispatcher ist der einzige Einstiegspunkt fuer eingehende
//! Envelopes und der einzige Ort mit Transport-Zugriff (ueber die
//! Fan-out-Primitiven des `RelayState`). Der Dispatch ist statisch
//! geprueft: jede Variante von `ClientNachricht` hat genau einen Handler.
//!
//! ## Fehlerbehandlung
//! - Ungueltiges Envelope (kein JSON, fehlendes Pflichtfeld): generische
//!   `error`-Notiz NUR an den Ausloeser, Verbindung bleibt offen
//! - Unbekannter `type`: loggen und verwerfen, keine Client-Antwort
//! - Unbekannte Referenzen (Call-ID, Zielbenutzer): in den Handlern
//!   geloggt und ignoriert
//!
//! Nichts hiervon ist fatal fuer den Prozess; es gibt keine Retries.

use huddle_core::ConnectionId;
use huddle_protocol::{dekodieren, ClientNachricht, DekodierFehler, ServerNachricht};
use std::sync::Arc;

use crate::handlers::{call_handler, chat_handler, session_handler};
use crate::handlers::session_handler::TrennungsAnlass;
use crate::server_state::RelayState;

/// Zentraler Message-Dispatcher
///
/// Pro eingehender Nachricht ein Aufruf, potenziell parallel ueber
/// verschiedene Verbindungen hinweg – die Tracker serialisieren intern.
pub struct MessageDispatcher {
    state: Arc<RelayState>,
}

impl MessageDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<RelayState>) -> Self {
        Self { state }
    }

    /// Dekodiert ein rohes Payload und verarbeitet es
    ///
    /// Die Dekodierung passiert genau einmal hier an der Grenze; die
    /// Fehlerklassen werden gemaess Taxonomie behandelt.
    pub fn roh_verarbeiten(&self, verbindung: ConnectionId, roh: &str) {
        match dekodieren(roh) {
            Ok(nachricht) => self.verarbeiten(verbindung, nachricht),
            Err(DekodierFehler::UnbekannterTyp(typ)) => {
                tracing::warn!(verbindung = %verbindung, typ = %typ, "Unbekannter Nachrichtentyp");
            }
            Err(fehler) => {
                tracing::warn!(verbindung = %verbindung, fehler = %fehler, "Ungueltiges Envelope");
                self.state.broadcaster.senden(
                    &verbindung,
                    ServerNachricht::fehler("Ungueltiges Nachrichtenformat"),
                );
            }
        }
    }

    /// Verarbeitet ein dekodiertes Envelope
    pub fn verarbeiten(&self, verbindung: ConnectionId, nachricht: ClientNachricht) {
        match nachricht {
            // -----------------------------------------------------------------
            // Sitzung & Praesenz
            // -----------------------------------------------------------------
            ClientNachricht::Beitritt { username, avatar } => {
                session_handler::handle_beitritt(verbindung, username, avatar, &self.state);
            }

            ClientNachricht::Austritt { .. } => {
                session_handler::handle_austritt(verbindung, &self.state);
            }

            ClientNachricht::Tippt {
                username,
                is_typing,
            } => {
                session_handler::handle_tippt(username, is_typing, &self.state);
            }

            // -----------------------------------------------------------------
            // Chat-Relays
            // -----------------------------------------------------------------
            ClientNachricht::Chat {
                username,
                message,
                message_id,
            } => {
                chat_handler::handle_chat(username, message, message_id, &self.state);
            }

            ClientNachricht::Datei {
                username,
                file_url,
                is_image,
                message_id,
            } => {
                chat_handler::handle_datei(username, file_url, is_image, message_id, &self.state);
            }

            ClientNachricht::Standort {
                username,
                latitude,
                longitude,
            } => {
                chat_handler::handle_standort(username, latitude, longitude, &self.state);
            }

            ClientNachricht::Bearbeiten {
                username,
                message_id,
                new_message,
            } => {
                chat_handler::handle_bearbeiten(username, message_id, new_message, &self.state);
            }

            ClientNachricht::Loeschen {
                username,
                message_id,
            } => {
                chat_handler::handle_loeschen(username, message_id, &self.state);
            }

            ClientNachricht::Reaktion {
                username,
                message_id,
                emoji,
            } => {
                chat_handler::handle_reaktion(username, message_id, emoji, &self.state);
            }

            ClientNachricht::Gelesen {
                username,
                message_id,
            } => {
                chat_handler::handle_gelesen(username, message_id, &self.state);
            }

            // -----------------------------------------------------------------
            // Call-Signaling
            // -----------------------------------------------------------------
            ClientNachricht::CallStart { username, call_id } => {
                call_handler::handle_start(verbindung, username, call_id, &self.state);
            }

            ClientNachricht::CallAnnahme { username, call_id } => {
                call_handler::handle_annahme(username, call_id, &self.state);
            }

            ClientNachricht::CallAblehnung { username, call_id } => {
                call_handler::handle_ablehnung(username, call_id, &self.state);
            }

            ClientNachricht::CallEnde { username, call_id } => {
                call_handler::handle_ende(username, call_id, &self.state);
            }

            ClientNachricht::CallSignal {
                username,
                call_id,
                target,
                signal,
            } => {
                call_handler::handle_signal(username, call_id, target, signal, &self.state);
            }
        }
    }

    /// Teardown beim Verbindungsende
    ///
    /// Muss vor dem Verwerfen der Verbindung laufen: alle Calls verlassen,
    /// Praesenz und Tipp-Status raeumen, andere benachrichtigen.
    /// Idempotent – doppelte Aufrufe sind ungefaehrlich.
    pub fn verbindung_getrennt(&self, verbindung: ConnectionId) {
        session_handler::sitzung_beenden(
            verbindung,
            TrennungsAnlass::VerbindungGetrennt,
            &self.state,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
