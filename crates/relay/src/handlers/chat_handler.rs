//! Chat-Handler – Nachrichten, Dateien, Standorte, Edits, Reaktionen
//!
//! Die Chat-Typen sind reine Relays: validieren (bereits beim Dekodieren
//! geschehen), gegebenenfalls einen Tracker mutieren, dann an alle
//! verteilen. Der Relay speichert keine Nachrichteninhalte.

use huddle_core::MessageId;
use huddle_protocol::ServerNachricht;
use std::sync::Arc;

use crate::server_state::RelayState;

/// Verteilt eine Chat-Nachricht an alle
pub fn handle_chat(
    username: String,
    message: String,
    message_id: MessageId,
    state: &Arc<RelayState>,
) {
    tracing::debug!(benutzer = %username, nachricht = %message_id, "Chat-Nachricht");
    state.an_alle_senden(ServerNachricht::Chat {
        username,
        message,
        message_id,
    });
}

/// Verteilt eine Datei-Nachricht an alle
pub fn handle_datei(
    username: String,
    file_url: String,
    is_image: bool,
    message_id: MessageId,
    state: &Arc<RelayState>,
) {
    tracing::debug!(benutzer = %username, url = %file_url, "Datei-Nachricht");
    state.an_alle_senden(ServerNachricht::Datei {
        username,
        file_url,
        is_image,
        message_id,
    });
}

/// Verteilt eine Standort-Nachricht an alle
pub fn handle_standort(username: String, latitude: f64, longitude: f64, state: &Arc<RelayState>) {
    tracing::debug!(benutzer = %username, lat = latitude, lon = longitude, "Standort");
    state.an_alle_senden(ServerNachricht::Standort {
        username,
        latitude,
        longitude,
    });
}

/// Verteilt eine Editierung an alle
pub fn handle_bearbeiten(
    username: String,
    message_id: MessageId,
    new_message: String,
    state: &Arc<RelayState>,
) {
    tracing::debug!(benutzer = %username, nachricht = %message_id, "Nachricht editiert");
    state.an_alle_senden(ServerNachricht::Bearbeitet {
        username,
        message_id,
        new_message,
    });
}

/// Verteilt eine Loeschung und raeumt die Lesermenge ab
///
/// Erst die Loesch-Notiz verteilen, dann die Lesermenge entfernen
/// (beibehaltene Reihenfolge des Urspruengsverhaltens). Der Wegfall der
/// Lesermenge selbst wird nicht gesondert verteilt.
pub fn handle_loeschen(username: String, message_id: MessageId, state: &Arc<RelayState>) {
    tracing::debug!(benutzer = %username, nachricht = %message_id, "Nachricht geloescht");
    state.an_alle_senden(ServerNachricht::Geloescht {
        username,
        message_id,
    });
    state.receipts.loeschen(&message_id);
}

/// Verteilt eine Reaktion an alle
pub fn handle_reaktion(
    username: String,
    message_id: MessageId,
    emoji: String,
    state: &Arc<RelayState>,
) {
    tracing::debug!(benutzer = %username, nachricht = %message_id, emoji = %emoji, "Reaktion");
    state.an_alle_senden(ServerNachricht::Reaktion {
        username,
        message_id,
        emoji,
    });
}

/// Verbucht eine Lesebestaetigung und verteilt die komplette Lesermenge
pub fn handle_gelesen(username: String, message_id: MessageId, state: &Arc<RelayState>) {
    let read_by = state.receipts.markieren(message_id, &username);
    tracing::debug!(benutzer = %username, nachricht = %message_id, "Lesebestaetigung");
    state.an_alle_senden(ServerNachricht::Gelesen {
        message_id,
        read_by,
    });
}
