//! Call-Handler – Initiate, Accept, Reject, End, Signal
//!
//! Alle Roster-Mutationen laufen im `CallManager`; die Handler bauen aus
//! den Ergebniswerten die Broadcasts. Signaling-Payloads werden nicht
//! interpretiert, nur an die Zielverbindung weitergereicht.

use huddle_core::{CallId, ConnectionId};
use huddle_protocol::ServerNachricht;
use std::sync::Arc;

use crate::calls::AustrittErgebnis;
use crate::server_state::RelayState;

/// Startet einen Call und benachrichtigt alle ausser dem Initiator
pub fn handle_start(
    verbindung: ConnectionId,
    username: String,
    call_id: CallId,
    state: &Arc<RelayState>,
) {
    state.calls.starten(&username, call_id.clone());
    state.an_alle_ausser_senden(
        &verbindung,
        ServerNachricht::CallStart { username, call_id },
    );
}

/// Nimmt einen Call an und verteilt das aktualisierte Roster an alle
///
/// Unbekannte Call-ID ist wiederherstellbar: loggen und ignorieren.
pub fn handle_annahme(username: String, call_id: CallId, state: &Arc<RelayState>) {
    match state.calls.annehmen(&username, &call_id) {
        Some(participants) => {
            tracing::info!(benutzer = %username, call = %call_id, "Call angenommen");
            state.an_alle_senden(ServerNachricht::CallAnnahme {
                username,
                call_id,
                participants,
            });
        }
        None => {
            tracing::warn!(benutzer = %username, call = %call_id, "Annahme fuer unbekannten Call");
        }
    }
}

/// Verteilt eine Ablehnung – das Roster aendert sich nicht
///
/// Der Ablehnende war nie Teilnehmer; es gibt nichts zu entfernen.
pub fn handle_ablehnung(username: String, call_id: CallId, state: &Arc<RelayState>) {
    tracing::info!(benutzer = %username, call = %call_id, "Call abgelehnt");
    state.an_alle_senden(ServerNachricht::CallAblehnung { username, call_id });
}

/// Beendet oder verlaesst einen Call
pub fn handle_ende(username: String, call_id: CallId, state: &Arc<RelayState>) {
    let ergebnis = state.calls.beenden(&username, &call_id);
    austritt_verteilen(&username, &call_id, ergebnis, state);
}

/// Reicht einen Signaling-Blob an die Zielverbindung weiter
///
/// Reiner Relay ohne Roster-Mutation; die Call-ID wird nicht gegen
/// existierende Calls validiert. Nicht verbundenes Ziel: loggen, verwerfen.
pub fn handle_signal(
    username: String,
    call_id: CallId,
    target: String,
    signal: serde_json::Value,
    state: &Arc<RelayState>,
) {
    tracing::debug!(von = %username, an = %target, call = %call_id, "Call-Signal");
    let zugestellt = state.an_benutzer_senden(
        &target,
        ServerNachricht::CallSignal {
            username,
            call_id,
            target: target.clone(),
            signal,
        },
    );
    if !zugestellt {
        tracing::debug!(an = %target, "Call-Signal verworfen, Ziel nicht verbunden");
    }
}

/// Entfernt einen Benutzer aus allen Calls (impliziter Austritt beim
/// Teardown) und verteilt pro Call den passenden Broadcast
pub fn calls_raeumen(username: &str, state: &Arc<RelayState>) {
    for austritt in state.calls.verlassen_alle(username) {
        austritt_verteilen(username, &austritt.call_id, austritt.ergebnis, state);
    }
}

// Uebersetzt ein Austrittsergebnis in den zugehoerigen Broadcast –
// gemeinsam fuer explizites `call-end` und impliziten Disconnect
fn austritt_verteilen(
    username: &str,
    call_id: &CallId,
    ergebnis: AustrittErgebnis,
    state: &Arc<RelayState>,
) {
    match ergebnis {
        AustrittErgebnis::InitiatorBeendet => {
            state.an_alle_senden(ServerNachricht::CallEnde {
                username: username.to_string(),
                call_id: call_id.clone(),
            });
        }
        AustrittErgebnis::TeilnehmerGegangen { teilnehmer } => {
            state.an_alle_senden(ServerNachricht::CallTeilnehmerWeg {
                username: username.to_string(),
                participants: teilnehmer,
                call_id: call_id.clone(),
            });
        }
        AustrittErgebnis::LetzterGegangen => {
            // Call entfernt, kein Broadcast ueber die Entfernung hinaus
        }
        AustrittErgebnis::Unbekannt => {
            tracing::warn!(benutzer = %username, call = %call_id, "Ende fuer unbekannten Call");
        }
    }
}
