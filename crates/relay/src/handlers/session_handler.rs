//! Session-Handler – Join, Leave, Typing und der gemeinsame Teardown
//!
//! Expliziter `leave` und impliziter Disconnect laufen durch EINE
//! Teardown-Prozedur (`sitzung_beenden`), parametrisiert nur durch den
//! Anlass. Damit koennen die beiden Pfade nicht divergieren.

use huddle_core::ConnectionId;
use huddle_protocol::{BenutzerEintrag, ServerNachricht};
use std::sync::Arc;

use crate::error::RelayError;
use crate::handlers::call_handler;
use crate::server_state::RelayState;

/// Anlass eines Sitzungsendes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrennungsAnlass {
    /// Der Client hat explizit `leave` geschickt
    Explizit,
    /// Die Verbindung wurde getrennt (Socket zu, Timeout, Fehler)
    VerbindungGetrennt,
}

/// Verarbeitet einen Beitritt
///
/// Installiert das Profil, verteilt `join` und die volle Praesenz-Liste
/// an alle (einschliesslich des Beitretenden), und schickt dem neuen
/// Client einen `call-info`-Snapshot pro laufendem Call.
pub fn handle_beitritt(
    verbindung: ConnectionId,
    username: String,
    avatar: String,
    state: &Arc<RelayState>,
) {
    match state.registry.beitreten(verbindung, &username, &avatar) {
        Ok(()) => {}
        Err(RelayError::LeererBenutzername) => {
            state.broadcaster.senden(
                &verbindung,
                ServerNachricht::fehler("Benutzername darf nicht leer sein"),
            );
            return;
        }
        Err(e) => {
            tracing::warn!(verbindung = %verbindung, fehler = %e, "Beitritt fehlgeschlagen");
            return;
        }
    }

    tracing::info!(benutzer = %username, avatar = %avatar, "Benutzer beigetreten");

    state.an_alle_senden(ServerNachricht::Beitritt {
        username: username.clone(),
    });
    benutzerliste_verteilen(state);

    // Spaete Beitreter bekommen den Zustand aller laufenden Calls,
    // einmalig als Push, kein Abo
    for info in state.calls.aktive_calls() {
        state.broadcaster.senden(
            &verbindung,
            ServerNachricht::CallInfo {
                call_id: info.call_id,
                initiator: info.initiator,
                participants: info.teilnehmer,
            },
        );
    }
}

/// Verarbeitet einen expliziten Austritt
pub fn handle_austritt(verbindung: ConnectionId, state: &Arc<RelayState>) {
    sitzung_beenden(verbindung, TrennungsAnlass::Explizit, state);
}

/// Verarbeitet eine Tipp-Statusaenderung
///
/// Jede Mutation verteilt die KOMPLETTE aktuelle Tipp-Menge, kein Delta.
pub fn handle_tippt(username: String, is_typing: bool, state: &Arc<RelayState>) {
    if is_typing {
        state.typing.setzen(&username);
        tracing::debug!(benutzer = %username, "Benutzer tippt");
    } else {
        state.typing.entfernen(&username);
        tracing::debug!(benutzer = %username, "Benutzer tippt nicht mehr");
    }

    state.an_alle_senden(ServerNachricht::Tippt {
        typing_users: state.typing.schnappschuss(),
    });
}

/// Gemeinsamer Teardown fuer expliziten Leave und Disconnect
///
/// Reihenfolge: Registry-Eintrag entfernen, Calls verlassen (mit den
/// zugehoerigen Call-Broadcasts), Tipp-Markierung loeschen, dann `leave`
/// und die aktualisierte Praesenz-Liste verteilen. Idempotent: war die
/// Verbindung nicht (mehr) angemeldet, passiert nichts – sicher auch
/// nebenlaeufig zu einem noch laufenden Handler derselben Verbindung.
pub fn sitzung_beenden(
    verbindung: ConnectionId,
    anlass: TrennungsAnlass,
    state: &Arc<RelayState>,
) {
    let Some(profil) = state.registry.verlassen(&verbindung) else {
        return;
    };

    match anlass {
        TrennungsAnlass::Explizit => {
            tracing::info!(benutzer = %profil.username, "Benutzer hat den Raum verlassen")
        }
        TrennungsAnlass::VerbindungGetrennt => {
            tracing::info!(benutzer = %profil.username, "Verbindung getrennt, Sitzung wird abgebaut")
        }
    }

    call_handler::calls_raeumen(&profil.username, state);
    state.typing.entfernen(&profil.username);

    state.an_alle_senden(ServerNachricht::Austritt {
        username: profil.username.clone(),
    });
    benutzerliste_verteilen(state);
}

/// Verteilt die volle Praesenz-Liste an alle (kein Delta)
pub fn benutzerliste_verteilen(state: &Arc<RelayState>) {
    let user_list = state
        .registry
        .benutzer_liste()
        .into_iter()
        .map(|p| BenutzerEintrag {
            username: p.username,
            avatar: p.avatar,
        })
        .collect();
    state.an_alle_senden(ServerNachricht::BenutzerListe { user_list });
}
