//! Envelope-Typen und Dekodierung
//!
//! Jedes Envelope ist ein flaches JSON-Objekt mit einem `type`-Feld.
//! Eingehende Envelopes werden genau einmal an der Transportgrenze in
//! `ClientNachricht` dekodiert; danach ist der Dispatch statisch geprueft.
//!
//! ## Fehlerklassen beim Dekodieren
//! - Kein JSON / `type` fehlt / Pflichtfeld fehlt: dem Absender wird eine
//!   generische `error`-Notiz geschickt (Envelope verworfen, Verbindung
//!   bleibt offen)
//! - Unbekannter `type`: nur geloggt, keine Client-sichtbare Antwort

use huddle_core::{CallId, MessageId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Dekodier-Fehler
// ---------------------------------------------------------------------------

/// Fehler beim Dekodieren eines eingehenden Envelopes
#[derive(Debug, Error)]
pub enum DekodierFehler {
    /// Payload ist kein gueltiges JSON-Objekt
    #[error("Kein gueltiges JSON: {0}")]
    KeinJson(String),

    /// Das `type`-Feld fehlt oder ist kein String
    #[error("Envelope ohne type-Feld")]
    TypFehlt,

    /// Der `type`-Wert ist keinem bekannten Nachrichtentyp zugeordnet
    #[error("Unbekannter Nachrichtentyp: {0}")]
    UnbekannterTyp(String),

    /// Bekannter Typ, aber Pflichtfelder fehlen oder haben den falschen Typ
    #[error("Ungueltige Felder fuer '{typ}': {grund}")]
    FelderUngueltig { typ: String, grund: String },
}

/// Alle `type`-Werte die der Relay von Clients akzeptiert
const BEKANNTE_TYPEN: &[&str] = &[
    "join",
    "leave",
    "message",
    "file",
    "location",
    "edit",
    "delete",
    "reaction",
    "read",
    "typing",
    "call-initiate",
    "call-accept",
    "call-reject",
    "call-end",
    "call-signal",
];

// ---------------------------------------------------------------------------
// Eingehende Envelopes (Client -> Relay)
// ---------------------------------------------------------------------------

/// Eingehendes Envelope eines Clients
///
/// `username` und `avatar` fallen auf den leeren String zurueck wenn sie
/// fehlen; alle uebrigen Felder sind pro Typ Pflicht.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientNachricht {
    #[serde(rename = "join", rename_all = "camelCase")]
    Beitritt {
        #[serde(default)]
        username: String,
        #[serde(default)]
        avatar: String,
    },

    #[serde(rename = "leave", rename_all = "camelCase")]
    Austritt {
        #[serde(default)]
        username: String,
    },

    #[serde(rename = "message", rename_all = "camelCase")]
    Chat {
        #[serde(default)]
        username: String,
        message: String,
        message_id: MessageId,
    },

    #[serde(rename = "file", rename_all = "camelCase")]
    Datei {
        #[serde(default)]
        username: String,
        file_url: String,
        is_image: bool,
        message_id: MessageId,
    },

    #[serde(rename = "location", rename_all = "camelCase")]
    Standort {
        #[serde(default)]
        username: String,
        latitude: f64,
        longitude: f64,
    },

    #[serde(rename = "edit", rename_all = "camelCase")]
    Bearbeiten {
        #[serde(default)]
        username: String,
        message_id: MessageId,
        new_message: String,
    },

    #[serde(rename = "delete", rename_all = "camelCase")]
    Loeschen {
        #[serde(default)]
        username: String,
        message_id: MessageId,
    },

    #[serde(rename = "reaction", rename_all = "camelCase")]
    Reaktion {
        #[serde(default)]
        username: String,
        message_id: MessageId,
        emoji: String,
    },

    #[serde(rename = "read", rename_all = "camelCase")]
    Gelesen {
        #[serde(default)]
        username: String,
        message_id: MessageId,
    },

    #[serde(rename = "typing", rename_all = "camelCase")]
    Tippt {
        #[serde(default)]
        username: String,
        is_typing: bool,
    },

    #[serde(rename = "call-initiate", rename_all = "camelCase")]
    CallStart {
        #[serde(default)]
        username: String,
        call_id: CallId,
    },

    #[serde(rename = "call-accept", rename_all = "camelCase")]
    CallAnnahme {
        #[serde(default)]
        username: String,
        call_id: CallId,
    },

    #[serde(rename = "call-reject", rename_all = "camelCase")]
    CallAblehnung {
        #[serde(default)]
        username: String,
        call_id: CallId,
    },

    #[serde(rename = "call-end", rename_all = "camelCase")]
    CallEnde {
        #[serde(default)]
        username: String,
        call_id: CallId,
    },

    #[serde(rename = "call-signal", rename_all = "camelCase")]
    CallSignal {
        #[serde(default)]
        username: String,
        call_id: CallId,
        target: String,
        /// Opaker Signaling-Blob (Offer/Answer/Candidate) – wird nicht
        /// interpretiert, nur weitergereicht
        signal: serde_json::Value,
    },
}

/// Dekodiert ein rohes Payload in eine `ClientNachricht`
///
/// Prueft zuerst das `type`-Feld gegen die bekannten Typen, damit
/// unbekannte Typen von Feldfehlern unterschieden werden koennen
/// (unterschiedliche Fehlerbehandlung im Router).
pub fn dekodieren(roh: &str) -> Result<ClientNachricht, DekodierFehler> {
    let wert: serde_json::Value =
        serde_json::from_str(roh).map_err(|e| DekodierFehler::KeinJson(e.to_string()))?;

    let typ = wert
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(DekodierFehler::TypFehlt)?;

    if !BEKANNTE_TYPEN.contains(&typ) {
        return Err(DekodierFehler::UnbekannterTyp(typ.to_string()));
    }

    let typ = typ.to_string();
    serde_json::from_value(wert).map_err(|e| DekodierFehler::FelderUngueltig {
        typ,
        grund: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Ausgehende Envelopes (Relay -> Client)
// ---------------------------------------------------------------------------

/// Eintrag in der Praesenz-Liste (`user-list-update`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenutzerEintrag {
    pub username: String,
    pub avatar: String,
}

/// Ausgehendes Envelope an einen oder mehrere Clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerNachricht {
    #[serde(rename = "join", rename_all = "camelCase")]
    Beitritt { username: String },

    #[serde(rename = "leave", rename_all = "camelCase")]
    Austritt { username: String },

    #[serde(rename = "message", rename_all = "camelCase")]
    Chat {
        username: String,
        message: String,
        message_id: MessageId,
    },

    #[serde(rename = "file", rename_all = "camelCase")]
    Datei {
        username: String,
        file_url: String,
        is_image: bool,
        message_id: MessageId,
    },

    #[serde(rename = "location", rename_all = "camelCase")]
    Standort {
        username: String,
        latitude: f64,
        longitude: f64,
    },

    #[serde(rename = "edit", rename_all = "camelCase")]
    Bearbeitet {
        username: String,
        message_id: MessageId,
        new_message: String,
    },

    #[serde(rename = "delete", rename_all = "camelCase")]
    Geloescht {
        username: String,
        message_id: MessageId,
    },

    #[serde(rename = "reaction", rename_all = "camelCase")]
    Reaktion {
        username: String,
        message_id: MessageId,
        emoji: String,
    },

    /// Lesebestaetigung – traegt immer die komplette aktuelle Lesermenge
    #[serde(rename = "read", rename_all = "camelCase")]
    Gelesen {
        message_id: MessageId,
        read_by: Vec<String>,
    },

    /// Tipp-Status – traegt immer die komplette aktuelle Tipp-Menge
    #[serde(rename = "typing", rename_all = "camelCase")]
    Tippt { typing_users: Vec<String> },

    /// Vollstaendige Praesenz-Liste, kein Delta
    #[serde(rename = "user-list-update", rename_all = "camelCase")]
    BenutzerListe { user_list: Vec<BenutzerEintrag> },

    #[serde(rename = "call-initiate", rename_all = "camelCase")]
    CallStart { username: String, call_id: CallId },

    #[serde(rename = "call-accept", rename_all = "camelCase")]
    CallAnnahme {
        username: String,
        call_id: CallId,
        participants: Vec<String>,
    },

    #[serde(rename = "call-reject", rename_all = "camelCase")]
    CallAblehnung { username: String, call_id: CallId },

    #[serde(rename = "call-end", rename_all = "camelCase")]
    CallEnde { username: String, call_id: CallId },

    #[serde(rename = "call-user-left", rename_all = "camelCase")]
    CallTeilnehmerWeg {
        username: String,
        participants: Vec<String>,
        call_id: CallId,
    },

    /// Snapshot eines laufenden Calls – wird beim Join einmalig pro
    /// aktivem Call an den neuen Client geschickt
    #[serde(rename = "call-info", rename_all = "camelCase")]
    CallInfo {
        call_id: CallId,
        initiator: String,
        participants: Vec<String>,
    },

    #[serde(rename = "call-signal", rename_all = "camelCase")]
    CallSignal {
        username: String,
        call_id: CallId,
        target: String,
        signal: serde_json::Value,
    },

    /// Generische Fehlernotiz an den Ausloeser
    #[serde(rename = "error", rename_all = "camelCase")]
    Fehler { message: String },
}

impl ServerNachricht {
    /// Bequemer Konstruktor fuer Fehlernotizen
    pub fn fehler(message: impl Into<String>) -> Self {
        Self::Fehler {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
