//! Fehlertypen fuer den Relay-Koordinator

use thiserror::Error;

/// Fehlertyp fuer den Relay-Koordinator
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Beitritt mit leerem Benutzernamen
    #[error("Benutzername darf nicht leer sein")]
    LeererBenutzername,

    /// Senden an eine Verbindung fehlgeschlagen (Queue voll oder geschlossen)
    #[error("Senden fehlgeschlagen")]
    SendFehler,
}

/// Result-Typ fuer den Relay-Koordinator
pub type RelayResult<T> = Result<T, RelayError>;
