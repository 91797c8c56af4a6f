//! huddle-protocol – Envelope-Definitionen
//!
//! Definiert alle Nachrichten die zwischen Client und Relay ausgetauscht
//! werden, als tagged Enums mit `type`-Diskriminator.
//!
//! ## Design
//! - Flache JSON-Objekte, ein `type`-Feld pro Envelope
//! - Eingehend (`ClientNachricht`) und ausgehend (`ServerNachricht`) getrennt
//! - Dekodierung einmalig an der Transportgrenze, als `Result` statt
//!   Exception-Kontrollfluss
//! - Kein Protokollversions- oder Sequenzfeld

pub mod envelope;

pub use envelope::{
    dekodieren, BenutzerEintrag, ClientNachricht, DekodierFehler, ServerNachricht,
};
