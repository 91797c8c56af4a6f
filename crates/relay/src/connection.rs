//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Envelopes sind newline-getrennte JSON-Objekte; die
//! Dekodierung passiert genau einmal hier, danach laeuft alles typisiert
//! durch den Dispatcher.
//!
//! Ausgehende Nachrichten kommen aus der Broadcaster-Queue dieser
//! Verbindung und werden in Einreihungs-Reihenfolge auf den Socket
//! geschrieben. Die Queue wird bereits im Accept-Loop registriert
//! (siehe `tcp`), damit die Verbindung sofort gegen das Limit zaehlt.
//! Beim Verbindungsende laeuft der komplette Teardown (Calls,
//! Praesenz, Tipp-Status) BEVOR die Verbindung verworfen wird.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::{Framed, LinesCodec};

use huddle_core::ConnectionId;
use huddle_protocol::ServerNachricht;

use crate::dispatcher::MessageDispatcher;
use crate::server_state::RelayState;

/// Maximale Zeilenlaenge eines Envelopes
const MAX_ZEILENLAENGE: usize = 64 * 1024;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Zeilen, dispatcht an den `MessageDispatcher` und leert die
/// Sende-Queue. Laeuft in einem eigenen tokio-Task.
pub struct ClientConnection {
    state: Arc<RelayState>,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(state: Arc<RelayState>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht. Der Teardown am Ende ist idempotent.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        verbindung: ConnectionId,
        mut sende_rx: mpsc::Receiver<ServerNachricht>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;

        tracing::info!(peer = %peer_addr, verbindung = %verbindung, "Neue Verbindung");

        let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_ZEILENLAENGE));
        let dispatcher = MessageDispatcher::neu(Arc::clone(&self.state));

        loop {
            tokio::select! {
                // Eingehendes Envelope vom Client
                zeile = framed.next() => {
                    match zeile {
                        Some(Ok(roh)) => {
                            tracing::trace!(peer = %peer_addr, bytes = roh.len(), "Envelope empfangen");
                            dispatcher.roh_verarbeiten(verbindung, &roh);
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehende Nachricht aus der Sende-Queue
                Some(ausgehend) = sende_rx.recv() => {
                    match serde_json::to_string(&ausgehend) {
                        Ok(json) => {
                            if let Err(e) = framed.send(json).await {
                                tracing::warn!(peer = %peer_addr, fehler = %e, "Senden fehlgeschlagen");
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Envelope nicht serialisierbar");
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Teardown VOR dem Verwerfen der Verbindung: Calls verlassen,
        // Praesenz und Tipp-Status raeumen, andere benachrichtigen
        dispatcher.verbindung_getrennt(verbindung);
        self.state.broadcaster.entfernen(&verbindung);

        tracing::info!(peer = %peer_addr, "Verbindungs-Task beendet");
    }
}
