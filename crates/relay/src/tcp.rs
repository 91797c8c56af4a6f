//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `RelayServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ClientConnection`. Der Koordinator selbst ist transportunabhaengig;
//! dieser Listener ist seine Referenz-Anbindung.

use huddle_core::ConnectionId;
use huddle_protocol::ServerNachricht;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::connection::ClientConnection;
use crate::error::RelayResult;
use crate::server_state::RelayState;

/// TCP-Relay-Server
///
/// Bindet einen TCP-Socket und akzeptiert Verbindungen in einer Loop.
pub struct RelayServer {
    state: Arc<RelayState>,
    bind_addr: SocketAddr,
}

impl RelayServer {
    /// Erstellt einen neuen RelayServer
    pub fn neu(state: Arc<RelayState>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Startet den TCP-Listener und akzeptiert Verbindungen
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
    pub async fn starten(
        self,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> RelayResult<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        let lokale_addr = listener.local_addr()?;

        tracing::info!(adresse = %lokale_addr, "Relay-Server gestartet");

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let Some((verbindung, sende_rx)) = self.zulassen() else {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = self.state.config.max_clients,
                                    "Server voll – Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            };

                            tracing::debug!(peer = %peer_addr, verbindung = %verbindung, "Verbindung akzeptiert");

                            let client = ClientConnection::neu(
                                Arc::clone(&self.state),
                                peer_addr,
                            );
                            let shutdown_rx_clone = shutdown_rx.clone();
                            tokio::spawn(async move {
                                client
                                    .verarbeiten(stream, verbindung, sende_rx, shutdown_rx_clone)
                                    .await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Relay-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("Relay-Server gestoppt");
        Ok(())
    }

    /// Prueft das Verbindungs-Limit und registriert die Send-Queue
    ///
    /// Laeuft im Accept-Loop, nicht erst im Verbindungs-Task: die
    /// Verbindung zaehlt damit schon bei der Zulassung gegen das Limit,
    /// und ein Burst von Accepts kann es nicht ueberschreiten.
    fn zulassen(&self) -> Option<(ConnectionId, mpsc::Receiver<ServerNachricht>)> {
        if self.state.broadcaster.anzahl() as u32 >= self.state.config.max_clients {
            return None;
        }
        let verbindung = ConnectionId::neu();
        let sende_rx = self.state.broadcaster.registrieren(verbindung);
        Some((verbindung, sende_rx))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
