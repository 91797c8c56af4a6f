//! huddle-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und haelt den Startpfad zusammen:
//! Konfiguration -> RelayState -> TCP-Listener -> Shutdown-Signal.

pub mod config;

use anyhow::{Context, Result};
use huddle_relay::{RelayConfig, RelayServer, RelayState};
use std::sync::Arc;

use config::{LoggingEinstellungen, ServerConfig};

/// Initialisiert tracing-subscriber mit dem konfigurierten Level und Format
///
/// `RUST_LOG` hat Vorrang vor dem Level aus der Konfiguration.
pub fn logging_initialisieren(logging: &LoggingEinstellungen) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Relay und laeuft bis zum Shutdown-Signal (Ctrl-C)
    pub async fn starten(self) -> Result<()> {
        let bind_addr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse: {}", self.config.tcp_bind_adresse()))?;

        let relay_config = RelayConfig {
            server_name: self.config.server.name.clone(),
            max_clients: self.config.server.max_clients,
        };
        let state = RelayState::neu(relay_config);

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.config.tcp_bind_adresse(),
            max_clients = self.config.server.max_clients,
            "Server startet"
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let relay = RelayServer::neu(Arc::clone(&state), bind_addr);
        let relay_task = tokio::spawn(relay.starten(shutdown_rx));

        tokio::signal::ctrl_c()
            .await
            .context("Warten auf Ctrl-C fehlgeschlagen")?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        shutdown_tx
            .send(true)
            .context("Shutdown-Signal konnte nicht gesendet werden")?;
        relay_task
            .await
            .context("Relay-Task abgebrochen")?
            .context("Relay-Server-Fehler")?;

        Ok(())
    }
}
