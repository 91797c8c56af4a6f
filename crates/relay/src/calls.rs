//! Call-Manager – Roster und Lebenszyklus aller Calls
//!
//! Zustandsmaschine pro Call: `Absent -> Initiated -> Active -> Absent`.
//! Ein nie gestarteter und ein beendeter Call sind identisch: kein Eintrag.
//!
//! ## Nebenlaeufigkeit
//! Alle Read-Modify-Write-Sequenzen auf einem Call (entfernen, auf leer
//! pruefen, ggf. Call loeschen) laufen hinter EINEM Mutex. Der Manager ist
//! damit der einzige serialisierende Eigentuemer der Call-Tabelle; ein
//! Lost-Update oder doppelter Teardown durch zwei gleichzeitige `beenden`-
//! Aufrufe ist konstruktiv ausgeschlossen. Jede Mutation gibt ein Ergebnis
//! zurueck aus dem der Router den passenden Broadcast baut – der Broadcast
//! ist so immer konsistent mit der Mutation die ihn ausgeloest hat.
//!
//! Invariante: solange ein Call existiert, ist sein Initiator Teilnehmer.

use huddle_core::CallId;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Roster eines laufenden Calls
#[derive(Debug, Clone)]
struct CallEintrag {
    initiator: String,
    teilnehmer: BTreeSet<String>,
}

/// Snapshot eines laufenden Calls (fuer den `call-info`-Push beim Join)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub call_id: CallId,
    pub initiator: String,
    pub teilnehmer: Vec<String>,
}

/// Ergebnis eines Austritts aus einem Call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AustrittErgebnis {
    /// Der Initiator hat beendet: Call bedingungslos abgebaut,
    /// `call-end` an alle
    InitiatorBeendet,
    /// Ein Teilnehmer ist gegangen, andere bleiben: `call-user-left`
    /// mit dem aktualisierten Roster
    TeilnehmerGegangen { teilnehmer: Vec<String> },
    /// Der letzte Teilnehmer ist gegangen: Call entfernt, kein
    /// weiterer Broadcast noetig
    LetzterGegangen,
    /// Call-ID unbekannt: loggen und ignorieren, kein Fehler
    Unbekannt,
}

/// Austritt aus einem Call beim Disconnect (Call-ID + Ergebnis)
#[derive(Debug, Clone)]
pub struct CallAustritt {
    pub call_id: CallId,
    pub ergebnis: AustrittErgebnis,
}

/// Verwaltet Roster und Lebenszyklus aller Calls
///
/// Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct CallManager {
    calls: Arc<Mutex<HashMap<CallId, CallEintrag>>>,
}

impl CallManager {
    /// Erstellt einen neuen CallManager
    pub fn neu() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Startet einen Call: Teilnehmer = {Initiator}
    ///
    /// Ein existierender Call mit derselben ID wird ueberschrieben
    /// (beibehaltenes Urspruengsverhalten).
    pub fn starten(&self, username: &str, call_id: CallId) {
        let mut teilnehmer = BTreeSet::new();
        teilnehmer.insert(username.to_string());
        self.calls.lock().insert(
            call_id.clone(),
            CallEintrag {
                initiator: username.to_string(),
                teilnehmer,
            },
        );
        tracing::info!(call = %call_id, initiator = %username, "Call gestartet");
    }

    /// Nimmt einen Call an und gibt das aktualisierte Roster zurueck
    ///
    /// `None` wenn die Call-ID unbekannt ist (wiederherstellbar:
    /// loggen und ignorieren).
    pub fn annehmen(&self, username: &str, call_id: &CallId) -> Option<Vec<String>> {
        let mut calls = self.calls.lock();
        let eintrag = calls.get_mut(call_id)?;
        eintrag.teilnehmer.insert(username.to_string());
        Some(eintrag.teilnehmer.iter().cloned().collect())
    }

    /// Verlaesst oder beendet einen Call
    ///
    /// Initiator: bedingungsloser Teardown, unabhaengig von verbleibenden
    /// Teilnehmern. Sonst: Benutzer entfernen; wird das Roster leer, wird
    /// der Call abgebaut.
    pub fn beenden(&self, username: &str, call_id: &CallId) -> AustrittErgebnis {
        let mut calls = self.calls.lock();
        Self::austritt_anwenden(&mut calls, username, call_id)
    }

    /// Entfernt einen Benutzer aus ALLEN Calls in denen er Teilnehmer ist
    ///
    /// Wird beim Disconnect/Leave aufgerufen. Pro Call gilt dieselbe
    /// Austrittslogik wie bei `beenden`: verlaesst der Initiator implizit,
    /// wird der Call komplett abgebaut.
    pub fn verlassen_alle(&self, username: &str) -> Vec<CallAustritt> {
        let mut calls = self.calls.lock();
        let betroffen: Vec<CallId> = calls
            .iter()
            .filter(|(_, e)| e.teilnehmer.contains(username))
            .map(|(id, _)| id.clone())
            .collect();

        betroffen
            .into_iter()
            .map(|call_id| {
                let ergebnis = Self::austritt_anwenden(&mut calls, username, &call_id);
                CallAustritt { call_id, ergebnis }
            })
            .collect()
    }

    /// Snapshot aller laufenden Calls (fuer den Join-Push)
    pub fn aktive_calls(&self) -> Vec<CallInfo> {
        self.calls
            .lock()
            .iter()
            .map(|(id, e)| CallInfo {
                call_id: id.clone(),
                initiator: e.initiator.clone(),
                teilnehmer: e.teilnehmer.iter().cloned().collect(),
            })
            .collect()
    }

    /// Gibt das Roster eines Calls zurueck, `None` wenn unbekannt
    pub fn teilnehmer(&self, call_id: &CallId) -> Option<Vec<String>> {
        self.calls
            .lock()
            .get(call_id)
            .map(|e| e.teilnehmer.iter().cloned().collect())
    }

    // Austrittslogik unter dem Lock des Aufrufers – gemeinsam fuer
    // explizites `beenden` und impliziten Disconnect
    fn austritt_anwenden(
        calls: &mut HashMap<CallId, CallEintrag>,
        username: &str,
        call_id: &CallId,
    ) -> AustrittErgebnis {
        let Some(eintrag) = calls.get_mut(call_id) else {
            return AustrittErgebnis::Unbekannt;
        };

        if eintrag.initiator == username {
            calls.remove(call_id);
            tracing::info!(call = %call_id, initiator = %username, "Call vom Initiator beendet");
            return AustrittErgebnis::InitiatorBeendet;
        }

        eintrag.teilnehmer.remove(username);
        let verbleibend: Vec<String> = eintrag.teilnehmer.iter().cloned().collect();
        if verbleibend.is_empty() {
            calls.remove(call_id);
            tracing::debug!(call = %call_id, "Letzter Teilnehmer gegangen, Call entfernt");
            AustrittErgebnis::LetzterGegangen
        } else {
            tracing::info!(call = %call_id, benutzer = %username, "Teilnehmer hat Call verlassen");
            AustrittErgebnis::TeilnehmerGegangen {
                teilnehmer: verbleibend,
            }
        }
    }
}

impl Default for CallManager {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
