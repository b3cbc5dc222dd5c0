//! The sync orchestrator.
//!
//! Wraps every record store mutation with the remote-sync policy. The policy
//! is deliberately asymmetric per operation:
//!
//! | operation | optimistic | on remote failure |
//! |---|---|---|
//! | create    | insert immediately | roll back (remove the insert) |
//! | remove    | delete immediately | roll back (reinsert at original index) |
//! | update    | apply immediately  | keep the local value, surface only |
//! | submit    | none               | leave local state untouched |
//!
//! Every operation probes connectivity first. An unreachable store puts row
//! mutations into offline mode (local change kept, no remote call, no
//! rollback); bulk submit fails immediately instead.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use tally_domain::{FieldValue, Record, RecordId};

use crate::cache::CacheMirror;
use crate::error::{RemoteError, Result, SyncError};
use crate::remote::RemoteStore;
use crate::store::RecordStore;

/// The process-wide error slot consumed by the presentation layer.
///
/// Remote-facing failures land here (latest wins) in addition to being
/// returned to the caller; a successful reconnect clears it.
#[derive(Clone, Default)]
pub struct ErrorSlot {
    inner: Arc<Mutex<Option<String>>>,
}

impl ErrorSlot {
    pub fn report(&self, err: &SyncError) {
        tracing::warn!(%err, "sync failure");
        *self.inner.lock().expect("error slot lock poisoned") = Some(err.to_string());
    }

    pub fn message(&self) -> Option<String> {
        self.inner.lock().expect("error slot lock poisoned").clone()
    }

    pub fn clear(&self) {
        *self.inner.lock().expect("error slot lock poisoned") = None;
    }
}

/// Counter behind the in-flight flag the host uses to disable mutation
/// controls while their request runs.
#[derive(Clone, Default)]
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn begin(&self) -> InFlightGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(Arc::clone(&self.0))
    }

    fn active(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The confirmation half of row removal.
///
/// Removal is a request/response exchange: the caller obtains a ticket for a
/// row, gets whatever confirmation it needs, and hands the ticket back to
/// [`SyncEngine::remove_row`]. The ticket is revalidated against the record's
/// identity, so a collection that shifted in between cannot delete the wrong
/// row.
#[derive(Debug, Clone)]
pub struct RemovalTicket {
    index: usize,
    id: RecordId,
    /// First-column value, for the confirmation prompt.
    pub label: String,
}

pub struct SyncEngine<R: Record, S: RemoteStore> {
    store: RecordStore<R>,
    remote: S,
    defaults: Vec<R>,
    errors: ErrorSlot,
    in_flight: InFlight,
}

impl<R: Record, S: RemoteStore> SyncEngine<R, S> {
    pub fn new(remote: S, mirror: Arc<CacheMirror>, defaults: Vec<R>, errors: ErrorSlot) -> Self {
        Self {
            store: RecordStore::new(mirror),
            remote,
            defaults,
            errors,
            in_flight: InFlight::default(),
        }
    }

    pub fn records(&self) -> &[R] {
        self.store.records()
    }

    pub fn field_value(&self, index: usize, field: R::Field) -> Result<FieldValue> {
        Ok(self.store.get(index)?.get(field))
    }

    pub fn errors(&self) -> &ErrorSlot {
        &self.errors
    }

    /// Whether a remote request is currently in flight.
    pub fn in_flight(&self) -> bool {
        self.in_flight.active()
    }

    /// Load the best available source: remote store (if reachable and
    /// non-empty) → cache mirror → built-in defaults.
    pub async fn load(&mut self) -> Result<()> {
        let _guard = self.in_flight.begin();
        if self.remote.health().await {
            match self.fetch_remote().await {
                Ok(records) if !records.is_empty() => {
                    self.store.replace_all(records);
                    return Ok(());
                }
                Ok(_) => {
                    tracing::debug!(dataset = R::DATASET, "remote store empty, trying mirror");
                }
                Err(err) => {
                    tracing::warn!(dataset = R::DATASET, %err, "remote load failed, trying mirror");
                }
            }
        }
        let mirrored = match self.store.load_mirrored() {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(dataset = R::DATASET, %err, "mirror read failed");
                None
            }
        };
        match mirrored {
            Some(records) if !records.is_empty() => self.store.replace_all(records),
            _ => self.store.replace_all(self.defaults.clone()),
        }
        Ok(())
    }

    /// Optimistically append a new row, then sync it to the remote store.
    /// On remote failure the insert is rolled back.
    pub async fn add_row(&mut self, draft: R) -> Result<()> {
        let _guard = self.in_flight.begin();
        let index = self.store.len();
        self.store.create(draft);

        if !self.remote.supports_row_ops() {
            // Snapshot dataset: rows stay local until a bulk submit.
            return Ok(());
        }
        if !self.remote.health().await {
            tracing::info!(dataset = R::DATASET, "offline, keeping local create");
            return Ok(());
        }

        let payload = wire_payload(self.store.get(index)?)?;
        match self.remote.create(payload).await {
            Ok(body) => {
                match body
                    .get("id")
                    .and_then(|id| serde_json::from_value::<RecordId>(id.clone()).ok())
                {
                    Some(id) => self.store.assign_remote_id(index, id)?,
                    // The remote accepted the record; rolling back here would
                    // desync. The id heals on the next full reload.
                    None => tracing::warn!(
                        dataset = R::DATASET,
                        "create response missing id, keeping temporary id"
                    ),
                }
                Ok(())
            }
            Err(err) => {
                self.store.remove(index)?;
                self.fail(err.into())
            }
        }
    }

    /// First half of the removal exchange: validate the target and produce a
    /// ticket for the caller's confirmation flow.
    pub fn request_removal(&self, index: usize) -> Result<RemovalTicket> {
        let record = self.store.get(index)?;
        let first_column = R::fields()[0];
        Ok(RemovalTicket {
            index,
            id: record.id().clone(),
            label: record.get(first_column).display_string(),
        })
    }

    /// Second half: optimistically delete the confirmed row, then sync. On
    /// remote failure the row is reinserted at its original index with its
    /// original values.
    pub async fn remove_row(&mut self, ticket: RemovalTicket) -> Result<()> {
        let _guard = self.in_flight.begin();
        let index = self
            .store
            .records()
            .iter()
            .position(|record| record.id() == &ticket.id)
            .ok_or(SyncError::Index {
                index: ticket.index,
                len: self.store.len(),
            })?;
        let removed = self.store.remove(index)?;

        if !self.remote.supports_row_ops() {
            return Ok(());
        }
        if !self.remote.health().await {
            tracing::info!(dataset = R::DATASET, "offline, keeping local delete");
            return Ok(());
        }

        match self.remote.delete(removed.id()).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.store.insert_at(index, removed)?;
                self.fail(err.into())
            }
        }
    }

    /// Optimistically replace one field, then sync the whole record. A failed
    /// remote update is surfaced but never rolled back: the local value
    /// stands.
    pub async fn update_field(&mut self, index: usize, field: R::Field, value: FieldValue) -> Result<()> {
        let _guard = self.in_flight.begin();
        self.store.update(index, field, value)?;

        if !self.remote.supports_row_ops() {
            return Ok(());
        }
        if !self.remote.health().await {
            tracing::info!(dataset = R::DATASET, "offline, keeping local update");
            return Ok(());
        }

        let record = self.store.get(index)?;
        let id = record.id().clone();
        let payload = wire_payload(record)?;
        if let Err(err) = self.remote.replace(&id, payload).await {
            return self.fail(err.into());
        }
        Ok(())
    }

    /// Push the whole collection to the remote store. No optimistic local
    /// change; success reconciles by reloading from remote, failure leaves
    /// local state untouched. Requires connectivity.
    pub async fn submit(&mut self) -> Result<()> {
        let _guard = self.in_flight.begin();
        if !self.remote.health().await {
            return self.fail(SyncError::Connectivity(format!(
                "{} submit requires a reachable store",
                R::DATASET
            )));
        }
        let payload = serde_json::to_value(self.store.records())
            .map_err(|e| SyncError::Remote(RemoteError::Decode(e.to_string())))?;
        match self.remote.replace_all(payload).await {
            Ok(()) => self.load().await,
            Err(err) => self.fail(err.into()),
        }
    }

    /// User-initiated reconnection: re-probe, replace the collection from the
    /// remote store, and clear the error slot. Never retried automatically.
    pub async fn reconnect(&mut self) -> Result<()> {
        let _guard = self.in_flight.begin();
        if !self.remote.health().await {
            return self.fail(SyncError::Connectivity(format!(
                "{} store is still unreachable",
                R::DATASET
            )));
        }
        match self.fetch_remote().await {
            Ok(records) => {
                self.store.replace_all(records);
                self.errors.clear();
                Ok(())
            }
            Err(err) => self.fail(err.into()),
        }
    }

    async fn fetch_remote(&self) -> std::result::Result<Vec<R>, RemoteError> {
        let values = self.remote.fetch_all().await?;
        values
            .into_iter()
            .map(|value| {
                serde_json::from_value::<R>(value).map_err(|e| RemoteError::Decode(e.to_string()))
            })
            .collect()
    }

    fn fail(&self, err: SyncError) -> Result<()> {
        self.errors.report(&err);
        Err(err)
    }
}

/// A record in wire form with its identity stripped, per the remote contract
/// for create and replace bodies.
fn wire_payload<R: Record>(record: &R) -> Result<Value> {
    let mut value = serde_json::to_value(record)
        .map_err(|e| SyncError::Remote(RemoteError::Decode(e.to_string())))?;
    if let Some(object) = value.as_object_mut() {
        object.remove("id");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_domain::{seed_projects, Project};

    #[test]
    fn wire_payload_strips_identity() {
        let payload = wire_payload(&seed_projects()[0]).unwrap();
        assert!(payload.get("id").is_none());
        assert!(payload.get("gettingAmount").is_some());
    }

    #[test]
    fn error_slot_keeps_the_latest_message() {
        let slot = ErrorSlot::default();
        assert!(slot.message().is_none());
        slot.report(&SyncError::Index { index: 1, len: 0 });
        slot.report(&SyncError::Connectivity("projects".into()));
        assert!(slot.message().unwrap().contains("unreachable"));
        slot.clear();
        assert!(slot.message().is_none());
    }

    struct NullRemote;

    impl RemoteStore for NullRemote {
        fn dataset(&self) -> &str {
            "projects"
        }

        async fn health(&self) -> bool {
            false
        }

        async fn fetch_all(&self) -> std::result::Result<Vec<Value>, RemoteError> {
            Err(RemoteError::Transport("offline".into()))
        }
    }

    #[test]
    fn removal_ticket_labels_the_first_column() {
        let mirror = Arc::new(CacheMirror::open_in_memory().unwrap());
        let mut engine: SyncEngine<Project, NullRemote> =
            SyncEngine::new(NullRemote, mirror, Vec::new(), ErrorSlot::default());
        engine.store.replace_all(seed_projects());

        let ticket = engine.request_removal(1).unwrap();
        assert_eq!(ticket.label, "Mobile app");
        assert!(matches!(
            engine.request_removal(5).unwrap_err(),
            SyncError::Index { index: 5, len: 2 }
        ));
    }
}
