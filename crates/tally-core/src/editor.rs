//! One dataset's interactive editing surface.
//!
//! Glues the cell edit session to the sync engine: field edits flow through
//! the session (start → input → commit), everything else (add-row, removal,
//! submit, load) passes straight through to the engine.

use tally_domain::{totals, FieldKind, Record, Totals};

use crate::error::Result;
use crate::remote::RemoteStore;
use crate::session::{ActiveEdit, CommitOutcome, EditSession};
use crate::sync::{ErrorSlot, RemovalTicket, SyncEngine};

pub struct SheetEditor<R: Record, S: RemoteStore> {
    engine: SyncEngine<R, S>,
    session: EditSession<R>,
}

impl<R: Record, S: RemoteStore> SheetEditor<R, S> {
    pub fn new(engine: SyncEngine<R, S>) -> Self {
        Self {
            engine,
            session: EditSession::new(),
        }
    }

    pub fn records(&self) -> &[R] {
        self.engine.records()
    }

    /// Field-wise sums over the current collection, recomputed on demand.
    pub fn totals(&self) -> Totals<R::Field> {
        totals(self.engine.records())
    }

    pub fn editing(&self) -> Option<&ActiveEdit<R::Field>> {
        self.session.active()
    }

    pub fn in_flight(&self) -> bool {
        self.engine.in_flight()
    }

    pub fn errors(&self) -> &ErrorSlot {
        self.engine.errors()
    }

    /// Begin editing one cell. The derived field can never be entered. An
    /// active session is committed first; a draft that fails its commit guard
    /// at this point is abandoned, since two concurrent drafts can never
    /// exist.
    pub async fn start_edit(&mut self, index: usize, field: R::Field) -> Result<()> {
        if R::kind(field) == FieldKind::Derived {
            return Ok(());
        }
        self.flush_session().await?;
        let original = self.engine.field_value(index, field)?;
        self.session.start(index, field, original);
        Ok(())
    }

    /// Replace the in-progress draft (one keystroke's worth of input).
    pub fn edit_input(&mut self, text: impl Into<String>) {
        self.session.input(text);
    }

    /// Commit the active edit (blur, Enter, or Tab). Returns `false` when the
    /// commit was refused by a validation error and the session stays open.
    pub async fn commit_edit(&mut self) -> Result<bool> {
        match self.session.commit() {
            CommitOutcome::Refused(_) => Ok(false),
            CommitOutcome::Idle | CommitOutcome::Unchanged => Ok(true),
            CommitOutcome::Apply {
                index,
                field,
                value,
            } => {
                self.engine.update_field(index, field, value).await?;
                Ok(true)
            }
        }
    }

    /// Discard the draft without mutating anything (Escape).
    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    pub async fn load(&mut self) -> Result<()> {
        self.engine.load().await
    }

    /// Append an empty row, optimistically synced per the create policy.
    pub async fn add_row(&mut self) -> Result<()> {
        self.engine.add_row(R::blank()).await
    }

    pub fn request_removal(&self, index: usize) -> Result<RemovalTicket> {
        self.engine.request_removal(index)
    }

    pub async fn remove_row(&mut self, ticket: RemovalTicket) -> Result<()> {
        self.engine.remove_row(ticket).await
    }

    pub async fn submit(&mut self) -> Result<()> {
        self.engine.submit().await
    }

    pub async fn reconnect(&mut self) -> Result<()> {
        self.engine.reconnect().await
    }

    async fn flush_session(&mut self) -> Result<()> {
        match self.session.commit() {
            CommitOutcome::Idle | CommitOutcome::Unchanged => Ok(()),
            CommitOutcome::Refused(_) => {
                self.session.cancel();
                Ok(())
            }
            CommitOutcome::Apply {
                index,
                field,
                value,
            } => self.engine.update_field(index, field, value).await,
        }
    }
}
