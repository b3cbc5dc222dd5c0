//! Record synchronization engine for the tally financial editor.
//!
//! Keeps an in-memory dataset, a durable local mirror, and a remote
//! authoritative store consistent under optimistic cell-level editing:
//!
//! - **store**: the in-memory record store (optimistic mutations, ordinal
//!   renumbering, derived-field recompute, mirror write-through)
//! - **sync**: the orchestrator sequencing probe → optimistic apply → remote
//!   request → commit-or-rollback, with per-operation policies
//! - **session**: the single-slot cell edit state machine (validation,
//!   normalization, change detection)
//! - **editor**: one dataset's editing surface tying session and engine
//! - **cache**: the SQLite-backed durable cache mirror
//! - **remote**: the HTTP remote-store contract and connectivity probe
//! - **workbook**: the explicitly constructed per-process session object
//!
//! Execution is single-threaded and cooperative: store mutations are
//! synchronous and atomic with respect to each other, and the only
//! suspension points are remote I/O boundaries.

pub mod cache;
pub mod config;
pub mod editor;
pub mod error;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;
pub mod workbook;

pub use cache::CacheMirror;
pub use config::RemoteConfig;
pub use editor::SheetEditor;
pub use error::{CacheError, ConfigError, RemoteError, Result, SyncError, ValidationError};
pub use remote::{HttpRemote, RemoteStore};
pub use session::{ActiveEdit, CommitOutcome, EditSession};
pub use store::RecordStore;
pub use sync::{ErrorSlot, RemovalTicket, SyncEngine};
pub use workbook::Workbook;
