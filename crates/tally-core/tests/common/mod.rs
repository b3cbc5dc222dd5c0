//! Shared test fixtures: an in-memory fake of the remote store with
//! controllable reachability and per-operation failure switches.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{json, Value};

use tally_core::{CacheMirror, ErrorSlot, RemoteError, RemoteStore, SyncEngine};
use tally_domain::{seed_projects, Project, RecordId};

#[derive(Default)]
pub struct FakeState {
    pub reachable: bool,
    pub row_ops: bool,
    pub records: Vec<Value>,
    pub fail_fetch: bool,
    pub fail_create: bool,
    pub fail_replace: bool,
    pub fail_delete: bool,
    pub fail_replace_all: bool,
    pub next_id: i64,
    /// Remote operations actually attempted, in order.
    pub calls: Vec<String>,
}

/// Fake remote store for one dataset. Cloning shares the state handle so a
/// test can flip switches and inspect calls after handing the remote to an
/// engine.
#[derive(Clone)]
pub struct FakeRemote {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeRemote {
    pub fn reachable() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeState {
                reachable: true,
                row_ops: true,
                next_id: 100,
                ..FakeState::default()
            })),
        }
    }

    pub fn unreachable() -> Self {
        let remote = Self::reachable();
        remote.state.borrow_mut().reachable = false;
        remote
    }

    /// A snapshot-mode remote (no per-row routes).
    pub fn snapshot() -> Self {
        let remote = Self::reachable();
        remote.state.borrow_mut().row_ops = false;
        remote
    }

    pub fn push_record(&self, record: Value) {
        self.state.borrow_mut().records.push(record);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.state.borrow_mut().calls.push(call.into());
    }
}

impl RemoteStore for FakeRemote {
    fn dataset(&self) -> &str {
        "projects"
    }

    fn supports_row_ops(&self) -> bool {
        self.state.borrow().row_ops
    }

    async fn health(&self) -> bool {
        self.log("health");
        self.state.borrow().reachable
    }

    async fn fetch_all(&self) -> Result<Vec<Value>, RemoteError> {
        self.log("fetch");
        let state = self.state.borrow();
        if !state.reachable {
            return Err(RemoteError::Transport("connection refused".into()));
        }
        if state.fail_fetch {
            return Err(RemoteError::Status { status: 500 });
        }
        Ok(state.records.clone())
    }

    async fn create(&self, body: Value) -> Result<Value, RemoteError> {
        self.log("create");
        let mut state = self.state.borrow_mut();
        if state.fail_create {
            return Err(RemoteError::Status { status: 500 });
        }
        let id = state.next_id;
        state.next_id += 1;
        let mut record = body;
        record["id"] = json!(id);
        state.records.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, id: &RecordId, body: Value) -> Result<(), RemoteError> {
        self.log(format!("replace:{}", id));
        let mut state = self.state.borrow_mut();
        if state.fail_replace {
            return Err(RemoteError::Status { status: 500 });
        }
        if let Some(stored) = state
            .records
            .iter_mut()
            .find(|record| id_matches(record, id.as_str()))
        {
            let stored_id = stored["id"].clone();
            let mut replacement = body;
            replacement["id"] = stored_id;
            *stored = replacement;
        }
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.log(format!("delete:{}", id));
        let mut state = self.state.borrow_mut();
        if state.fail_delete {
            return Err(RemoteError::Status { status: 500 });
        }
        state.records.retain(|record| !id_matches(record, id.as_str()));
        Ok(())
    }

    async fn replace_all(&self, body: Value) -> Result<(), RemoteError> {
        self.log("replace_all");
        let mut state = self.state.borrow_mut();
        if state.fail_replace_all {
            return Err(RemoteError::Status { status: 500 });
        }
        state.records = body.as_array().cloned().unwrap_or_default();
        Ok(())
    }
}

/// Remote stores serve ids as numbers or strings; match either.
fn id_matches(record: &Value, target: &str) -> bool {
    match record.get("id") {
        Some(Value::Number(n)) => n.to_string() == target,
        Some(Value::String(s)) => s == target,
        _ => false,
    }
}

/// A project engine wired to the given fake, with its mirror handle for
/// snapshot assertions. Defaults are the built-in project seeds.
pub fn project_engine(remote: FakeRemote) -> (SyncEngine<Project, FakeRemote>, Arc<CacheMirror>) {
    let mirror = Arc::new(CacheMirror::open_in_memory().expect("in-memory mirror"));
    let engine = SyncEngine::new(
        remote,
        Arc::clone(&mirror),
        seed_projects(),
        ErrorSlot::default(),
    );
    (engine, mirror)
}

/// A project record in wire form, as the remote store would serve it.
pub fn wire_project(id: i64, name: &str, dev: f64) -> Value {
    json!({
        "id": id,
        "ordinal": 0,
        "name": name,
        "status": "active",
        "dev": dev,
        "extra": 0.0,
        "invest": 0.0,
        "gettingAmount": 0.0,
        "total": dev,
    })
}
