//! Sync engine scenarios: load priority, the per-operation rollback policy,
//! offline mode, bulk submit, and reconnection.

mod common;

use common::{project_engine, wire_project, FakeRemote};

use tally_core::{CacheMirror, ErrorSlot, SyncEngine, SyncError};
use tally_domain::{seed_projects, FieldValue, Project, ProjectField, Record, RecordId};

use std::sync::Arc;

#[tokio::test]
async fn load_prefers_a_reachable_remote() {
    let remote = FakeRemote::reachable();
    remote.push_record(wire_project(1, "Remote project", 500.0));
    let (mut engine, _mirror) = project_engine(remote);

    engine.load().await.unwrap();

    assert_eq!(engine.records().len(), 1);
    assert_eq!(engine.records()[0].name, "Remote project");
    assert_eq!(engine.records()[0].ordinal, 1);
}

#[tokio::test]
async fn load_falls_back_to_the_mirror_when_unreachable() {
    let remote = FakeRemote::unreachable();
    let (mut engine, mirror) = project_engine(remote);
    let mut mirrored = seed_projects();
    mirrored[0].name = "Mirrored project".to_string();
    mirror.store(Project::CACHE_KEY, &mirrored).unwrap();

    engine.load().await.unwrap();

    assert_eq!(engine.records()[0].name, "Mirrored project");
}

#[tokio::test]
async fn load_falls_back_to_the_mirror_when_the_remote_read_fails() {
    let remote = FakeRemote::reachable();
    remote.state.borrow_mut().fail_fetch = true;
    let (mut engine, mirror) = project_engine(remote);
    mirror.store(Project::CACHE_KEY, &seed_projects()).unwrap();

    engine.load().await.unwrap();

    assert_eq!(engine.records().len(), 2);
}

#[tokio::test]
async fn load_falls_back_to_defaults_when_everything_else_is_empty() {
    let (mut engine, _mirror) = project_engine(FakeRemote::unreachable());

    engine.load().await.unwrap();

    let ordinals: Vec<u32> = engine.records().iter().map(|r| r.ordinal).collect();
    assert_eq!(engine.records().len(), 2);
    assert_eq!(ordinals, vec![1, 2]);
    assert_eq!(engine.records()[1].status, "active,priority");
}

#[tokio::test]
async fn an_empty_remote_result_falls_back_to_the_mirror() {
    let remote = FakeRemote::reachable();
    let (mut engine, mirror) = project_engine(remote);
    let mut mirrored = seed_projects();
    mirrored.truncate(1);
    mirror.store(Project::CACHE_KEY, &mirrored).unwrap();

    engine.load().await.unwrap();

    assert_eq!(engine.records().len(), 1);
}

#[tokio::test]
async fn create_commits_with_the_remote_assigned_id() {
    let remote = FakeRemote::reachable();
    let (mut engine, _mirror) = project_engine(remote.clone());
    engine.load().await.unwrap();

    engine.add_row(Project::blank()).await.unwrap();

    let created = &engine.records()[2];
    assert_eq!(created.id, RecordId::from("100"));
    assert_eq!(created.ordinal, 3);
    assert_eq!(remote.state.borrow().records.len(), 1);
}

#[tokio::test]
async fn failed_remote_create_rolls_the_insert_back() {
    let remote = FakeRemote::reachable();
    remote.state.borrow_mut().fail_create = true;
    let (mut engine, _mirror) = project_engine(remote);
    engine.load().await.unwrap();

    let result = engine.add_row(Project::blank()).await;

    assert!(result.is_err());
    assert_eq!(engine.records().len(), 2);
    assert!(engine.records().iter().all(|r| !r.id.is_temporary()));
    assert!(engine.errors().message().is_some());
}

#[tokio::test]
async fn offline_create_keeps_the_row_and_mirrors_it() {
    let remote = FakeRemote::unreachable();
    let (mut engine, mirror) = project_engine(remote.clone());
    engine.load().await.unwrap();

    engine.add_row(Project::blank()).await.unwrap();

    assert_eq!(engine.records().len(), 3);
    assert_eq!(engine.records()[2].ordinal, 3);
    assert!(engine.records()[2].id.is_temporary());
    let mirrored: Vec<Project> = mirror.load(Project::CACHE_KEY).unwrap().unwrap();
    assert_eq!(mirrored.len(), 3);
    assert!(!remote.calls().contains(&"create".to_string()));
    assert!(engine.errors().message().is_none());
}

#[tokio::test]
async fn remove_deletes_remotely_after_confirmation() {
    let remote = FakeRemote::reachable();
    remote.push_record(wire_project(1, "First", 10.0));
    remote.push_record(wire_project(2, "Second", 20.0));
    let (mut engine, _mirror) = project_engine(remote.clone());
    engine.load().await.unwrap();

    let ticket = engine.request_removal(0).unwrap();
    assert_eq!(ticket.label, "First");
    engine.remove_row(ticket).await.unwrap();

    assert_eq!(engine.records().len(), 1);
    assert_eq!(engine.records()[0].name, "Second");
    assert_eq!(engine.records()[0].ordinal, 1);
    assert_eq!(remote.state.borrow().records.len(), 1);
}

#[tokio::test]
async fn failed_remote_delete_reinserts_at_the_original_index() {
    let remote = FakeRemote::reachable();
    remote.push_record(wire_project(1, "First", 10.0));
    remote.push_record(wire_project(2, "Second", 20.0));
    remote.push_record(wire_project(3, "Third", 30.0));
    remote.state.borrow_mut().fail_delete = true;
    let (mut engine, _mirror) = project_engine(remote);
    engine.load().await.unwrap();

    let ticket = engine.request_removal(1).unwrap();
    let result = engine.remove_row(ticket).await;

    assert!(result.is_err());
    assert_eq!(engine.records().len(), 3);
    assert_eq!(engine.records()[1].name, "Second");
    assert_eq!(engine.records()[1].dev, 20.0);
    let ordinals: Vec<u32> = engine.records().iter().map(|r| r.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);
    assert!(engine.errors().message().is_some());
}

#[tokio::test]
async fn a_stale_removal_ticket_is_refused() {
    let remote = FakeRemote::reachable();
    remote.push_record(wire_project(1, "First", 10.0));
    let (mut engine, _mirror) = project_engine(remote);
    engine.load().await.unwrap();

    let ticket = engine.request_removal(0).unwrap();
    engine.remove_row(ticket.clone()).await.unwrap();

    assert!(matches!(
        engine.remove_row(ticket).await.unwrap_err(),
        SyncError::Index { .. }
    ));
}

#[tokio::test]
async fn failed_remote_update_keeps_the_local_value() {
    let remote = FakeRemote::reachable();
    remote.state.borrow_mut().fail_replace = true;
    let (mut engine, _mirror) = project_engine(remote);
    engine.load().await.unwrap();

    let result = engine
        .update_field(0, ProjectField::Dev, FieldValue::Amount(9999.0))
        .await;

    assert!(result.is_err());
    assert_eq!(engine.records()[0].dev, 9999.0);
    assert!(engine.errors().message().is_some());
}

#[tokio::test]
async fn offline_update_applies_locally_without_error() {
    let (mut engine, _mirror) = project_engine(FakeRemote::unreachable());
    engine.load().await.unwrap();

    engine
        .update_field(0, ProjectField::Dev, FieldValue::Amount(1.5))
        .await
        .unwrap();

    assert_eq!(engine.records()[0].dev, 1.5);
    assert!(engine.errors().message().is_none());
}

#[tokio::test]
async fn out_of_bounds_update_aborts_without_mutating() {
    let (mut engine, _mirror) = project_engine(FakeRemote::unreachable());
    engine.load().await.unwrap();
    let before: Vec<Project> = engine.records().to_vec();

    let err = engine
        .update_field(9, ProjectField::Dev, FieldValue::Amount(1.0))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Index { index: 9, len: 2 }));
    assert_eq!(engine.records(), &before[..]);
    assert!(engine.errors().message().is_none());
}

#[tokio::test]
async fn snapshot_datasets_never_issue_row_requests() {
    let remote = FakeRemote::snapshot();
    let (mut engine, _mirror) = project_engine(remote.clone());
    engine.load().await.unwrap();

    engine.add_row(Project::blank()).await.unwrap();
    engine
        .update_field(0, ProjectField::Dev, FieldValue::Amount(3.0))
        .await
        .unwrap();
    let ticket = engine.request_removal(2).unwrap();
    engine.remove_row(ticket).await.unwrap();

    let calls = remote.calls();
    assert!(calls
        .iter()
        .all(|call| !call.starts_with("create") && !call.starts_with("replace:") && !call.starts_with("delete")));
    assert_eq!(engine.records().len(), 2);
}

#[tokio::test]
async fn submit_requires_connectivity() {
    let (mut engine, _mirror) = project_engine(FakeRemote::unreachable());
    engine.load().await.unwrap();
    let before: Vec<Project> = engine.records().to_vec();

    let err = engine.submit().await.unwrap_err();

    assert!(matches!(err, SyncError::Connectivity(_)));
    assert_eq!(engine.records(), &before[..]);
    assert!(engine.errors().message().is_some());
}

#[tokio::test]
async fn submit_pushes_the_collection_and_reloads_it() {
    let remote = FakeRemote::snapshot();
    let (mut engine, _mirror) = project_engine(remote.clone());
    engine.load().await.unwrap();
    engine
        .update_field(0, ProjectField::Dev, FieldValue::Amount(777.0))
        .await
        .unwrap();

    engine.submit().await.unwrap();

    assert!(remote.calls().contains(&"replace_all".to_string()));
    assert_eq!(remote.state.borrow().records.len(), 2);
    assert_eq!(engine.records().len(), 2);
    assert_eq!(engine.records()[0].dev, 777.0);
}

#[tokio::test]
async fn failed_submit_leaves_local_state_untouched() {
    let remote = FakeRemote::snapshot();
    remote.state.borrow_mut().fail_replace_all = true;
    let (mut engine, _mirror) = project_engine(remote.clone());
    engine.load().await.unwrap();
    let before: Vec<Project> = engine.records().to_vec();

    assert!(engine.submit().await.is_err());

    assert_eq!(engine.records(), &before[..]);
    assert!(remote.state.borrow().records.is_empty());
    assert!(engine.errors().message().is_some());
}

#[tokio::test]
async fn reconnect_reloads_and_clears_the_error_slot() {
    let remote = FakeRemote::unreachable();
    let (mut engine, _mirror) = project_engine(remote.clone());
    engine.load().await.unwrap();
    assert!(engine.submit().await.is_err());
    assert!(engine.errors().message().is_some());

    {
        let mut state = remote.state.borrow_mut();
        state.reachable = true;
        state.records = vec![wire_project(5, "Back online", 1.0)];
    }
    engine.reconnect().await.unwrap();

    assert_eq!(engine.records().len(), 1);
    assert_eq!(engine.records()[0].name, "Back online");
    assert!(engine.errors().message().is_none());
}

#[tokio::test]
async fn reconnect_fails_while_still_unreachable() {
    let (mut engine, _mirror) = project_engine(FakeRemote::unreachable());
    engine.load().await.unwrap();

    assert!(matches!(
        engine.reconnect().await.unwrap_err(),
        SyncError::Connectivity(_)
    ));
}

#[tokio::test]
async fn no_request_is_left_in_flight_after_operations_complete() {
    let shared_errors = ErrorSlot::default();
    let mirror = Arc::new(CacheMirror::open_in_memory().unwrap());
    let mut engine: SyncEngine<Project, FakeRemote> = SyncEngine::new(
        FakeRemote::reachable(),
        mirror,
        seed_projects(),
        shared_errors,
    );

    engine.load().await.unwrap();
    engine.add_row(Project::blank()).await.unwrap();
    assert!(!engine.in_flight());
}
