//! Tests for document transitions, undo history and the document store.
mod common;
use common::*;
use nodeweave::error::NodeDataError;
use nodeweave::prelude::*;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

const PATH: &str = "flows/main.json";

fn store_with(graph: WorkflowGraph) -> DocumentStore {
    let mut store = DocumentStore::new();
    store.open(PATH, Some(graph));
    store
}

fn doc(store: &DocumentStore) -> &WorkflowDocument {
    store.get(PATH).expect("document is open")
}

fn node_ids(store: &DocumentStore) -> Vec<String> {
    doc(store).nodes().iter().map(|n| n.id.clone()).collect()
}

#[test]
fn test_history_is_bounded_to_limit() {
    let mut store = DocumentStore::new();
    store.open(PATH, None);
    for i in 0..60 {
        store.apply_node_changes(PATH, local_add(&format!("n{i}")));
    }

    let history = doc(&store).history();
    assert_eq!(history.limit(), 50);
    assert_eq!(history.past_len(), 50);

    for _ in 0..50 {
        assert!(store.undo(PATH));
    }
    assert!(!store.undo(PATH));
    // The oldest ten actions are no longer undoable.
    assert_eq!(doc(&store).nodes().len(), 10);
}

#[test]
fn test_undo_then_new_action_invalidates_redo() {
    let mut store = DocumentStore::new();
    store.open(PATH, None);
    store.apply_node_changes(PATH, local_add("a"));
    store.apply_node_changes(PATH, local_add("b"));

    assert!(store.undo(PATH));
    assert_eq!(node_ids(&store), vec!["a"]);
    assert!(doc(&store).history().can_redo());

    store.apply_node_changes(PATH, local_add("c"));
    assert_eq!(doc(&store).history().future_len(), 0);
    assert!(!store.redo(PATH));
    assert_eq!(node_ids(&store), vec!["a", "c"]);
}

#[test]
fn test_undo_redo_round_trip() {
    let mut store = store_with(create_chain_graph());
    let original = doc(&store).graph().clone();

    store.connect(PATH, &Connection::new("a", "c"));
    let connected = doc(&store).graph().clone();
    assert_eq!(connected.edges.len(), 3);

    assert!(store.undo(PATH));
    assert_eq!(doc(&store).graph(), &original);
    assert!(store.redo(PATH));
    assert_eq!(doc(&store).graph(), &connected);
    assert!(!store.redo(PATH));
}

#[test]
fn test_undo_on_empty_history_is_noop() {
    let mut store = store_with(create_chain_graph());
    assert!(!store.undo(PATH));
    assert!(!store.redo(PATH));
    assert!(!store.is_dirty(PATH));
}

#[test]
fn test_snapshots_share_the_recorded_graph() {
    let mut store = store_with(create_chain_graph());
    let before = doc(&store).snapshot();

    store.add_node(PATH, node("d"));
    let recorded = doc(&store).history().past().last().cloned().expect("snapshot");
    assert!(Arc::ptr_eq(&before, &recorded));
}

#[test]
fn test_dirty_lifecycle() {
    let mut store = DocumentStore::new();
    store.open(PATH, None);
    assert!(!store.is_dirty(PATH));

    store.apply_node_changes(PATH, local_add("a"));
    store.apply_node_changes(PATH, local_add("b"));
    store.connect(PATH, &Connection::new("a", "b"));
    assert!(store.is_dirty(PATH));

    // Successful save.
    store.mark_dirty(PATH, false);
    assert!(!store.is_dirty(PATH));

    // Undo restores state that differs from what was saved.
    assert!(store.undo(PATH));
    assert!(store.is_dirty(PATH));
}

#[test]
fn test_drag_dirties_only_when_settled() {
    let mut store = store_with(graph(vec![node("a")], vec![]));
    let moving = |dragging| {
        ChangeSet::local(vec![NodeChange::Position {
            id: "a".to_string(),
            position: Some(Position::new(40.0, 40.0)),
            dragging: Some(dragging),
        }])
    };

    store.apply_node_changes(PATH, moving(true));
    assert!(!store.is_dirty(PATH));
    assert_eq!(doc(&store).nodes()[0].position, Position::new(40.0, 40.0));

    store.apply_node_changes(PATH, moving(false));
    assert!(store.is_dirty(PATH));
    // Moves are snapshotted explicitly by the caller, not per event.
    assert_eq!(doc(&store).history().past_len(), 0);

    store.record_snapshot(PATH);
    assert_eq!(doc(&store).history().past_len(), 1);
}

#[test]
fn test_selection_changes_do_not_dirty() {
    let mut store = store_with(create_chain_graph());
    let edge_id = doc(&store).edges()[0].id.clone();

    store.apply_node_changes(
        PATH,
        ChangeSet::local(vec![NodeChange::Select {
            id: "a".to_string(),
            selected: true,
        }]),
    );
    store.apply_edge_changes(
        PATH,
        ChangeSet::local(vec![EdgeChange::Select {
            id: edge_id,
            selected: true,
        }]),
    );

    assert!(doc(&store).nodes()[0].selected);
    assert!(doc(&store).edges()[0].selected);
    assert!(!store.is_dirty(PATH));
    assert_eq!(doc(&store).history().past_len(), 0);
}

#[test]
fn test_edge_removal_is_undoable() {
    let mut store = store_with(create_chain_graph());
    let edge_id = doc(&store).edges()[0].id.clone();

    store.apply_edge_changes(PATH, ChangeSet::local(vec![EdgeChange::Remove { id: edge_id }]));
    assert_eq!(doc(&store).edges().len(), 1);
    assert!(store.is_dirty(PATH));

    assert!(store.undo(PATH));
    assert_eq!(doc(&store).edges().len(), 2);
}

#[test]
fn test_empty_change_set_is_ignored() {
    let mut store = store_with(create_chain_graph());
    store.apply_node_changes(PATH, ChangeSet::local(vec![]));
    store.apply_edge_changes(PATH, ChangeSet::local(vec![]));
    assert!(!store.is_dirty(PATH));
    assert_eq!(doc(&store).history().past_len(), 0);
}

#[test]
fn test_disconnect_records_only_when_something_changed() {
    let mut store = store_with(create_chain_graph());

    store.disconnect(PATH, &Connection::new("c", "a"));
    assert_eq!(doc(&store).history().past_len(), 0);
    assert!(!store.is_dirty(PATH));

    store.disconnect(PATH, &Connection::new("a", "b"));
    assert_eq!(doc(&store).edges().len(), 1);
    assert_eq!(doc(&store).history().past_len(), 1);
    assert!(store.is_dirty(PATH));
}

#[test]
fn test_connecting_an_existing_link_records_nothing() {
    let mut store = store_with(create_chain_graph());
    store.connect(PATH, &Connection::new("a", "c"));
    assert_eq!(doc(&store).history().past_len(), 1);
    store.mark_dirty(PATH, false);

    store.connect(PATH, &Connection::new("a", "c"));
    assert_eq!(doc(&store).edges().len(), 3);
    assert_eq!(doc(&store).history().past_len(), 1);
    assert!(!store.is_dirty(PATH));
}

#[test]
fn test_structural_changes_for_unknown_ids_record_nothing() {
    let mut store = store_with(create_chain_graph());
    let before = doc(&store).graph().clone();

    store.apply_node_changes(
        PATH,
        ChangeSet::local(vec![NodeChange::Remove {
            id: "ghost".to_string(),
        }]),
    );
    store.apply_edge_changes(
        PATH,
        ChangeSet::local(vec![EdgeChange::Remove {
            id: "ghost-edge".to_string(),
        }]),
    );

    assert_eq!(doc(&store).graph(), &before);
    assert_eq!(doc(&store).history().past_len(), 0);
    assert!(!store.is_dirty(PATH));
}

#[test]
fn test_remote_changes_bypass_history_and_dirty() {
    let mut store = DocumentStore::new();
    store.open(PATH, None);
    store.apply_node_changes(PATH, remote_add("peer-node"));

    assert_eq!(node_ids(&store), vec!["peer-node"]);
    assert_eq!(doc(&store).history().past_len(), 0);
    assert!(!store.is_dirty(PATH));

    // Undo cannot remove a node a collaborator added.
    assert!(!store.undo(PATH));
    assert_eq!(node_ids(&store), vec!["peer-node"]);
}

#[test]
fn test_local_undo_keeps_later_remote_edits_out_of_history() {
    let mut store = DocumentStore::new();
    store.open(PATH, None);
    store.apply_node_changes(PATH, local_add("mine"));
    store.apply_node_changes(PATH, remote_add("theirs"));

    // Undo restores the snapshot taken before the local add.
    assert!(store.undo(PATH));
    assert!(node_ids(&store).is_empty());
}

#[test]
fn test_remote_data_updates_are_last_writer_wins() {
    let mut store = store_with(graph(vec![create_http_node("req")], vec![]));
    let write = |url: &str| object(json!({ "values": { "url": url, "method": "GET" } }));

    store
        .update_node_data(PATH, "req", &write("https://first"), ChangeOrigin::Remote)
        .expect("valid update");
    store
        .update_node_data(PATH, "req", &write("https://second"), ChangeOrigin::Remote)
        .expect("valid update");

    let data = &doc(&store).graph().node("req").expect("node").data;
    assert_eq!(data.value("url"), Some(&json!("https://second")));
    assert!(!store.is_dirty(PATH));
    assert_eq!(doc(&store).history().past_len(), 0);
}

#[test]
fn test_local_data_update_is_undoable() {
    let mut store = store_with(graph(vec![create_http_node("req")], vec![]));
    let partial = object(json!({ "values": { "method": "POST", "retries": 3 } }));

    store
        .update_node_data(PATH, "req", &partial, ChangeOrigin::Local)
        .expect("valid update");
    let data = &doc(&store).graph().node("req").expect("node").data;
    assert_eq!(data.value("method"), Some(&json!("POST")));
    assert_eq!(data.value("retries"), Some(&json!(3)));
    assert!(data.schema.is_some());
    assert!(store.is_dirty(PATH));

    assert!(store.undo(PATH));
    let data = &doc(&store).graph().node("req").expect("node").data;
    assert_eq!(data.value("method"), Some(&json!("GET")));
}

#[test]
fn test_data_update_rejects_schema_violations() {
    let mut store = store_with(graph(vec![create_http_node("req")], vec![]));
    let before = doc(&store).graph().clone();

    let wrong_type = object(json!({ "values": { "retries": "many" } }));
    let err = store
        .update_node_data(PATH, "req", &wrong_type, ChangeOrigin::Local)
        .unwrap_err();
    assert!(matches!(err, NodeDataError::TypeMismatch { ref parameter, .. } if parameter == "retries"));

    let bad_choice = object(json!({ "values": { "method": "DELETE" } }));
    let err = store
        .update_node_data(PATH, "req", &bad_choice, ChangeOrigin::Local)
        .unwrap_err();
    assert!(matches!(err, NodeDataError::TypeMismatch { .. }));

    let unknown = object(json!({ "values": { "body": "{}" } }));
    let err = store
        .update_node_data(PATH, "req", &unknown, ChangeOrigin::Local)
        .unwrap_err();
    assert_eq!(
        err,
        NodeDataError::UnknownParameter {
            node_id: "req".to_string(),
            parameter: "body".to_string(),
        }
    );

    let not_linkable = object(json!({ "connectedParams": { "retries": true } }));
    let err = store
        .update_node_data(PATH, "req", &not_linkable, ChangeOrigin::Local)
        .unwrap_err();
    assert!(matches!(err, NodeDataError::NotConnectable { .. }));

    assert_eq!(doc(&store).graph(), &before);
    assert!(!store.is_dirty(PATH));
    assert_eq!(doc(&store).history().past_len(), 0);
}

#[test]
fn test_leftover_values_do_not_block_unrelated_updates() {
    let mut stale = create_http_node("req");
    stale.data.values.insert("legacy".to_string(), json!("x"));
    let mut store = store_with(graph(vec![stale], vec![]));

    let link = object(json!({ "connectedParams": { "url": true } }));
    store
        .update_node_data(PATH, "req", &link, ChangeOrigin::Remote)
        .expect("legacy value is untouched");
    let rename = object(json!({ "label": "renamed" }));
    store
        .update_node_data(PATH, "req", &rename, ChangeOrigin::Local)
        .expect("legacy value is untouched");

    // Replacing `values` wholesale checks only the entries that changed.
    let carried = object(json!({ "values": { "legacy": "x", "method": "POST" } }));
    store
        .update_node_data(PATH, "req", &carried, ChangeOrigin::Local)
        .expect("legacy value is carried over unchanged");

    let data = &doc(&store).graph().node("req").expect("node").data;
    assert!(data.is_linked("url"));
    assert_eq!(data.extra.get("label"), Some(&json!("renamed")));
    assert_eq!(data.value("method"), Some(&json!("POST")));
    assert_eq!(data.value("legacy"), Some(&json!("x")));

    let changed = object(json!({ "values": { "legacy": "y" } }));
    let err = store
        .update_node_data(PATH, "req", &changed, ChangeOrigin::Local)
        .unwrap_err();
    assert!(matches!(err, NodeDataError::UnknownParameter { ref parameter, .. } if parameter == "legacy"));

    let invalid = object(json!({ "values": { "legacy": "x", "retries": "many" } }));
    let err = store
        .update_node_data(PATH, "req", &invalid, ChangeOrigin::Local)
        .unwrap_err();
    assert!(matches!(err, NodeDataError::TypeMismatch { ref parameter, .. } if parameter == "retries"));
}

#[test]
fn test_linking_a_connectable_parameter() {
    let mut store = store_with(graph(vec![create_http_node("req")], vec![]));
    let link = object(json!({ "connectedParams": { "url": true } }));
    store
        .update_node_data(PATH, "req", &link, ChangeOrigin::Local)
        .expect("url can be linked");
    assert!(doc(&store).graph().node("req").expect("node").data.is_linked("url"));
}

#[test]
fn test_schemaless_data_accepts_anything() {
    let mut store = store_with(graph(vec![node("a")], vec![]));
    let partial = object(json!({ "values": { "anything": [1, 2] }, "label": "custom" }));
    store
        .update_node_data(PATH, "a", &partial, ChangeOrigin::Local)
        .expect("no schema to violate");

    let data = &doc(&store).graph().node("a").expect("node").data;
    assert_eq!(data.value("anything"), Some(&json!([1, 2])));
    assert_eq!(data.extra.get("label"), Some(&json!("custom")));
}

#[test]
fn test_data_update_for_unknown_node_is_noop() {
    let mut store = store_with(create_chain_graph());
    let partial = object(json!({ "values": { "x": 1 } }));
    store
        .update_node_data(PATH, "ghost", &partial, ChangeOrigin::Local)
        .expect("ignored");
    assert_eq!(doc(&store).history().past_len(), 0);
    assert!(!store.is_dirty(PATH));
}

#[test]
fn test_unknown_path_operations_are_noops() {
    let mut store = DocumentStore::new();
    store.apply_node_changes("nope", local_add("a"));
    store.connect("nope", &Connection::new("a", "b"));
    assert!(!store.undo("nope"));
    assert!(!store.is_dirty("nope"));
    assert!(store.export_forest("nope").is_none());
    assert!(store.is_empty());
}

#[test]
fn test_open_is_idempotent() {
    let mut store = DocumentStore::new();
    assert!(store.open(PATH, None));
    store.apply_node_changes(PATH, local_add("a"));
    assert!(!store.open(PATH, Some(create_chain_graph())));
    assert_eq!(node_ids(&store), vec!["a"]);
}

#[test]
fn test_export_forest_is_pure() {
    let mut store = store_with(create_chain_graph());
    store.add_node(PATH, node("d"));

    let compiled = store.export_forest(PATH).expect("open");
    assert_eq!(compiled.roots.len(), 2);
    assert_eq!(doc(&store).history().past_len(), 1);
    assert!(doc(&store).history().can_undo());
}

#[test]
fn test_clear_and_replace_graph_reset_history() {
    let mut store = store_with(create_chain_graph());
    store.add_node(PATH, node("d"));

    store.clear(PATH);
    assert!(doc(&store).graph().is_empty());
    assert!(!doc(&store).history().can_undo());
    assert!(!store.is_dirty(PATH));

    store.add_node(PATH, node("e"));
    store.replace_graph(PATH, create_chain_graph());
    assert_eq!(doc(&store).nodes().len(), 3);
    assert!(!doc(&store).history().can_undo());
    assert!(!store.is_dirty(PATH));
}

#[test]
fn test_remote_cursors() {
    let mut store = store_with(WorkflowGraph::default());
    let cursor = RemoteCursor {
        user_id: "u1".to_string(),
        user_name: "Ada".to_string(),
        x: 1.0,
        y: 2.0,
        color: "#ff0000".to_string(),
    };
    store.update_remote_cursor(PATH, cursor.clone());
    store.update_remote_cursor(PATH, RemoteCursor { x: 9.0, ..cursor });
    assert_eq!(doc(&store).cursors().len(), 1);
    assert_eq!(doc(&store).cursors().get("u1").map(|c| c.x), Some(9.0));

    store.remove_remote_cursor(PATH, "u1");
    assert!(doc(&store).cursors().is_empty());
    assert!(!store.is_dirty(PATH));
}

#[test]
fn test_document_value_transitions() {
    let doc = WorkflowDocument::new(2)
        .add_node(node("a"))
        .add_node(node("b"))
        .add_node(node("c"));
    assert_eq!(doc.history().past_len(), 2);

    let doc = doc.undo().undo().undo();
    let ids: Vec<&str> = doc.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
    assert_eq!(doc.history().future_len(), 2);
}

#[test]
fn test_config_drives_history_limit() {
    let config = EngineConfig::from_toml_str("history_limit = 3").expect("valid config");
    let mut store = DocumentStore::with_config(&config);
    store.open(PATH, None);
    for i in 0..5 {
        store.add_node(PATH, node(&format!("n{i}")));
    }
    assert_eq!(doc(&store).history().past_len(), 3);
}

proptest! {
    #[test]
    fn test_history_never_exceeds_limit(ops in prop::collection::vec(0u8..3, 0..120)) {
        let mut store = DocumentStore::new();
        store.open(PATH, None);
        for (i, op) in ops.into_iter().enumerate() {
            match op {
                0 => store.add_node(PATH, node(&format!("n{i}"))),
                1 => { store.undo(PATH); }
                _ => { store.redo(PATH); }
            }
            prop_assert!(doc(&store).history().past_len() <= 50);
        }
    }
}
