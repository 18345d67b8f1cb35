use std::future::IntoFuture;
use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use doctree_core::tree::find_item;
use doctree_core::{ClientConfig, DocRef, DocRefInfo, PermissionInheritance};
use doctree_store::{BulkActionResult, DocOperation, ExplorerAction, Store};
use doctree_sync::{BulkRequest, RenameRequest, RequestTracker, SyncClient, SyncError, SyncEvent};

fn service_tree() -> DocRef {
    DocRef::new_folder("root", "System")
        .with_child(
            DocRef::new_folder("feeds", "Feeds")
                .with_child(DocRef::new_document("a", "Feed", "FEED_A"))
                .with_child(DocRef::new_document("b", "Feed", "FEED_B")),
        )
        .with_child(DocRef::new_folder("archive", "Archive"))
}

async fn all() -> Json<DocRef> {
    Json(service_tree())
}

async fn doc_ref_types() -> Json<Vec<String>> {
    Json(vec!["Feed".to_string(), "Folder".to_string()])
}

async fn info(Path((doc_type, uuid)): Path<(String, String)>) -> Json<DocRefInfo> {
    Json(DocRefInfo {
        doc_ref: DocRef::new_document(uuid, doc_type, "FEED_A"),
        create_time: Some(1_700_000_000_000),
        update_time: Some(1_700_000_100_000),
        create_user: Some("admin".to_string()),
        update_user: Some("admin".to_string()),
        other_info: None,
    })
}

async fn rename(Json(body): Json<RenameRequest>) -> Json<DocRef> {
    let mut renamed = body.doc_ref;
    renamed.name = body.name.into();
    Json(renamed)
}

async fn copy(Json(body): Json<BulkRequest>) -> Json<BulkActionResult> {
    let copies = body
        .doc_refs
        .iter()
        .map(|d| DocRef {
            uuid: format!("{}-copy", d.uuid),
            ..d.stripped()
        })
        .collect();
    Json(BulkActionResult::all_succeeded(copies))
}

// Fails everything when the caller asks to inherit nothing.
async fn move_docs(Json(body): Json<BulkRequest>) -> Json<BulkActionResult> {
    if body.permission_inheritance == PermissionInheritance::None {
        return Json(BulkActionResult {
            succeeded: vec![],
            failed: body.doc_refs,
            message: Some("permission inheritance required".to_string()),
        });
    }
    Json(BulkActionResult::all_succeeded(body.doc_refs))
}

// Refuses documents named FEED_B.
async fn delete_docs(Json(doc_refs): Json<Vec<DocRef>>) -> Json<BulkActionResult> {
    let (failed, succeeded): (Vec<_>, Vec<_>) =
        doc_refs.into_iter().partition(|d| d.name == "FEED_B");
    Json(BulkActionResult {
        succeeded,
        failed,
        message: None,
    })
}

async fn spawn_service() -> (SocketAddr, JoinHandle<Result<(), std::io::Error>>) {
    let app = Router::new()
        .route("/api/explorer/v1/all", get(all))
        .route("/api/explorer/v1/docRefTypes", get(doc_ref_types))
        .route("/api/explorer/v1/info/{type}/{uuid}", get(info))
        .route("/api/explorer/v1/rename", put(rename))
        .route("/api/explorer/v1/copy", post(copy))
        .route("/api/explorer/v1/move", put(move_docs))
        .route("/api/explorer/v1/delete", delete(delete_docs))
        .route(
            "/broken/all",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        )
        .route("/garbled/all", get(|| async { "not json" }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(axum::serve(listener, app).into_future());
    (addr, server)
}

fn client_for(addr: SocketAddr, path: &str) -> (SyncClient, tokio::sync::mpsc::Receiver<SyncEvent>) {
    let config = ClientConfig::new(format!("http://{addr}{path}"));
    SyncClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_tree_and_types() {
    let (addr, server) = spawn_service().await;
    let (client, _events) = client_for(addr, "/api/explorer/v1");

    let action = client.execute(DocOperation::FetchDocTree).await.unwrap();
    assert_eq!(
        action,
        ExplorerAction::DocTreeReceived {
            document_tree: service_tree()
        }
    );

    let action = client.execute(DocOperation::FetchDocRefTypes).await.unwrap();
    assert_eq!(
        action,
        ExplorerAction::DocRefTypesReceived {
            doc_ref_types: vec!["Feed".to_string(), "Folder".to_string()]
        }
    );

    server.abort();
}

#[tokio::test]
async fn test_rename_sends_stripped_ref() {
    let (addr, server) = spawn_service().await;
    let (client, _events) = client_for(addr, "/api/explorer/v1/");

    let feeds = find_item(&service_tree(), "feeds").unwrap().clone();
    let action = client
        .execute(DocOperation::rename(feeds.clone(), "Inputs"))
        .await
        .unwrap();

    let ExplorerAction::DocRefRenamed {
        doc_ref,
        name,
        result,
    } = action
    else {
        panic!("expected a rename confirmation");
    };
    assert_eq!(doc_ref, feeds);
    assert_eq!(name, "Inputs");
    assert_eq!(result.name, "Inputs");
    assert!(result.children.is_none());

    server.abort();
}

#[tokio::test]
async fn test_round_trip_through_store() {
    let (addr, server) = spawn_service().await;
    let (client, _events) = client_for(addr, "/api/explorer/v1");
    let mut store = Store::new();

    let action = client.execute(DocOperation::FetchDocTree).await.unwrap();
    assert!(store.dispatch(action).is_none());

    let a = find_item(store.explorer_tree().document_tree().unwrap(), "a")
        .unwrap()
        .clone();
    let b = find_item(store.explorer_tree().document_tree().unwrap(), "b")
        .unwrap()
        .clone();
    let archive = find_item(store.explorer_tree().document_tree().unwrap(), "archive")
        .unwrap()
        .clone();

    let action = client
        .execute(DocOperation::copy(
            vec![a.clone()],
            archive.clone(),
            PermissionInheritance::Source,
        ))
        .await
        .unwrap();
    store.dispatch(action);
    let tree = store.explorer_tree().document_tree().unwrap();
    assert!(find_item(tree, "a-copy").is_some());
    assert!(find_item(tree, "a").is_some());

    let action = client
        .execute(DocOperation::delete(vec![a, b]))
        .await
        .unwrap();
    store.dispatch(action);
    let tree = store.explorer_tree().document_tree().unwrap();
    assert!(find_item(tree, "a").is_none());
    assert!(find_item(tree, "b").is_some());
    assert_eq!(store.explorer_tree_mut().take_notices().len(), 1);

    server.abort();
}

#[tokio::test]
async fn test_copied_folder_round_trip() {
    let (addr, server) = spawn_service().await;
    let (client, _events) = client_for(addr, "/api/explorer/v1");
    let mut store = Store::new();
    store.dispatch(ExplorerAction::DocTreeReceived {
        document_tree: service_tree(),
    });

    let feeds = find_item(&service_tree(), "feeds").unwrap().clone();
    let archive = find_item(&service_tree(), "archive").unwrap().clone();
    let action = client
        .execute(DocOperation::copy(
            vec![feeds],
            archive,
            PermissionInheritance::Destination,
        ))
        .await
        .unwrap();
    store.dispatch(action);

    let tree = store.explorer_tree().document_tree().unwrap();
    let copy = find_item(tree, "feeds-copy").unwrap();
    assert!(copy.is_folder());
    let names: Vec<&str> = copy
        .children
        .iter()
        .flatten()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, ["FEED_A", "FEED_B"]);
    assert_eq!(find_item(tree, "a").map(|d| d.name.as_str()), Some("FEED_A"));

    server.abort();
}

#[tokio::test]
async fn test_move_failure_is_reported_not_applied() {
    let (addr, server) = spawn_service().await;
    let (client, _events) = client_for(addr, "/api/explorer/v1");
    let mut store = Store::new();
    store.dispatch(ExplorerAction::DocTreeReceived {
        document_tree: service_tree(),
    });

    let a = DocRef::new_document("a", "Feed", "FEED_A");
    let action = client
        .execute(DocOperation::move_to(
            vec![a],
            DocRef::new_folder("archive", "Archive"),
            PermissionInheritance::None,
        ))
        .await
        .unwrap();
    store.dispatch(action);

    assert_eq!(store.explorer_tree().document_tree(), Some(&service_tree()));
    let notices = store.explorer_tree_mut().take_notices();
    assert_eq!(
        notices[0].message.as_deref(),
        Some("permission inheritance required")
    );

    server.abort();
}

#[tokio::test]
async fn test_submit_reports_marker_then_confirmation() {
    let (addr, server) = spawn_service().await;
    let (client, mut events) = client_for(addr, "/api/explorer/v1");
    let mut tracker = RequestTracker::new();

    let doc = DocRef::new_document("a", "Feed", "FEED_A");
    let request_id = client.submit(DocOperation::FetchDocInfo {
        doc_ref: doc.clone(),
    });

    let started = events.recv().await.unwrap();
    tracker.observe(&started);
    let SyncEvent::Started { marker, .. } = &started else {
        panic!("expected start, got {started:?}");
    };
    assert_eq!(
        marker,
        &Some(ExplorerAction::DocRefInfoOpened {
            doc_ref: doc.clone()
        })
    );
    assert!(tracker.is_pending(request_id));

    let done = events.recv().await.unwrap();
    tracker.observe(&done);
    assert_eq!(done.request_id(), request_id);
    let SyncEvent::Confirmed {
        action: ExplorerAction::DocRefInfoReceived { info },
        ..
    } = done
    else {
        panic!("expected info");
    };
    assert_eq!(info.doc_ref.uuid, "a");
    assert_eq!(info.create_user.as_deref(), Some("admin"));
    assert!(info.created_at().is_some());
    assert!(tracker.is_idle());

    server.abort();
}

#[tokio::test]
async fn test_error_statuses() {
    let (addr, server) = spawn_service().await;

    let (broken, mut events) = client_for(addr, "/broken");
    let request_id = broken.submit(DocOperation::FetchDocTree);
    let mut tracker = RequestTracker::new();
    tracker.observe(&events.recv().await.unwrap());
    let failed = events.recv().await.unwrap();
    tracker.observe(&failed);
    let SyncEvent::Failed { error, .. } = &failed else {
        panic!("expected failure, got {failed:?}");
    };
    assert_eq!(error.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(tracker.failures()[0].request_id, request_id);
    assert!(tracker.failures()[0].retryable);

    let (garbled, _events) = client_for(addr, "/garbled");
    let err = garbled.execute(DocOperation::FetchDocTree).await.unwrap_err();
    assert!(matches!(err, SyncError::Decode { .. }));

    let (missing, _events) = client_for(addr, "/nowhere");
    let err = missing.execute(DocOperation::FetchDocRefTypes).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));

    server.abort();
}
