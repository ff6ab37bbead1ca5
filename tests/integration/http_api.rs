//! Integration tests for the task store over HTTP.
//!
//! Starts `tasktimer-server` in-process on an ephemeral port with its data
//! file in a temp directory, and drives it through `HttpTaskApi` (and raw
//! `reqwest` for malformed requests).

use std::time::Duration;

use tasktimer::api::http::HttpTaskApi;
use tasktimer::api::{ApiError, TaskApi};
use tasktimer::tasks::{SyncCommand, SyncEvent, spawn_sync};
use tasktimer_proto::{Category, Task, TaskId, TaskPatch};

struct TestServer {
    base_url: String,
    dir: tempfile::TempDir,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    fn data_file(&self) -> std::path::PathBuf {
        self.dir.path().join("data").join("tasks.json")
    }

    fn api(&self) -> HttpTaskApi {
        HttpTaskApi::new(&self.base_url, Duration::from_secs(5)).expect("client")
    }
}

async fn start_server() -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let (addr, handle) =
        tasktimer_server::api::start_server("127.0.0.1:0", dir.path().join("data/tasks.json"))
            .await
            .expect("failed to start task server");
    TestServer {
        base_url: format!("http://{addr}"),
        dir,
        _handle: handle,
    }
}

fn status_of(err: &ApiError) -> u16 {
    match err {
        ApiError::Status { status, .. } => *status,
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_is_empty_before_first_write() {
    let server = start_server().await;
    assert!(server.api().list().await.unwrap().is_empty());
    assert!(!server.data_file().exists());
}

#[tokio::test]
async fn create_returns_zeroed_task_and_persists_it() {
    let server = start_server().await;
    let api = server.api();

    let task = api.create("  Draft banner ", Category::Criacao).await.unwrap();
    assert_eq!(task.name, "Draft banner");
    assert_eq!(task.category, Category::Criacao);
    assert_eq!(task.total_time, 0);
    assert_eq!(task.current_time, 0);
    assert!(!task.is_running);
    assert!(task.created_at.is_some());

    assert_eq!(api.list().await.unwrap(), vec![task.clone()]);

    let on_disk: Vec<Task> =
        serde_json::from_str(&std::fs::read_to_string(server.data_file()).unwrap()).unwrap();
    assert_eq!(on_disk, vec![task]);
}

#[tokio::test]
async fn create_ids_are_distinct() {
    let server = start_server().await;
    let api = server.api();
    let a = api.create("a", Category::Criacao).await.unwrap();
    let b = api.create("b", Category::Ajustes).await.unwrap();
    assert_ne!(a.id, b.id);
    let listed: Vec<TaskId> = api.list().await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(listed, vec![a.id, b.id]);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let server = start_server().await;
    let err = server.api().create("   ", Category::Criacao).await.unwrap_err();
    assert_eq!(status_of(&err), 400);
}

#[tokio::test]
async fn rename_changes_only_the_name() {
    let server = start_server().await;
    let api = server.api();
    let task = api.create("Draft", Category::Ajustes).await.unwrap();
    api.update(&task.id, &TaskPatch::stop(12)).await.unwrap();

    let renamed = api
        .update(&task.id, &TaskPatch::rename("Renamed"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.category, Category::Ajustes);
    assert_eq!(renamed.total_time, 12);
    assert!(!renamed.is_running);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let server = start_server().await;
    let err = server
        .api()
        .update(&TaskId::from("ghost"), &TaskPatch::start())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Tarefa não encontrada"));
}

#[tokio::test]
async fn lowering_total_time_is_rejected() {
    let server = start_server().await;
    let api = server.api();
    let task = api.create("t", Category::Criacao).await.unwrap();
    api.update(&task.id, &TaskPatch::stop(30)).await.unwrap();

    let err = api.update(&task.id, &TaskPatch::stop(10)).await.unwrap_err();
    assert_eq!(status_of(&err), 400);
    assert_eq!(api.list().await.unwrap()[0].total_time, 30);
}

#[tokio::test]
async fn delete_twice_is_not_found_and_list_unchanged() {
    let server = start_server().await;
    let api = server.api();
    let keep = api.create("keep", Category::Criacao).await.unwrap();
    let gone = api.create("gone", Category::Criacao).await.unwrap();

    api.delete(&gone.id).await.unwrap();
    assert!(api.delete(&gone.id).await.unwrap_err().is_not_found());
    assert!(
        api.delete(&TaskId::from("unknown"))
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert_eq!(api.list().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn unknown_patch_key_is_bad_request() {
    let server = start_server().await;
    let task = server.api().create("t", Category::Criacao).await.unwrap();

    let response = reqwest::Client::new()
        .put(format!("{}/api/tasks", server.base_url))
        .json(&serde_json::json!({
            "id": task.id,
            "updates": { "name": "x", "color": "red" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    let server = start_server().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/tasks", server.base_url);

    let response = client
        .post(&url)
        .json(&serde_json::json!({ "name": "only a name" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .put(&url)
        .json(&serde_json::json!({ "updates": { "name": "x" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ID da tarefa é obrigatório");

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn corrupt_document_is_server_error() {
    let server = start_server().await;
    std::fs::create_dir_all(server.data_file().parent().unwrap()).unwrap();
    std::fs::write(server.data_file(), "{ not json").unwrap();

    let err = server.api().list().await.unwrap_err();
    assert_eq!(status_of(&err), 500);
    assert!(err.to_string().contains("Erro ao buscar tarefas"));
}

#[tokio::test]
async fn health_endpoint_answers() {
    let server = start_server().await;
    let response = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn sync_worker_against_live_server() {
    let server = start_server().await;
    let (tx, mut rx, handle) = spawn_sync(server.api(), 16);

    let local_id = TaskId::new();
    tx.send(SyncCommand::Create {
        local_id: local_id.clone(),
        name: "Draft banner".to_string(),
        category: Category::Criacao,
    })
    .await
    .unwrap();
    let SyncEvent::Created { local_id: got, task } = next_event(&mut rx).await else {
        panic!("expected Created");
    };
    assert_eq!(got, local_id);

    tx.send(SyncCommand::Update {
        id: task.id.clone(),
        patch: TaskPatch::stop(5),
    })
    .await
    .unwrap();
    tx.send(SyncCommand::Load).await.unwrap();

    let SyncEvent::Updated(updated) = next_event(&mut rx).await else {
        panic!("expected Updated");
    };
    assert_eq!(updated.total_time, 5);
    let SyncEvent::Loaded(tasks) = next_event(&mut rx).await else {
        panic!("expected Loaded");
    };
    assert_eq!(tasks, vec![updated]);

    tx.send(SyncCommand::Shutdown).await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn unreachable_server_reports_network_failure() {
    // Bind and drop a listener to get a port nothing is serving.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = HttpTaskApi::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2)).unwrap();
    let (tx, mut rx, _handle) = spawn_sync(api, 4);

    tx.send(SyncCommand::Create {
        local_id: TaskId::from("local"),
        name: "offline".to_string(),
        category: Category::Ajustes,
    })
    .await
    .unwrap();
    let SyncEvent::CreateFailed { error, .. } = next_event(&mut rx).await else {
        panic!("expected CreateFailed");
    };
    assert!(error.is_network());
}

async fn next_event(rx: &mut tokio::sync::mpsc::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timeout waiting for sync event")
        .expect("sync worker stopped")
}
