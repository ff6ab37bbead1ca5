//! HTTP surface of the task store: router, handlers and error mapping.
//!
//! Four operations live on [`TASKS_PATH`]:
//!
//! | Method | Success | Failure |
//! |---|---|---|
//! | `GET` | `{tasks}` | 500 |
//! | `POST` | `{task}` | 400, 500 |
//! | `PUT` | `{task}` | 400, 404, 500 |
//! | `DELETE ?id=` | `{success: true}` | 400, 404, 500 |
//!
//! Every failure is answered with an [`ErrorBody`]. Malformed bodies and
//! query strings are mapped to the same shape instead of axum's plain-text
//! rejections.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tasktimer_proto::TaskId;
use tasktimer_proto::api::{
    CreateRequest, DeleteQuery, DeleteResponse, ErrorBody, HEALTH_PATH, ListResponse, TASKS_PATH,
    TaskResponse, UpdateRequest,
};

use crate::store::{StoreError, TaskStore};

/// Default maximum accepted request body in bytes (64 KB).
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared server state.
pub struct ServerState {
    /// The backing task store.
    pub store: TaskStore,
    max_body_size: usize,
}

impl ServerState {
    /// Creates server state around a store with the default body limit.
    #[must_use]
    pub const fn new(store: TaskStore) -> Self {
        Self {
            store,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Creates server state with a custom request body limit.
    #[must_use]
    pub const fn with_config(store: TaskStore, max_body_size: usize) -> Self {
        Self {
            store,
            max_body_size,
        }
    }
}

/// Which endpoint produced an error. Selects the message of storage
/// failures, which never leak internal paths to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    const fn storage_message(self) -> &'static str {
        match self {
            Self::List => "Erro ao buscar tarefas",
            Self::Create => "Erro ao criar tarefa",
            Self::Update => "Erro ao atualizar tarefa",
            Self::Delete => "Erro ao remover tarefa",
        }
    }
}

/// An HTTP error answered with an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Localized message placed in the body.
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn from_store(op: Operation, err: &StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => {
                tracing::debug!(task_id = %id, ?op, "task not found");
                Self {
                    status: StatusCode::NOT_FOUND,
                    message: "Tarefa não encontrada".to_string(),
                }
            }
            e if e.is_validation() => Self::bad_request(e.to_string()),
            e => {
                tracing::error!(error = %e, ?op, "task store failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: op.storage_message().to_string(),
                }
            }
        }
    }

    fn from_json_rejection(rejection: &JsonRejection) -> Self {
        let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            StatusCode::BAD_REQUEST
        };
        Self {
            status,
            message: format!("Corpo da requisição inválido: {}", rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Builds the application router.
pub fn router(state: Arc<ServerState>) -> axum::Router {
    let max_body_size = state.max_body_size;
    axum::Router::new()
        .route(
            TASKS_PATH,
            get(list_tasks)
                .post(create_task)
                .put(update_task)
                .delete(delete_task),
        )
        .route(HEALTH_PATH, get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(state)
}

/// `GET /api/tasks`
async fn list_tasks(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ListResponse>, ApiError> {
    let tasks = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::from_store(Operation::List, &e))?;
    Ok(Json(ListResponse { tasks }))
}

/// `POST /api/tasks`
async fn create_task(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(req) = payload.map_err(|r| ApiError::from_json_rejection(&r))?;
    let (Some(name), Some(category)) = (req.name, req.category) else {
        return Err(ApiError::from_store(
            Operation::Create,
            &StoreError::MissingFields,
        ));
    };

    let task = state
        .store
        .create(&name, category)
        .await
        .map_err(|e| ApiError::from_store(Operation::Create, &e))?;
    Ok(Json(TaskResponse { task }))
}

/// `PUT /api/tasks`
async fn update_task(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(req) = payload.map_err(|r| ApiError::from_json_rejection(&r))?;
    let id = req.id.ok_or_else(|| {
        ApiError::from_store(Operation::Update, &StoreError::MissingId)
    })?;

    let task = state
        .store
        .update(&id, &req.updates)
        .await
        .map_err(|e| ApiError::from_store(Operation::Update, &e))?;
    Ok(Json(TaskResponse { task }))
}

/// `DELETE /api/tasks?id=`
async fn delete_task(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Query(query) = query.map_err(|r| ApiError::bad_request(r.body_text()))?;
    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .map(TaskId::from_string)
        .ok_or_else(|| ApiError::from_store(Operation::Delete, &StoreError::MissingId))?;

    state
        .store
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_store(Operation::Delete, &e))?;
    Ok(Json(DeleteResponse { success: true }))
}

/// Starts the server on the given address with a store at `data_file`,
/// returning the bound address and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    data_file: impl Into<std::path::PathBuf>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let state = Arc::new(ServerState::new(TaskStore::new(data_file)));
    start_server_with_state(addr, state).await
}

/// Starts the server with a pre-configured [`ServerState`].
///
/// This is the entry point used by both `main.rs` and the integration tests.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}
