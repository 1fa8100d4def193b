//! In-process stand-in for the Firestore REST surface the client uses.
//!
//! Supports `documents:runQuery` (equality filters only), `documents:commit` (update writes)
//! and single-document `GET`. Documents are returned ordered by id.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const READ_TIME: &str = "2024-03-01T09:00:00.000000Z";

#[derive(Default)]
pub struct FakeState {
    /// collection -> id -> typed `fields` object
    pub documents: Mutex<BTreeMap<String, BTreeMap<String, Value>>>,
    pub query_bodies: Mutex<Vec<Value>>,
    pub commit_bodies: Mutex<Vec<Value>>,
    pub authorization: Mutex<Vec<Option<String>>>,
    pub fail_status: Mutex<Option<StatusCode>>,
}

impl FakeState {
    fn record_auth(&self, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorization.lock().push(auth);
    }

    fn failure(&self) -> Option<Response> {
        self.fail_status.lock().map(|status| {
            (
                status,
                Json(json!({ "error": { "code": status.as_u16(), "message": "injected" } })),
            )
                .into_response()
        })
    }
}

pub struct FakeFirestore {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeFirestore {
    /// `host:port`, as `FIRESTORE_EMULATOR_HOST` would carry it.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn fail_with(&self, status: Option<StatusCode>) {
        *self.state.fail_status.lock() = status;
    }

    pub fn document_ids(&self, collection: &str) -> Vec<String> {
        self.state
            .documents
            .lock()
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn fields(&self, collection: &str, id: &str) -> Option<Value> {
        self.state.documents.lock().get(collection)?.get(id).cloned()
    }
}

impl Drop for FakeFirestore {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_fake_firestore() -> std::io::Result<FakeFirestore> {
    let state = Arc::new(FakeState::default());
    let app = Router::new()
        .route(
            "/v1/projects/{project}/databases/{database}/documents:runQuery",
            post(run_query),
        )
        .route(
            "/v1/projects/{project}/databases/{database}/documents:commit",
            post(commit),
        )
        .route(
            "/v1/projects/{project}/databases/{database}/documents/{collection}/{id}",
            get(get_document),
        )
        .with_state(state.clone());

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    Ok(FakeFirestore {
        addr,
        state,
        shutdown_tx: Some(shutdown_tx),
    })
}

fn document_resource(project: &str, database: &str, collection: &str, id: &str, fields: &Value) -> Value {
    json!({
        "name": format!("projects/{project}/databases/{database}/documents/{collection}/{id}"),
        "fields": fields,
        "createTime": READ_TIME,
        "updateTime": READ_TIME,
    })
}

fn equality_filters(where_clause: Option<&Value>) -> Vec<(String, String)> {
    let Some(clause) = where_clause else {
        return Vec::new();
    };
    let filters: Vec<&Value> = match clause.get("compositeFilter") {
        Some(composite) => composite["filters"]
            .as_array()
            .map(|f| f.iter().collect())
            .unwrap_or_default(),
        None => vec![clause],
    };
    filters
        .into_iter()
        .filter_map(|f| {
            let filter = f.get("fieldFilter")?;
            Some((
                filter["field"]["fieldPath"].as_str()?.to_string(),
                filter["value"]["stringValue"].as_str()?.to_string(),
            ))
        })
        .collect()
}

async fn run_query(
    State(state): State<Arc<FakeState>>,
    Path((project, database)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth(&headers);
    state.query_bodies.lock().push(body.clone());
    if let Some(failure) = state.failure() {
        return failure;
    }

    let query = &body["structuredQuery"];
    let collection = query["from"][0]["collectionId"].as_str().unwrap_or_default();
    let filters = equality_filters(query.get("where"));
    let limit = query["limit"].as_u64().map_or(usize::MAX, |l| l as usize);

    let documents = state.documents.lock();
    let mut rows: Vec<Value> = documents
        .get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, fields)| {
                    filters
                        .iter()
                        .all(|(field, value)| fields[field]["stringValue"].as_str() == Some(value.as_str()))
                })
                .take(limit)
                .map(|(id, fields)| {
                    json!({
                        "document": document_resource(&project, &database, collection, id, fields),
                        "readTime": READ_TIME,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if rows.is_empty() {
        rows.push(json!({ "readTime": READ_TIME }));
    }
    Json(Value::Array(rows)).into_response()
}

async fn commit(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_auth(&headers);
    state.commit_bodies.lock().push(body.clone());
    if let Some(failure) = state.failure() {
        return failure;
    }

    let writes = body["writes"].as_array().cloned().unwrap_or_default();
    let mut documents = state.documents.lock();
    for write in &writes {
        let update = &write["update"];
        let name = update["name"].as_str().unwrap_or_default();
        let mut segments = name.rsplit('/');
        let (Some(id), Some(collection)) = (segments.next(), segments.next()) else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        documents
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), update["fields"].clone());
    }

    let results: Vec<Value> = writes
        .iter()
        .map(|_| json!({ "updateTime": READ_TIME }))
        .collect();
    Json(json!({ "writeResults": results, "commitTime": READ_TIME })).into_response()
}

async fn get_document(
    State(state): State<Arc<FakeState>>,
    Path((project, database, collection, id)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    state.record_auth(&headers);
    if let Some(failure) = state.failure() {
        return failure;
    }

    let documents = state.documents.lock();
    match documents.get(&collection).and_then(|docs| docs.get(&id)) {
        Some(fields) => {
            Json(document_resource(&project, &database, &collection, &id, fields)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": 404, "status": "NOT_FOUND" } })),
        )
            .into_response(),
    }
}
