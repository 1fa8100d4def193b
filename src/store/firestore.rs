//! Firestore REST (v1) client and value codec.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use super::client::DocumentStore;
use super::error::{StoreError, StoreResult};
use super::model::{Document, FieldValue, Query, WriteBatch};
use crate::config::Config;
use crate::constants::MAX_BATCH_WRITES;

/// Production REST endpoint.
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Bearer token the emulator accepts for admin access.
const EMULATOR_TOKEN: &str = "owner";

#[derive(Clone)]
/// Firestore REST client.
pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: Url,
    project_id: String,
    database: String,
    token: Option<String>,
}

impl FirestoreClient {
    /// Creates a client for the production endpoint.
    pub fn new(project_id: &str, database: &str) -> StoreResult<Self> {
        Self::with_base_url(FIRESTORE_BASE_URL, project_id, database)
    }

    /// Creates a client for a local emulator (`host:port`).
    pub fn emulator(host: &str, project_id: &str, database: &str) -> StoreResult<Self> {
        let base = format!("http://{}/v1", host.trim_end_matches('/'));
        Ok(Self::with_base_url(&base, project_id, database)?.with_token(EMULATOR_TOKEN))
    }

    /// Creates a client against an arbitrary base URL.
    pub fn with_base_url(base_url: &str, project_id: &str, database: &str) -> StoreResult<Self> {
        if project_id.trim().is_empty() {
            return Err(StoreError::MissingProject);
        }

        let base_url = Url::parse(base_url).map_err(|e| StoreError::ConnectionFailed {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::ConnectionFailed {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            project_id: project_id.to_string(),
            database: database.to_string(),
            token: None,
        })
    }

    /// Builds a client from service configuration (emulator wins when configured).
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let project_id = config
            .project_id
            .as_deref()
            .ok_or(StoreError::MissingProject)?;

        match config.emulator_host.as_deref() {
            Some(host) => Self::emulator(host, project_id, &config.database),
            None => {
                let client = Self::new(project_id, &config.database)?;
                Ok(match config.access_token.as_deref() {
                    Some(token) => client.with_token(token),
                    None => client,
                })
            }
        }
    }

    /// Sets the bearer token sent with every request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `projects/{project}/databases/{database}/documents`
    pub fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    /// Full resource name of a document.
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_path(), collection, id)
    }

    fn url(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| StoreError::ConnectionFailed {
                url: self.base_url.to_string(),
                message: "base URL cannot carry a path".to_string(),
            })?;
            path.pop_if_empty();
            path.extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                self.database.as_str(),
            ]);
            path.extend(segments);
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json(&self, url: Url, body: &Value) -> StoreResult<reqwest::Response> {
        let response = self
            .authorize(self.http.post(url.clone()).json(body))
            .send()
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        check_status(url, response).await
    }
}

async fn check_status(url: Url, response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::RequestFailed {
        url: url.to_string(),
        status: status.as_u16(),
        message,
    })
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl DocumentStore for FirestoreClient {
    #[instrument(skip(self), fields(collection = %query.collection))]
    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        let url = self.url(&["documents:runQuery"])?;
        let body = structured_query(query);

        debug!(query = %query, "running structured query");
        let response = self
            .send_json(url, &body)
            .await
            .map_err(|e| StoreError::QueryFailed {
                collection: query.collection.clone(),
                message: e.to_string(),
            })?;

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        decode_query_rows(&rows)
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let url = self.url(&["documents", collection, id])?;

        let response = self
            .authorize(self.http.get(url.clone()))
            .send()
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(url, response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        decode_document(&body).map(Some)
    }

    #[instrument(skip(self, batch), fields(writes = batch.len()))]
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if batch.len() > MAX_BATCH_WRITES {
            return Err(StoreError::BatchTooLarge {
                size: batch.len(),
                max: MAX_BATCH_WRITES,
            });
        }

        let writes = batch.len();
        let body = commit_body(self, &batch);
        let url = self.url(&["documents:commit"])?;

        self.send_json(url, &body)
            .await
            .map_err(|e| StoreError::CommitFailed {
                writes,
                message: e.to_string(),
            })?;

        debug!(writes, "batch committed");
        Ok(())
    }
}

/// Builds the `runQuery` request body for an equality query.
pub fn structured_query(query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": query.collection }]),
    );

    let mut filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": f.field },
                    "op": "EQUAL",
                    "value": { "stringValue": f.value },
                }
            })
        })
        .collect();

    match filters.len() {
        0 => {}
        1 => {
            structured.insert("where".to_string(), filters.remove(0));
        }
        _ => {
            structured.insert(
                "where".to_string(),
                json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
            );
        }
    }

    if let Some(limit) = query.limit {
        structured.insert("limit".to_string(), json!(limit));
    }

    json!({ "structuredQuery": Value::Object(structured) })
}

fn commit_body(client: &FirestoreClient, batch: &WriteBatch) -> Value {
    let writes: Vec<Value> = batch
        .writes()
        .iter()
        .map(|w| {
            json!({
                "update": {
                    "name": client.document_name(&w.collection, &w.document.id),
                    "fields": encode_fields(&w.document.fields),
                }
            })
        })
        .collect();
    json!({ "writes": writes })
}

/// Encodes a field map into Firestore's typed JSON.
pub fn encode_fields(fields: &BTreeMap<String, FieldValue>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
        FieldValue::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn decode_value(value: &Value) -> StoreResult<FieldValue> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::Decode(format!("expected typed value object, got {value}")))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty typed value object".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Bool)
            .ok_or_else(|| StoreError::Decode(format!("invalid booleanValue {inner}"))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(FieldValue::Integer)
                .ok_or_else(|| StoreError::Decode(format!("invalid integerValue {inner}")))
        }
        "doubleValue" => {
            let parsed = match inner {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .map(FieldValue::Double)
                .ok_or_else(|| StoreError::Decode(format!("invalid doubleValue {inner}")))
        }
        "stringValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .ok_or_else(|| StoreError::Decode(format!("invalid {kind} {inner}"))),
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc)))
            .ok_or_else(|| StoreError::Decode(format!("invalid timestampValue {inner}"))),
        "arrayValue" => {
            let values = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values
                    .iter()
                    .map(decode_value)
                    .collect::<StoreResult<Vec<_>>>()?,
                None => Vec::new(),
            };
            Ok(FieldValue::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(fields) => decode_fields(fields)?,
                None => BTreeMap::new(),
            };
            Ok(FieldValue::Map(fields))
        }
        "geoPointValue" => {
            let mut point = BTreeMap::new();
            for axis in ["latitude", "longitude"] {
                let v = inner.get(axis).and_then(Value::as_f64).unwrap_or_default();
                point.insert(axis.to_string(), FieldValue::Double(v));
            }
            Ok(FieldValue::Map(point))
        }
        other => Err(StoreError::Decode(format!("unsupported value kind '{other}'"))),
    }
}

pub fn decode_fields(fields: &Value) -> StoreResult<BTreeMap<String, FieldValue>> {
    let obj = fields
        .as_object()
        .ok_or_else(|| StoreError::Decode("fields is not an object".to_string()))?;
    obj.iter()
        .map(|(k, v)| decode_value(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Decodes a REST document resource; the id is the last segment of its name.
pub fn decode_document(value: &Value) -> StoreResult<Document> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("document has no name".to_string()))?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();

    let fields = match value.get("fields") {
        Some(fields) => decode_fields(fields)?,
        None => BTreeMap::new(),
    };

    Ok(Document { id, fields })
}

/// `runQuery` streams rows; rows without a `document` only carry read metadata.
pub fn decode_query_rows(rows: &[Value]) -> StoreResult<Vec<Document>> {
    rows.iter()
        .filter_map(|row| row.get("document"))
        .map(decode_document)
        .collect()
}
