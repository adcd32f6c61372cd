/// BigQuery REST wire types (`jobs.query` / `jobs.getQueryResults`).
///
/// Only the fields the board reads are modelled. Rows come back positionally
/// as `{"f": [{"v": ...}]}` and are matched to column names via the schema.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub use_legacy_sql: bool,
    pub timeout_ms: u64,
}

impl QueryRequest {
    pub fn standard(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            use_legacy_sql: false,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub schema: Option<TableSchema>,
    pub job_reference: Option<JobReference>,
    pub page_token: Option<String>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub job_complete: bool,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSchema {
    pub name: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    pub location: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub v: Value,
}

/// Error body returned by Google APIs on failure.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Turns positional rows into records keyed by column name and decodes them.
pub fn rows_to_records<T: DeserializeOwned>(
    schema: &TableSchema,
    rows: Vec<TableRow>,
) -> Result<Vec<T>, String> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            if row.f.len() != schema.fields.len() {
                return Err(format!(
                    "row {index} has {} cells but the schema has {} columns",
                    row.f.len(),
                    schema.fields.len()
                ));
            }
            let record: Map<String, Value> = schema
                .fields
                .iter()
                .zip(row.f)
                .map(|(field, cell)| (field.name.clone(), cell.v))
                .collect();
            serde_json::from_value(Value::Object(record)).map_err(|e| format!("row {index}: {e}"))
        })
        .collect()
}
