use crate::bigquery::{ErrorEnvelope, QueryRequest, QueryResponse, TableSchema, rows_to_records};
use crate::credentials::{CredentialError, ServiceAccountKey};
use crate::rows::{FixtureRow, RawTables, ScorerRow, StandingRow};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const BIGQUERY_V2: &str = "https://bigquery.googleapis.com/bigquery/v2";
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

pub const DEFAULT_PROJECT: &str = "apds-fc-salzburg-plygnd";
pub const DEFAULT_DATASET: &str = "90_mart_sandbox";

pub const FIXTURES_TABLE: &str = "mrt_next_gen_all_fixtures";
pub const STANDINGS_TABLE: &str = "mrt_next_gen_group_standings";
pub const SCORERS_TABLE: &str = "mrt_next_gen_top_goalscorers";

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api { url: String, status: u16, message: String },
    Parsing(reqwest::Error, String),
    NotFound(String),
    Credentials(CredentialError),
    Token(String),
    Decode { table: String, reason: String },
    Incomplete(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api { url, status, message } => {
                write!(f, "API error for {url}: {status} {message}")
            }
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Credentials(e) => write!(f, "{e}"),
            ApiError::Token(msg) => write!(f, "Token error: {msg}"),
            ApiError::Decode { table, reason } => write!(f, "Could not decode {table}: {reason}"),
            ApiError::Incomplete(job) => {
                write!(f, "Query job {job} did not complete within the request timeout")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        ApiError::Credentials(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseTarget {
    pub project: String,
    pub dataset: String,
}

impl Default for WarehouseTarget {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

impl WarehouseTarget {
    pub fn select_all(&self, table: &str) -> String {
        format!("SELECT * FROM `{}.{}.{table}`", self.project, self.dataset)
    }
}

#[derive(Debug, Clone)]
enum Auth {
    ServiceAccount(ServiceAccountKey),
    Static(String),
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Read-only BigQuery client for the three tournament tables.
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    client: Client,
    timeout: Duration,
    base_url: String,
    target: WarehouseTarget,
    auth: Auth,
}

impl WarehouseClient {
    pub fn new(target: WarehouseTarget, key: ServiceAccountKey) -> Self {
        Self::with_auth(target, Auth::ServiceAccount(key))
    }

    /// Skips the token exchange and sends `token` as-is.
    pub fn with_static_token(target: WarehouseTarget, token: impl Into<String>) -> Self {
        Self::with_auth(target, Auth::Static(token.into()))
    }

    fn with_auth(target: WarehouseTarget, auth: Auth) -> Self {
        Self {
            client: Client::builder()
                .user_agent("trophyboard/0.1 (tournament board)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(30),
            base_url: BIGQUERY_V2.to_string(),
            target,
            auth,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch fixtures, standings and scorers. Any failure aborts the whole load.
    pub async fn fetch_tables(&self) -> ApiResult<RawTables> {
        let token = self.access_token().await?;
        let fixtures: Vec<FixtureRow> = self.select_all(&token, FIXTURES_TABLE).await?;
        let standings: Vec<StandingRow> = self.select_all(&token, STANDINGS_TABLE).await?;
        let scorers: Vec<ScorerRow> = self.select_all(&token, SCORERS_TABLE).await?;
        info!(
            "warehouse load: {} fixtures, {} standings, {} scorers",
            fixtures.len(),
            standings.len(),
            scorers.len()
        );
        Ok(RawTables { fixtures, standings, scorers })
    }

    async fn select_all<T: DeserializeOwned>(&self, token: &str, table: &str) -> ApiResult<Vec<T>> {
        let sql = self.target.select_all(table);
        self.query(token, &sql)
            .await?
            .decode(table)
    }

    /// Run a query and collect every result page.
    pub async fn query(&self, token: &str, sql: &str) -> ApiResult<QueryPages> {
        let url = format!("{}/projects/{}/queries", self.base_url, self.target.project);
        debug!("query: {sql}");
        let request = self.client.post(&url).json(&QueryRequest::standard(sql));
        let first: QueryResponse = self.send(request, token, &url).await?;

        let job = first.job_reference.clone().unwrap_or_default();
        if !first.job_complete {
            return Err(ApiError::Incomplete(job.job_id));
        }

        let schema = first.schema.clone().unwrap_or_default();
        let mut rows = first.rows;
        let mut page_token = first.page_token;

        while let Some(next) = page_token.take() {
            let url = format!(
                "{}/projects/{}/queries/{}",
                self.base_url, job.project_id, job.job_id
            );
            let mut params = vec![("pageToken", next)];
            if let Some(location) = &job.location {
                params.push(("location", location.clone()));
            }
            let request = self.client.get(&url).query(&params);
            let page: QueryResponse = self.send(request, token, &url).await?;
            if !page.job_complete {
                return Err(ApiError::Incomplete(job.job_id.clone()));
            }
            debug!("page of {} rows from job {}", page.rows.len(), job.job_id);
            rows.extend(page.rows);
            page_token = page.page_token;
        }

        Ok(QueryPages { schema, rows })
    }

    /// Exchange a signed JWT assertion for an OAuth access token.
    pub async fn access_token(&self) -> ApiResult<String> {
        let key = match &self.auth {
            Auth::Static(token) => return Ok(token.clone()),
            Auth::ServiceAccount(key) => key,
        };

        let assertion = sign_assertion(key, Utc::now().timestamp())?;
        let url = key.token_uri.clone();
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Token(format!("{url} returned {status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;
        info!("access token issued for {}", key.client_email);
        Ok(token.access_token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, token: &str, url: &str) -> ApiResult<T> {
        let response = request
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|env| env.error)
            .map(|e| e.message)
            .unwrap_or(body);
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("{url}: {message}")));
        }
        Err(ApiError::Api {
            url: url.to_owned(),
            status: status.as_u16(),
            message,
        })
    }
}

/// All rows of a finished query.
#[derive(Debug, Default)]
pub struct QueryPages {
    pub schema: TableSchema,
    pub rows: Vec<crate::bigquery::TableRow>,
}

impl QueryPages {
    pub fn decode<T: DeserializeOwned>(self, table: &str) -> ApiResult<Vec<T>> {
        rows_to_records(&self.schema, self.rows).map_err(|reason| ApiError::Decode {
            table: table.to_string(),
            reason,
        })
    }
}

fn sign_assertion(key: &ServiceAccountKey, now: i64) -> ApiResult<String> {
    let claims = Claims {
        iss: &key.client_email,
        scope: BIGQUERY_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| ApiError::Token(format!("private key is not a valid RSA PEM: {e}")))?;
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| ApiError::Token(format!("could not sign assertion: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn target() -> WarehouseTarget {
        WarehouseTarget {
            project: "demo".into(),
            dataset: "mart".into(),
        }
    }

    fn standings_page(rows: serde_json::Value, page_token: Option<&str>) -> String {
        let mut body = json!({
            "schema": { "fields": [
                { "name": "team_id", "type": "INTEGER" },
                { "name": "team_name", "type": "STRING" },
                { "name": "group_name", "type": "STRING" },
                { "name": "group_position", "type": "INTEGER" }
            ]},
            "jobReference": { "projectId": "demo", "jobId": "job_42", "location": "EU" },
            "rows": rows,
            "jobComplete": true
        });
        if let Some(token) = page_token {
            body["pageToken"] = json!(token);
        }
        body.to_string()
    }

    #[test]
    fn select_all_qualifies_table() {
        assert_eq!(
            WarehouseTarget::default().select_all(FIXTURES_TABLE),
            "SELECT * FROM `apds-fc-salzburg-plygnd.90_mart_sandbox.mrt_next_gen_all_fixtures`"
        );
    }

    #[test]
    fn malformed_private_key_is_a_token_error() {
        let key: ServiceAccountKey = serde_json::from_value(json!({
            "client_email": "board@demo.iam.gserviceaccount.com",
            "private_key": "not a pem"
        }))
        .unwrap();
        assert!(matches!(sign_assertion(&key, 0), Err(ApiError::Token(_))));
    }

    #[tokio::test]
    async fn query_follows_page_tokens() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/projects/demo/queries")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({ "useLegacySql": false })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(standings_page(
                json!([{ "f": [{ "v": "7" }, { "v": "Salzburg" }, { "v": "A" }, { "v": "1" }] }]),
                Some("page-2"),
            ))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/projects/demo/queries/job_42")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pageToken".into(), "page-2".into()),
                Matcher::UrlEncoded("location".into(), "EU".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(standings_page(
                json!([{ "f": [{ "v": "9" }, { "v": "Brøndby IF" }, { "v": "A" }, { "v": "2" }] }]),
                None,
            ))
            .create_async()
            .await;

        let client = WarehouseClient::with_static_token(target(), "secret").with_base_url(server.url());
        let rows: Vec<StandingRow> = client
            .query("secret", "SELECT 1")
            .await
            .unwrap()
            .decode(STANDINGS_TABLE)
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].team_id, "9");
    }

    #[tokio::test]
    async fn incomplete_job_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/projects/demo/queries")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "jobReference": { "projectId": "demo", "jobId": "slow" }, "jobComplete": false }).to_string())
            .create_async()
            .await;

        let client = WarehouseClient::with_static_token(target(), "t").with_base_url(server.url());
        let err = client.query("t", "SELECT 1").await.unwrap_err();
        assert!(matches!(err, ApiError::Incomplete(job) if job == "slow"));
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/projects/demo/queries")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error": { "code": 403, "message": "Access Denied" } }).to_string())
            .create_async()
            .await;

        let client = WarehouseClient::with_static_token(target(), "t").with_base_url(server.url());
        match client.query("t", "SELECT 1").await {
            Err(ApiError::Api { status, message, .. }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "Access Denied");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_table_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/projects/demo/queries")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let client = WarehouseClient::with_static_token(target(), "t").with_base_url(server.url());
        assert!(matches!(client.query("t", "SELECT 1").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_tables_decodes_all_three() {
        let mut server = mockito::Server::new_async().await;
        let fixtures = json!({
            "schema": { "fields": [
                { "name": "round_name" }, { "name": "group_name" }, { "name": "match_id" },
                { "name": "home_team_id" }, { "name": "home_team_name" },
                { "name": "away_team_id" }, { "name": "away_team_name" },
                { "name": "home_team_goals" }, { "name": "away_team_goals" },
                { "name": "home_team_penalty_goals" }, { "name": "away_team_penalty_goals" },
                { "name": "pitch" }, { "name": "match_time" }, { "name": "match_status" }
            ]},
            "rows": [{ "f": [
                { "v": "group_stage" }, { "v": "A" }, { "v": "1" },
                { "v": "7" }, { "v": "Salzburg" }, { "v": "9" }, { "v": "Brøndby IF" },
                { "v": "2" }, { "v": "0" }, { "v": null }, { "v": null },
                { "v": "1" }, { "v": "09:00" }, { "v": "completed" }
            ]}],
            "jobComplete": true
        });
        let scorers = json!({
            "schema": { "fields": [
                { "name": "place" }, { "name": "player_name" }, { "name": "team_id" }, { "name": "total_goals" }
            ]},
            "rows": [{ "f": [{ "v": "1" }, { "v": "A. Striker" }, { "v": "7" }, { "v": "5" }] }],
            "jobComplete": true
        });

        let mocks = [
            (FIXTURES_TABLE, fixtures.to_string()),
            (STANDINGS_TABLE, standings_page(json!([]), None)),
            (SCORERS_TABLE, scorers.to_string()),
        ];
        let mut handles = Vec::new();
        for (table, body) in mocks {
            let mock = server
                .mock("POST", "/projects/demo/queries")
                .match_body(Matcher::Regex(format!("demo\\.mart\\.{table}")))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body)
                .create_async()
                .await;
            handles.push(mock);
        }

        let client = WarehouseClient::with_static_token(target(), "t").with_base_url(server.url());
        let tables = client.fetch_tables().await.unwrap();
        assert_eq!(tables.fixtures.len(), 1);
        assert_eq!(tables.fixtures[0].home_team_goals, Some(2));
        assert!(tables.standings.is_empty());
        assert_eq!(tables.scorers[0].player_name, "A. Striker");
        for mock in handles {
            mock.assert_async().await;
        }
    }
}
