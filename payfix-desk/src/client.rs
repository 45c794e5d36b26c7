//! HTTP client for the payfix-api service
//!
//! One method per route. Error envelopes (`{"ok": false, ...}`) come back as
//! `ClientError::Api` carrying the HTTP status and every reported message.

use payfix_common::api::{
    AuditResponse, DashboardStats, ErrorBody, ExceptionsResponse, FixRequest, FixResponse,
    LoginRequest, LoginResponse, MessageResponse, OperatorStat, OperatorStatsResponse,
    PingResponse, ProcessedResponse, SeedResponse, SignupRequest,
};
use payfix_common::{AuditEntry, ExceptionRecord, ProcessedRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Service base URL used when none is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("payfix-desk/", env!("CARGO_PKG_VERSION"));

/// payfix-api client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================
    // Accounts
    // ========================================

    pub async fn ping(&self) -> ClientResult<String> {
        let response: PingResponse = self.get("ping", &[]).await?;
        Ok(response.message)
    }

    pub async fn signup(&self, name: &str, username: &str, password: &str) -> ClientResult<String> {
        let request = SignupRequest {
            name: Some(name.to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        let response: MessageResponse = self.post("signup", &request).await?;
        Ok(response.message)
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        self.post("login", &request).await
    }

    // ========================================
    // Queue
    // ========================================

    pub async fn exceptions(&self) -> ClientResult<Vec<ExceptionRecord>> {
        let response: ExceptionsResponse = self.get("exceptions", &[]).await?;
        Ok(response.exceptions)
    }

    /// Look up one queued exception by id
    pub async fn exception(&self, id: &str) -> ClientResult<Option<ExceptionRecord>> {
        Ok(self.exceptions().await?.into_iter().find(|r| r.id == id))
    }

    pub async fn processed(&self) -> ClientResult<Vec<ProcessedRecord>> {
        let response: ProcessedResponse = self.get("processed", &[]).await?;
        Ok(response.processed)
    }

    /// Submit an edit; returns the processed record id
    ///
    /// A validation failure is `ClientError::Api` with status 400 and one
    /// message per failed rule.
    pub async fn fix(
        &self,
        tx_id: &str,
        operator: Option<&str>,
        tx: Map<String, Value>,
    ) -> ClientResult<String> {
        let request = FixRequest {
            tx_id: Some(tx_id.to_string()),
            operator: operator.map(str::to_string),
            tx: Some(tx),
        };
        let response: FixResponse = self.post("fix", &request).await?;
        Ok(response.processed_id)
    }

    pub async fn seed(&self) -> ClientResult<usize> {
        let response: SeedResponse = self.post("seed", &Value::Null).await?;
        Ok(response.inserted_count)
    }

    pub async fn audit(&self, tx_id: Option<&str>) -> ClientResult<Vec<AuditEntry>> {
        let query: Vec<(&str, String)> = tx_id
            .map(|id| vec![("tx_id", id.to_string())])
            .unwrap_or_default();
        let response: AuditResponse = self.get("audit", &query).await?;
        Ok(response.audit)
    }

    // ========================================
    // Dashboard
    // ========================================

    pub async fn dashboard(&self, days: Option<i64>) -> ClientResult<DashboardStats> {
        let query: Vec<(&str, String)> = days
            .map(|d| vec![("days", d.to_string())])
            .unwrap_or_default();
        self.get("dashboard", &query).await
    }

    pub async fn operator_stats(&self) -> ClientResult<Vec<OperatorStat>> {
        let response: OperatorStatsResponse = self.get("operator_stats", &[]).await?;
        Ok(response.stats)
    }

    // ========================================
    // Transport
    // ========================================

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ClientResult<T> {
        tracing::debug!("GET {}", self.url(path));
        let request = self.http_client.get(self.url(path)).query(query);
        let response = self.authorize(request).send().await?;
        decode_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ClientResult<T> {
        tracing::debug!("POST {}", self.url(path));
        let request = self.http_client.post(self.url(path)).json(body);
        let response = self.authorize(request).send().await?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    Err(ClientError::Api {
        status: status.as_u16(),
        messages: error_messages(status, &bytes),
    })
}

/// Messages from an error envelope, falling back to the raw body or the
/// status reason
fn error_messages(status: reqwest::StatusCode, body: &[u8]) -> Vec<String> {
    if let Ok(envelope) = serde_json::from_slice::<ErrorBody>(body) {
        let messages = envelope.messages();
        if !messages.is_empty() {
            return messages;
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return vec![text];
    }

    vec![status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()]
}
