use std::time::Duration;

use async_trait::async_trait;
use empathy_domain::{AnalysisRequest, AnalysisServicePort, AudioSourcePort, DomainError, RawAnalysis};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const PROCESS_PATH: &str = "/process";
const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

/// HTTP adapter for the analysis service: `POST /process`, audio `GET`, health probe.
#[derive(Debug, Clone)]
pub struct RestAnalysisClient {
    http: Client,
    base_url: String,
}

impl RestAnalysisClient {
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|err| {
                DomainError::transport(&base_url, &format!("failed to build http client: {err}"))
            })?;
        Ok(Self { http, base_url })
    }

    /// Returns the status string reported by `GET /api/health`.
    pub async fn check_health(&self) -> Result<String, DomainError> {
        let url = format!("{}{HEALTH_PATH}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(&err))?;
        if !status.is_success() {
            return Err(map_failure(&self.base_url, status, &body));
        }

        serde_json::from_slice::<HealthBody>(&body)
            .map(|health| health.status)
            .map_err(|err| DomainError::schema(&format!("health body is not recognised: {err}")))
    }

    fn transport_error(&self, err: &reqwest::Error) -> DomainError {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        DomainError::transport(&self.base_url, &reason)
    }
}

#[async_trait]
impl AnalysisServicePort for RestAnalysisClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, DomainError> {
        let url = format!("{}{PROCESS_PATH}", self.base_url);
        tracing::debug!(url = %url, text_len = request.text().len(), "posting analysis request");

        let response = self
            .http
            .post(&url)
            .json(&ProcessRequest {
                text: request.text(),
            })
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(&err))?;

        tracing::debug!(status = status.as_u16(), body_len = body.len(), "analysis response received");
        if !status.is_success() {
            return Err(map_failure(&self.base_url, status, &body));
        }

        serde_json::from_slice::<RawAnalysis>(&body).map_err(|err| {
            DomainError::schema(&format!("response body is not an analysis object: {err}"))
        })
    }
}

#[async_trait]
impl AudioSourcePort for RestAnalysisClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DomainError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(&err))?;
        if !status.is_success() {
            return Err(map_failure(&self.base_url, status, &body));
        }
        Ok(body.to_vec())
    }
}

/// A non-success body with an `error` field is a service answer; anything else is treated
/// as the service being unreachable.
fn map_failure(base_url: &str, status: StatusCode, body: &[u8]) -> DomainError {
    let reported = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.trim().is_empty());
    match reported {
        Some(message) => DomainError::service_rejected(&message),
        None => DomainError::transport(base_url, &format!("HTTP {status} without error body")),
    }
}
