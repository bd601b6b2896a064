use crate::model::OrderNumber;
use crate::oracle::{AccrualOracle, AccrualResponseBody, OracleError, OracleResponse};
use crate::retry::MAX_RETRY_AFTER;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Quiet period applied when a 429 carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// [`AccrualOracle`] backed by the oracle's HTTP API.
///
/// The underlying `reqwest::Client` holds no per-request state and is shared by
/// every clone of this client.
#[derive(Clone)]
pub struct HttpAccrualClient {
    base_url: String,
    client: Arc<Client>,
}

impl HttpAccrualClient {
    /// Builds a client for the oracle at `address`.
    ///
    /// `address` may omit the scheme (`localhost:8080`), in which case `http://` is assumed.
    pub fn new(address: &str, request_timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| OracleError::Initialization(e.to_string()))?;
        Ok(Self {
            base_url: normalize_base_url(address)?,
            client: Arc::new(client),
        })
    }

    pub fn url(&self, order: &OrderNumber) -> String {
        format!("{}/api/orders/{order}", self.base_url)
    }
}

fn normalize_base_url(address: &str) -> Result<String, OracleError> {
    let address = address.trim().trim_end_matches('/');
    if address.is_empty() {
        return Err(OracleError::Initialization(
            "accrual system address is empty".to_string(),
        ));
    }
    if address.contains("://") {
        Ok(address.to_string())
    } else {
        Ok(format!("http://{address}"))
    }
}

/// Reads `Retry-After` as a number of seconds, capped at [`MAX_RETRY_AFTER`].
fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

#[async_trait]
impl AccrualOracle for HttpAccrualClient {
    #[instrument(skip(self, order), fields(order = %order))]
    async fn fetch_status(&self, order: &OrderNumber) -> Result<OracleResponse, OracleError> {
        let url = self.url(order);
        debug!(%url, "Requesting accrual status");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| OracleError::Transport(e.to_string()))?;
                let body: AccrualResponseBody = serde_json::from_str(&body)
                    .map_err(|e| OracleError::MalformedBody(e.to_string()))?;
                let resolution = body.into_resolution(order)?;
                debug!(status = ?resolution.status, "Accrual status received");
                Ok(OracleResponse::Resolved(resolution))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = retry_after(response.headers());
                debug!(retry_after_secs = retry_after.as_secs(), "Rate limited by oracle");
                Ok(OracleResponse::RateLimited { retry_after })
            }
            other => Err(OracleError::UnexpectedStatus(other.as_u16())),
        }
    }
}
