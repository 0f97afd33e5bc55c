//! Backend HTTP Client
//!
//! Thin wrapper over `reqwest` that attaches the project API key and an
//! optional bearer token, and turns non-2xx answers into [`HttpError::Status`]
//! carrying the backend's own error code and message.

use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;

pub use reqwest::Method;

/// HTTP result type alias
pub type HttpResult<T> = Result<T, HttpError>;

/// Error from a backend call
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Request never got an answer (DNS, connect, timeout, reset)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Answer body did not match the expected shape
    #[error("Failed to decode backend response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl HttpError {
    /// HTTP status if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code reported by the backend
    pub fn code(&self) -> Option<&str> {
        match self {
            HttpError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Transport(e) if e.is_timeout())
    }

    /// Build a status error from a raw error body
    ///
    /// The auth endpoints and the REST endpoints use different field names, so
    /// every known spelling is tried.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();

        let (code, message) = match parsed {
            Some(b) => {
                let code = b
                    .error_code
                    .or_else(|| b.code.and_then(value_to_code))
                    .or(b.error.clone());
                let message = b
                    .error_description
                    .or(b.msg)
                    .or(b.message)
                    .or(b.error)
                    .unwrap_or_else(|| "Unknown error".to_string());
                (code, message)
            }
            None => (None, String::from_utf8_lossy(body).trim().to_string()),
        };

        HttpError::Status {
            status,
            code,
            message,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    error_code: Option<String>,
    code: Option<serde_json::Value>,
    msg: Option<String>,
    message: Option<String>,
}

fn value_to_code(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Client for the hosted backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> HttpResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(HttpError::Build)?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    /// Absolute URL for a backend path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.anon_key);
        self.http
            .request(method, self.endpoint(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// GET returning JSON
    pub async fn get_json<T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        query: &[(&str, &str)],
    ) -> HttpResult<T>
    where
        T: DeserializeOwned,
    {
        let req = self.request(Method::GET, path, bearer).query(query);
        let resp = self.execute(Method::GET, path, req).await?;
        decode(resp).await
    }

    /// Request with a JSON body, returning JSON
    ///
    /// `prefer` is forwarded as the `Prefer` header (e.g. `return=representation`
    /// for REST writes that should echo the changed rows).
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        query: &[(&str, &str)],
        body: &B,
        prefer: Option<&str>,
    ) -> HttpResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut req = self
            .request(method.clone(), path, bearer)
            .query(query)
            .json(body);
        if let Some(prefer) = prefer {
            req = req.header("Prefer", prefer);
        }
        let resp = self.execute(method, path, req).await?;
        decode(resp).await
    }

    /// Request whose answer body is ignored
    pub async fn send_empty(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
    ) -> HttpResult<()> {
        let req = self.request(method.clone(), path, bearer);
        let resp = self.execute(method, path, req).await?;
        check_status(resp).await.map(|_| ())
    }

    async fn execute(&self, method: Method, path: &str, req: RequestBuilder) -> HttpResult<Response> {
        let resp = req.send().await.map_err(|e| {
            tracing::debug!(method = %method, path = %path, error = %e, "Backend request failed");
            HttpError::Transport(e)
        })?;

        tracing::debug!(
            method = %method,
            path = %path,
            status = resp.status().as_u16(),
            "Backend request completed"
        );

        Ok(resp)
    }
}

async fn check_status(resp: Response) -> HttpResult<Vec<u8>> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(HttpError::Transport)?;

    if !status.is_success() {
        return Err(HttpError::from_body(status.as_u16(), &body));
    }

    Ok(body.to_vec())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> HttpResult<T> {
    let body = check_status(resp).await?;
    serde_json::from_slice(&body).map_err(HttpError::Decode)
}
