use gloo::net::http::{Request, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use sos_core::SubmissionError;
use sos_protocol::{
    ErrorBody, HiddenMessages, MyRank, PuzzleImage, RankEntry, RecordRequest, RecordResponse,
};

use crate::auth::TokenStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request failed with status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds the error for a non-success reply from its status and raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.detail);
        Self::Status { status, detail }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<gloo::net::Error> for ApiError {
    fn from(err: gloo::net::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status {
                status: 400,
                detail,
            } => Self::Rejected {
                detail: detail.unwrap_or_default(),
            },
            ApiError::Status { status: 401, .. } => Self::Unauthorized,
            ApiError::Status { status, .. } => Self::Server { status },
            ApiError::Network(msg) => Self::Network(msg),
            ApiError::Decode(msg) => Self::Decode(msg),
        }
    }
}

/// Client of the ranking backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: String,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            tokens: TokenStore,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.get() {
            Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        let response = self.authorize(Request::get(&url)).send().await?;
        self.read(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        log::debug!("POST {}", url);
        let body = serde_json::to_string(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        let response = self
            .authorize(Request::post(&url))
            .header("Content-Type", "application/json")
            .body(body)?
            .send()
            .await?;
        self.read(response).await
    }

    async fn read<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        if (200..300).contains(&status) {
            return serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()));
        }
        if status == 401 {
            log::info!("Access token rejected, signing out");
            self.tokens.clear();
        }
        Err(ApiError::from_status(status, &text))
    }

    /// Sends a clear time. A reply with `success: false` counts as a failure.
    pub async fn submit_record(&self, clear_time_ms: u32) -> Result<u32, SubmissionError> {
        let response: RecordResponse = self
            .post("/games/record", &RecordRequest { clear_time_ms })
            .await?;
        if response.success {
            Ok(response.rank)
        } else {
            Err(SubmissionError::NotRecorded)
        }
    }

    pub async fn standings(&self, limit: u32) -> Result<Vec<RankEntry>, ApiError> {
        self.get(&format!("/ranks?limit={limit}")).await
    }

    pub async fn my_rank(&self) -> Result<MyRank, ApiError> {
        self.get("/ranks/my").await
    }

    pub async fn hidden_messages(&self) -> Result<HiddenMessages, ApiError> {
        self.get("/games/hidden-message").await
    }

    pub async fn puzzle_image(&self) -> Result<PuzzleImage, ApiError> {
        self.get("/games/puzzle-image").await
    }
}
