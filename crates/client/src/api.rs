//! Uniform request dispatch against the job board backend.
//!
//! Every request carries the current bearer token when one exists. A 401
//! response clears the session that sent the request here, once, instead of
//! in every caller.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use jobboard_auth::Capability;

use crate::config::ClientConfig;
use crate::error::{backend_message, ApiError, ApiResult};
use crate::session::SessionStore;

/// Backend message for a duplicate application.
const ALREADY_APPLIED: &str = "already applied";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            config: config.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Refuse locally when the caller's role lacks `capability`.
    pub fn require(&self, capability: Capability) -> ApiResult<()> {
        if self.session.capabilities().allows(capability) {
            Ok(())
        } else {
            debug!(%capability, "refused before sending");
            Err(ApiError::Forbidden(capability))
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.config.endpoint(path))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let resp = self.dispatch(self.request(Method::GET, path)).await?;
        decode(resp).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.dispatch(self.request(method, path).json(body)).await?;
        decode(resp).await
    }

    /// Send and discard whatever body the backend returns.
    pub(crate) async fn send_unit(&self, request: RequestBuilder) -> ApiResult<()> {
        self.dispatch(request).await.map(|_| ())
    }

    pub(crate) async fn dispatch(&self, request: RequestBuilder) -> ApiResult<Response> {
        let sent = self.session.current_token();
        let request = match &sent {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let url = resp.url().path().to_string();
        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = &sent {
                self.session.invalidate_token(token);
            }
            return Err(ApiError::Unauthorized);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = backend_message(status, &body);
        if message.trim().eq_ignore_ascii_case(ALREADY_APPLIED) {
            return Err(ApiError::AlreadyApplied);
        }

        warn!(path = %url, status = status.as_u16(), %message, "request failed");
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
