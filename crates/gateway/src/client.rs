//! HTTP gateway client: the single choke point for outbound calls.
//!
//! Every request gets the bearer token of its slot, a normalized path and the
//! fixed timeout. Every response is reduced to a payload or a
//! [`GatewayError`]; 401 tears the session down and 403 is announced, both via
//! [`SessionSignal`] so navigation stays outside the transport.

use std::borrow::Cow;
use std::sync::Arc;

use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::Form;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use campuscard_core::envelope::{FORBIDDEN, UNAUTHENTICATED, body_message};
use campuscard_core::{Classified, GatewayError, GatewayResult, SessionContext, classify};

use crate::config::GatewayConfig;
use crate::observer::SessionSignal;
use crate::path::PathNormalizer;
use crate::request::{ApiRequest, RequestBody};

const SIGNAL_CAPACITY: usize = 64;

/// Cheap to clone; clones share the connection pool, session and signal channel.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: reqwest::Client,
    config: GatewayConfig,
    normalizer: PathNormalizer,
    session: Arc<SessionContext>,
    signals: broadcast::Sender<SessionSignal>,
}

impl GatewayClient {
    /// Build a client; fails only if the HTTP stack cannot be initialized.
    pub fn new(config: GatewayConfig, session: Arc<SessionContext>) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::transport(format!("failed to build HTTP client: {e}")))?;
        let normalizer = PathNormalizer::from_base(&config.base_url);
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);

        Ok(Self {
            inner: Arc::new(GatewayInner {
                http,
                config,
                normalizer,
                session,
                signals,
            }),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.inner.session
    }

    /// Receive session signals published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.inner.signals.subscribe()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> GatewayResult<T> {
        let req = ApiRequest::get(path).query(query.iter().map(|(k, v)| (*k, v.clone())));
        decode(self.send(req).await?)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let req = ApiRequest::post(path).json(to_json(body)?);
        decode(self.send(req).await?)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let req = ApiRequest::put(path).json(to_json(body)?);
        decode(self.send(req).await?)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        decode(self.send(ApiRequest::delete(path)).await?)
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> GatewayResult<T> {
        decode(self.send(ApiRequest::post(path).multipart(form)).await?)
    }

    /// Fetch a binary body (exports); no envelope normalization applies.
    pub async fn download(&self, path: &str, query: &[(&str, String)]) -> GatewayResult<Vec<u8>> {
        let req = ApiRequest::get(path).query(query.iter().map(|(k, v)| (*k, v.clone())));
        let span = self.request_span(&req);
        async move {
            let resp = self.dispatch(req).await?;
            let resp = self.check_status(resp).await?;
            let bytes = resp.bytes().await.map_err(|e| self.transport_failure(e))?;
            Ok(bytes.to_vec())
        }
        .instrument(span)
        .await
    }

    /// Issue a request and normalize its response to a JSON payload.
    pub async fn send(&self, req: ApiRequest) -> GatewayResult<Value> {
        let span = self.request_span(&req);
        async move {
            let resp = self.dispatch(req).await?;
            let resp = self.check_status(resp).await?;
            let body = self.read_body(resp).await?;
            match classify(body) {
                Classified::Success(payload) | Classified::PassThrough(payload) => Ok(payload),
                Classified::Failure { code, message } => Err(self.failure(code, message)),
            }
        }
        .instrument(span)
        .await
    }

    fn request_span(&self, req: &ApiRequest) -> tracing::Span {
        tracing::info_span!(
            "gateway_request",
            request_id = %Uuid::now_v7(),
            method = %req.method,
            path = %req.path,
        )
    }

    async fn dispatch(&self, req: ApiRequest) -> GatewayResult<Response> {
        let inner = &self.inner;
        let raw_path = rooted(&req.path);
        let path = inner.normalizer.normalize(&raw_path);
        let url = format!(
            "{}{}",
            inner.config.base_url.as_str().trim_end_matches('/'),
            path
        );

        tracing::debug!(url = %url, query = ?req.query, "dispatching request");

        let mut builder = inner.http.request(req.method, &url);
        // Slot routing looks at the caller's path, before normalization.
        if let Some(token) = inner.session.token_for(&raw_path) {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        builder = match req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => builder.multipart(form),
        };
        // Per-call headers win over the injected ones.
        if !req.headers.is_empty() {
            builder = builder.headers(req.headers);
        }

        builder.send().await.map_err(|e| self.transport_failure(e))
    }

    /// Map non-2xx statuses; 2xx responses pass through for body handling.
    async fn check_status(&self, resp: Response) -> GatewayResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body: Option<Value> = resp.json().await.ok();
        let message = body
            .as_ref()
            .and_then(body_message)
            .map(str::to_string)
            .unwrap_or_else(|| status_text(status));

        match status {
            StatusCode::UNAUTHORIZED => Err(self.expire(message)),
            StatusCode::FORBIDDEN => Err(self.forbid(message)),
            _ => {
                tracing::error!(status = status.as_u16(), error = %message, "api error");
                Err(GatewayError::status(status.as_u16(), message))
            }
        }
    }

    async fn read_body(&self, resp: Response) -> GatewayResult<Value> {
        let bytes = resp.bytes().await.map_err(|e| self.transport_failure(e))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
    }

    fn failure(&self, code: Option<i64>, message: String) -> GatewayError {
        match code {
            Some(UNAUTHENTICATED) => self.expire(message),
            Some(FORBIDDEN) => self.forbid(message),
            _ => {
                tracing::debug!(?code, error = %message, "business failure");
                GatewayError::business(code, message)
            }
        }
    }

    fn expire(&self, message: String) -> GatewayError {
        self.inner.session.mark_expired();
        self.publish(SessionSignal::Expired {
            at: Utc::now(),
            message: message.clone(),
        });
        GatewayError::auth_expired(message)
    }

    fn forbid(&self, message: String) -> GatewayError {
        self.publish(SessionSignal::Forbidden {
            message: message.clone(),
        });
        GatewayError::forbidden(message)
    }

    fn publish(&self, signal: SessionSignal) {
        // No subscriber is fine: headless callers only see the error.
        if self.inner.signals.send(signal).is_err() {
            tracing::debug!("session signal dropped; no observer subscribed");
        }
    }

    fn transport_failure(&self, err: reqwest::Error) -> GatewayError {
        let message = if err.is_timeout() {
            format!("request timed out after {:?}", self.inner.config.timeout)
        } else {
            err.to_string()
        };
        tracing::error!(error = %message, "api transport error");
        GatewayError::transport(message)
    }
}

/// Caller path with exactly one leading `/`, so it joins cleanly onto the base.
fn rooted(path: &str) -> Cow<'_, str> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.len() + 1 == path.len() {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{trimmed}"))
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> GatewayResult<Value> {
    serde_json::to_value(body).map_err(|e| GatewayError::decode(format!("request body: {e}")))
}

fn decode<T: DeserializeOwned>(payload: Value) -> GatewayResult<T> {
    serde_json::from_value(payload).map_err(|e| GatewayError::decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_paths_get_one_leading_slash() {
        assert_eq!(rooted("/api/v1/ok"), "/api/v1/ok");
        assert!(matches!(rooted("/api/v1/ok"), Cow::Borrowed(_)));
        assert_eq!(rooted("v1/ok"), "/v1/ok");
        assert_eq!(rooted("//api/v1/ok"), "/api/v1/ok");
        assert_eq!(rooted(""), "/");
    }
}
