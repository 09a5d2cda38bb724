//! Request correlation
//!
//! Every request runs inside an `http_request` span carrying a request id.
//! The id comes from `X-Request-Id` when the client sent a usable one,
//! otherwise from Twilio's idempotency token, otherwise a fresh UUID v7.
//! It is echoed back in `X-Request-Id`.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, header::HeaderValue},
    response::Response,
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Sent by Twilio on every webhook delivery, stable across retries
pub const TWILIO_TOKEN_HEADER: &str = "I-Twilio-Idempotency-Token";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Layer that attaches a request id to each request
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let request_id = RequestId::from_headers(request.headers());
        request.extensions_mut().insert(request_id.clone());

        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
        );

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let mut response = inner.call(request).await?;
                if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Correlation id of one request, available as a request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Pick the id from the headers, generating one when none is usable
    pub fn from_headers(headers: &HeaderMap) -> Self {
        [REQUEST_ID_HEADER, TWILIO_TOKEN_HEADER]
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .map(str::trim)
            .find(|v| is_usable(v))
            .map_or_else(Self::generate, |v| Self(v.to_string()))
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_usable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn client_id_wins() {
        let id = RequestId::from_headers(&headers(&[
            (REQUEST_ID_HEADER, "abc-123"),
            (TWILIO_TOKEN_HEADER, "twilio-token"),
        ]));
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn twilio_token_is_used_without_client_id() {
        let id = RequestId::from_headers(&headers(&[(TWILIO_TOKEN_HEADER, "CA1-RE1")]));
        assert_eq!(id.as_str(), "CA1-RE1");
    }

    #[test]
    fn unusable_values_are_replaced() {
        let id = RequestId::from_headers(&headers(&[(REQUEST_ID_HEADER, "has spaces")]));
        assert!(Uuid::parse_str(id.as_str()).is_ok());

        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        let id = RequestId::from_headers(&headers(&[(REQUEST_ID_HEADER, long.as_str())]));
        assert_ne!(id.as_str(), long);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
