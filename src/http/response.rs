// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::filter::{SyntheticResponse, SYNTHETIC_CONTENT_TYPE};

/// Response-like result of a fetch-style call
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// Final URL (after redirects); `None` for locally built responses
    pub url: Option<Url>,
    /// Whether this was a redirect
    pub redirected: bool,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    /// Create a new response
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Option<Url>,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
        }
    }

    /// Empty successful GraphQL response substituted for a blocked call
    pub fn synthetic() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(SYNTHETIC_CONTENT_TYPE));

        Self::new(
            StatusCode::OK,
            headers,
            Bytes::from(SyntheticResponse::body()),
            None,
            false,
            0,
        )
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Check if content type is JSON
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false)
    }

    /// Get the final URL as string, empty for locally built responses
    pub fn url_str(&self) -> &str {
        self.url.as_ref().map(Url::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status() {
        let resp = Response::new(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            Bytes::from("missing"),
            Some(Url::parse("https://example.com").unwrap()),
            false,
            100,
        );
        assert!(!resp.is_success());
        assert_eq!(resp.status_code(), 404);
        assert_eq!(resp.text().unwrap(), "missing");
    }

    #[test]
    fn test_synthetic_response() {
        let resp = Response::synthetic();
        assert_eq!(resp.status_code(), 200);
        assert!(resp.is_json());
        assert_eq!(resp.url_str(), "");

        let body: SyntheticResponse = resp.json().unwrap();
        assert_eq!(body, SyntheticResponse::default());
    }
}
