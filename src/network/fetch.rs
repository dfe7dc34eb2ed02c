// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch-style request primitive
//!
//! A single call taking a target (URL or request-like object) plus optional
//! init options, resolving to a response.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;

use crate::error::Result;
use crate::http::{Body, Request, Response};

/// Target of a fetch call
#[derive(Debug, Clone)]
pub enum FetchTarget {
    /// Plain URL string
    Url(String),
    /// Request-like object carrying its own method, headers and body
    Request(Request),
}

impl FetchTarget {
    /// Effective URL of the call
    pub fn url(&self) -> &str {
        match self {
            FetchTarget::Url(url) => url,
            FetchTarget::Request(request) => request.url_str(),
        }
    }

    /// Build the concrete request, applying init overrides
    pub fn into_request(self, init: Option<FetchInit>) -> Result<Request> {
        let mut request = match self {
            FetchTarget::Url(url) => Request::get(url)?,
            FetchTarget::Request(request) => request,
        };

        if let Some(init) = init {
            if let Some(method) = init.method {
                request.method = method;
            }
            for (name, value) in init.headers.iter() {
                request.headers.insert(name.clone(), value.clone());
            }
            if init.body.is_some() {
                request.body = init.body;
            }
        }

        Ok(request)
    }
}

impl From<&str> for FetchTarget {
    fn from(url: &str) -> Self {
        FetchTarget::Url(url.to_string())
    }
}

impl From<String> for FetchTarget {
    fn from(url: String) -> Self {
        FetchTarget::Url(url)
    }
}

impl From<url::Url> for FetchTarget {
    fn from(url: url::Url) -> Self {
        FetchTarget::Url(url.into())
    }
}

impl From<Request> for FetchTarget {
    fn from(request: Request) -> Self {
        FetchTarget::Request(request)
    }
}

/// Optional per-call options
#[derive(Debug, Clone, Default)]
pub struct FetchInit {
    /// Method override
    pub method: Option<Method>,
    /// Extra headers
    pub headers: HeaderMap,
    /// Body
    pub body: Option<Body>,
}

impl FetchInit {
    /// Create empty init options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Fetch-style request primitive
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform one request
    async fn fetch(&self, target: FetchTarget, init: Option<FetchInit>) -> Result<Response>;
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    async fn fetch(&self, target: FetchTarget, init: Option<FetchInit>) -> Result<Response> {
        (**self).fetch(target, init).await
    }
}
