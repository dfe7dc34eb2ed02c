// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch-style interceptor
//!
//! Wraps a [`Fetch`] implementation. In-scope calls whose body names a
//! blocked operation are answered locally with a synthetic response; every
//! other call is delegated with its original arguments.

use std::sync::Arc;

use async_trait::async_trait;

use super::diagnostic::{Reporter, Transport};
use super::fetch::{Fetch, FetchInit, FetchTarget};
use crate::error::{ErrorContext, Result};
use crate::filter::{FilterConfig, InterceptionDecision, Matcher, TargetEndpoint};
use crate::http::Response;

/// Fetch wrapper that blocks denylisted GraphQL operations
pub struct FetchInterceptor {
    /// Real primitive
    inner: Arc<dyn Fetch>,
    /// Scope prefix
    endpoint: TargetEndpoint,
    /// Payload matcher
    matcher: Matcher,
    /// Diagnostics
    reporter: Reporter,
}

impl FetchInterceptor {
    /// Wrap a real fetch primitive
    pub fn new(inner: Arc<dyn Fetch>, config: &FilterConfig) -> Self {
        Self {
            inner,
            endpoint: config.target_endpoint.clone(),
            matcher: Matcher::new(config.blocked_operations.clone()),
            reporter: Reporter::new(),
        }
    }

    /// Set the diagnostic reporter
    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Classify a call without performing it
    ///
    /// Returns `None` when the call is out of scope, has no body, or the
    /// body cannot be read.
    pub async fn inspect(
        &self,
        target: &FetchTarget,
        init: Option<&FetchInit>,
    ) -> Option<InterceptionDecision> {
        let url = target.url();
        if !self.endpoint.contains(url) {
            return None;
        }

        match extract_body(target, init).await.with_url(url) {
            Ok(Some(body)) => Some(self.matcher.classify(body)),
            Ok(None) => None,
            Err(e) => {
                self.reporter.inspection_failed(Transport::Fetch, url, &e);
                None
            }
        }
    }
}

#[async_trait]
impl Fetch for FetchInterceptor {
    async fn fetch(&self, target: FetchTarget, init: Option<FetchInit>) -> Result<Response> {
        if let Some(decision) = self.inspect(&target, init.as_ref()).await {
            if decision.matched {
                self.reporter
                    .blocked(Transport::Fetch, target.url(), &decision.matched_names);
                return Ok(Response::synthetic());
            }
        }

        tracing::debug!(url = %target.url(), "Delegating fetch");
        self.inner.fetch(target, init).await
    }
}

/// Read the body of a call without consuming it
///
/// A request-like target is cloned and the clone read; otherwise the init
/// body is used.
async fn extract_body(target: &FetchTarget, init: Option<&FetchInit>) -> Result<Option<String>> {
    let text = match target {
        FetchTarget::Request(request) => request.clone().text().await?,
        FetchTarget::Url(_) => match init.and_then(|i| i.body.as_ref()) {
            Some(body) => body.inspect_text()?,
            None => return Ok(None),
        },
    };

    Ok(Some(text).filter(|t| !t.is_empty()))
}
