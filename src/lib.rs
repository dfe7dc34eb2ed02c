// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # opblock - GraphQL Operation Filter
//!
//! Wraps a client's fetch and XHR primitives so that selected GraphQL
//! operations sent to one endpoint never reach the network. A blocked
//! request gets a synthetic `{"data":null,"errors":[]}` response with
//! status 200; everything else passes through untouched.
//!
//! ## Features
//!
//! - Payload matching on `operationName`, including batched requests
//! - Substring fallback for bodies that are not valid JSON
//! - Fetch-style and XHR-style interception behind drop-in traits
//! - XHR completions delivered on a cooperative event loop
//! - Structured diagnostics through tracing and an optional sink
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use opblock::{Fetch, FetchInit, FetchInterceptor, FilterConfig, HttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FilterConfig::default();
//!     let fetch = FetchInterceptor::new(Arc::new(HttpClient::new()?), &config);
//!
//!     let init = FetchInit::new()
//!         .method(reqwest::Method::POST)
//!         .body(r#"{"operationName":"CLCSInterstitialLolomo"}"#);
//!     let response = fetch
//!         .fetch(config.target_endpoint.as_str().into(), Some(init))
//!         .await?;
//!
//!     assert_eq!(response.text()?, r#"{"data":null,"errors":[]}"#);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod filter;
pub mod http;
pub mod install;
pub mod logging;
pub mod network;
pub mod scheduler;
pub mod xhr;

// Re-exports for convenience

// Errors
pub use error::{Error, ErrorContext, Result};

// Filter
pub use filter::{
    BlockedOperationSet, FilterConfig, InterceptionDecision, Matcher, SyntheticResponse,
    TargetEndpoint,
};

// HTTP
pub use http::{Body, HttpClient, HttpClientConfig, Request, Response};

// Installation
pub use install::{install, installed, Installation, InstallationBuilder};

// Network
pub use network::{Diagnostic, DiagnosticLog, DiagnosticSink, Reporter, Transport};
pub use network::{Fetch, FetchInit, FetchInterceptor, FetchTarget};

// Scheduler
pub use scheduler::{EventLoop, IdleConfig, IdleResult};

// XHR
pub use xhr::{EventKind, EventListener, ReadyState, XhrEvent, XhrFactory, XmlHttpRequest};
pub use xhr::{HttpXhr, HttpXhrFactory, InterceptedXhr, XhrInterceptor};

/// opblock version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
