// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch-style interception and diagnostics

mod diagnostic;
mod fetch;
mod interceptor;

pub use diagnostic::{Diagnostic, DiagnosticLog, DiagnosticSink, Reporter, Transport};
pub use fetch::{Fetch, FetchInit, FetchTarget};
pub use interceptor::FetchInterceptor;
