// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Diagnostic records emitted by the interceptors

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which request primitive produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Fetch-style single call
    Fetch,
    /// XHR-style stateful request object
    Xhr,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Fetch => write!(f, "fetch"),
            Transport::Xhr => write!(f, "xhr"),
        }
    }
}

/// One diagnostic record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A request was answered with a synthetic response
    Blocked {
        transport: Transport,
        url: String,
        operations: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    /// The body could not be inspected; the request went through
    InspectionFailed {
        transport: Transport,
        url: String,
        detail: String,
        timestamp: DateTime<Utc>,
    },
}

impl Diagnostic {
    /// Transport the record belongs to
    pub fn transport(&self) -> Transport {
        match self {
            Diagnostic::Blocked { transport, .. } => *transport,
            Diagnostic::InspectionFailed { transport, .. } => *transport,
        }
    }

    /// Request URL
    pub fn url(&self) -> &str {
        match self {
            Diagnostic::Blocked { url, .. } => url,
            Diagnostic::InspectionFailed { url, .. } => url,
        }
    }

    /// Check if this records a block
    pub fn is_block(&self) -> bool {
        matches!(self, Diagnostic::Blocked { .. })
    }
}

/// Callback receiving every diagnostic
pub type DiagnosticSink = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

/// Emits diagnostics to tracing and an optional sink
#[derive(Clone, Default)]
pub struct Reporter {
    sink: Option<DiagnosticSink>,
}

impl Reporter {
    /// Create a reporter that only logs
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forward records to a sink
    pub fn with_sink(mut self, sink: DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Record a block
    pub fn blocked(&self, transport: Transport, url: &str, operations: &[String]) {
        tracing::warn!(
            %transport,
            url = %url,
            operations = ?operations,
            "Blocked GraphQL operation"
        );

        self.emit(Diagnostic::Blocked {
            transport,
            url: url.to_string(),
            operations: operations.to_vec(),
            timestamp: Utc::now(),
        });
    }

    /// Record an inspection failure
    pub fn inspection_failed(&self, transport: Transport, url: &str, error: &Error) {
        tracing::error!(
            %transport,
            url = %url,
            error = %error,
            "Error inspecting request body"
        );

        self.emit(Diagnostic::InspectionFailed {
            transport,
            url: url.to_string(),
            detail: error.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, diagnostic: Diagnostic) {
        if let Some(ref sink) = self.sink {
            sink(&diagnostic);
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

/// In-memory diagnostic store
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    records: Arc<RwLock<Vec<Diagnostic>>>,
    max_records: usize,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            max_records: 1000,
        }
    }

    /// Set max records kept; oldest are dropped first
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Sink appending to this log
    pub fn sink(&self) -> DiagnosticSink {
        let log = self.clone();
        Arc::new(move |diagnostic: &Diagnostic| log.push(diagnostic.clone()))
    }

    /// All records
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.read().clone()
    }

    /// Block records only
    pub fn blocks(&self) -> Vec<Diagnostic> {
        self.records
            .read()
            .iter()
            .filter(|d| d.is_block())
            .cloned()
            .collect()
    }

    /// Record count
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clear all records
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Export records as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.records())
    }

    fn push(&self, diagnostic: Diagnostic) {
        let mut records = self.records.write();
        if self.max_records == 0 {
            return;
        }
        if records.len() >= self.max_records {
            records.remove(0);
        }
        records.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_forwards_to_log() {
        let log = DiagnosticLog::new();
        let reporter = Reporter::new().with_sink(log.sink());

        reporter.blocked(
            Transport::Fetch,
            "https://example.com/graphql",
            &["Foo".to_string()],
        );
        reporter.inspection_failed(
            Transport::Xhr,
            "https://example.com/graphql",
            &Error::extraction("bad body"),
        );

        assert_eq!(log.len(), 2);
        assert_eq!(log.blocks().len(), 1);
        assert_eq!(log.records()[1].transport(), Transport::Xhr);
        assert_eq!(log.records()[0].url(), "https://example.com/graphql");
    }

    #[test]
    fn test_log_limit() {
        let log = DiagnosticLog::new().max_records(2);
        let reporter = Reporter::new().with_sink(log.sink());
        for name in ["A", "B", "C"] {
            reporter.blocked(Transport::Fetch, "u", &[name.to_string()]);
        }

        let names: Vec<Vec<String>> = log
            .records()
            .into_iter()
            .map(|d| match d {
                Diagnostic::Blocked { operations, .. } => operations,
                _ => Vec::new(),
            })
            .collect();
        assert_eq!(names, vec![vec!["B".to_string()], vec!["C".to_string()]]);
    }

    #[test]
    fn test_json_shape() {
        let log = DiagnosticLog::new();
        Reporter::new()
            .with_sink(log.sink())
            .blocked(Transport::Xhr, "u", &["Foo".to_string()]);

        let json = log.to_json().unwrap();
        assert!(json.contains(r#""kind":"blocked""#));
        assert!(json.contains(r#""transport":"xhr""#));
    }
}
