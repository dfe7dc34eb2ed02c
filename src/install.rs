// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Process-wide installation
//!
//! Hosts that cannot thread the wrapped primitives through their call sites
//! install them once here and look them up with [`installed`]. The
//! interceptors themselves never touch this global.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::filter::FilterConfig;
use crate::http::{HttpClient, HttpClientConfig};
use crate::network::{Fetch, FetchInterceptor, Reporter};
use crate::scheduler::EventLoop;
use crate::xhr::{HttpXhrFactory, XhrFactory, XhrInterceptor, XmlHttpRequest};

lazy_static! {
    static ref INSTALLED: RwLock<Option<Arc<Installation>>> = RwLock::new(None);
}

/// Wrapped fetch and XHR primitives sharing one configuration
pub struct Installation {
    config: FilterConfig,
    fetch: Arc<FetchInterceptor>,
    xhr: Arc<XhrInterceptor>,
    event_loop: EventLoop,
}

impl Installation {
    /// Start building an installation
    pub fn builder(config: FilterConfig) -> InstallationBuilder {
        InstallationBuilder::new(config)
    }

    /// Active configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Wrapped fetch primitive
    pub fn fetch(&self) -> Arc<dyn Fetch> {
        self.fetch.clone()
    }

    /// Wrapped XHR constructor
    pub fn xhr_factory(&self) -> Arc<dyn XhrFactory> {
        self.xhr.clone()
    }

    /// Create a wrapped XHR object
    pub fn create_xhr(&self) -> Box<dyn XmlHttpRequest> {
        self.xhr.create()
    }

    /// Event loop XHR completions run on
    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }
}

/// Builder for [`Installation`]
///
/// Missing primitives default to the reqwest-backed ones.
pub struct InstallationBuilder {
    config: FilterConfig,
    fetch: Option<Arc<dyn Fetch>>,
    xhr: Option<Arc<dyn XhrFactory>>,
    event_loop: Option<EventLoop>,
    reporter: Reporter,
    http: HttpClientConfig,
}

impl InstallationBuilder {
    /// Create a builder
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            fetch: None,
            xhr: None,
            event_loop: None,
            reporter: Reporter::new(),
            http: HttpClientConfig::default(),
        }
    }

    /// Real fetch primitive
    pub fn fetch(mut self, fetch: Arc<dyn Fetch>) -> Self {
        self.fetch = Some(fetch);
        self
    }

    /// Real XHR constructor
    pub fn xhr(mut self, xhr: Arc<dyn XhrFactory>) -> Self {
        self.xhr = Some(xhr);
        self
    }

    /// Event loop for XHR completions
    pub fn event_loop(mut self, event_loop: EventLoop) -> Self {
        self.event_loop = Some(event_loop);
        self
    }

    /// Diagnostic reporter
    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Client settings for the default primitives
    pub fn http_config(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Build the wrapped primitives
    pub fn build(self) -> Result<Installation> {
        self.config.validate()?;

        let event_loop = self.event_loop.unwrap_or_default();
        let (fetch, xhr) = match (self.fetch, self.xhr) {
            (Some(fetch), Some(xhr)) => (fetch, xhr),
            (fetch, xhr) => {
                let client = HttpClient::with_config(self.http)?;
                let fetch =
                    fetch.unwrap_or_else(|| Arc::new(client.clone()) as Arc<dyn Fetch>);
                let xhr = xhr.unwrap_or_else(|| {
                    let factory = HttpXhrFactory::new(client, event_loop.clone());
                    Arc::new(factory) as Arc<dyn XhrFactory>
                });
                (fetch, xhr)
            }
        };

        let fetch = FetchInterceptor::new(fetch, &self.config).reporter(self.reporter.clone());
        let xhr = XhrInterceptor::new(xhr, &self.config, event_loop.clone())
            .reporter(self.reporter);

        Ok(Installation {
            config: self.config,
            fetch: Arc::new(fetch),
            xhr: Arc::new(xhr),
            event_loop,
        })
    }
}

/// Install wrapped primitives for the whole process
///
/// Fails with [`Error::AlreadyInstalled`] on a second call.
pub fn install(installation: Installation) -> Result<Arc<Installation>> {
    let mut slot = INSTALLED.write();
    if slot.is_some() {
        return Err(Error::AlreadyInstalled);
    }

    let installation = Arc::new(installation);
    *slot = Some(installation.clone());

    let blocked: Vec<&str> = installation.config.blocked_operations.iter().collect();
    tracing::info!(
        endpoint = %installation.config.target_endpoint.as_str(),
        blocking = %blocked.join(", "),
        "GraphQL operation filter installed"
    );

    Ok(installation)
}

/// Installed primitives
pub fn installed() -> Result<Arc<Installation>> {
    INSTALLED.read().clone().ok_or(Error::NotInstalled)
}

/// Check whether primitives are installed
pub fn is_installed() -> bool {
    INSTALLED.read().is_some()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_builder_defaults() {
        let installation = Installation::builder(FilterConfig::default()).build().unwrap();
        assert_eq!(installation.config().blocked_operations.len(), 2);
        assert!(!installation.event_loop().has_pending());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = FilterConfig::new("");
        assert!(matches!(
            Installation::builder(config).build(),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_builder_applies_http_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "opblock-test"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let http = HttpClientConfig::default()
            .user_agent("opblock-test")
            .timeout(Duration::from_secs(5));
        let installation = Installation::builder(FilterConfig::default())
            .http_config(http)
            .build()
            .unwrap();

        let response = installation
            .fetch()
            .fetch(server.uri().into(), None)
            .await
            .unwrap();
        assert_eq!(response.status_code(), 204);
    }
}
