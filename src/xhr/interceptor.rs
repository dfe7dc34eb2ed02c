// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! XHR-style interceptor
//!
//! [`InterceptedXhr`] delegates every member of [`XmlHttpRequest`] to a real
//! object except `open`, which records the URL, and `send`, which may
//! short-circuit. A short-circuited request completes on the next event
//! loop tick as a successful exchange carrying the synthetic body.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use super::events::{dispatch, EventKind, EventListener, XhrEvent};
use super::{ReadyState, XhrFactory, XmlHttpRequest};
use crate::error::{ErrorContext, Result};
use crate::filter::{
    FilterConfig, Matcher, SyntheticResponse, TargetEndpoint, SYNTHETIC_CONTENT_TYPE,
    SYNTHETIC_STATUS,
};
use crate::http::Body;
use crate::network::{Reporter, Transport};
use crate::scheduler::EventLoop;

/// Filter state shared by every object an interceptor creates
struct XhrFilter {
    endpoint: TargetEndpoint,
    matcher: Matcher,
    reporter: Reporter,
    event_loop: EventLoop,
}

/// Factory wrapper: creates [`InterceptedXhr`] objects around real ones
pub struct XhrInterceptor {
    factory: Arc<dyn XhrFactory>,
    filter: Arc<XhrFilter>,
}

impl XhrInterceptor {
    /// Wrap a real XHR constructor
    pub fn new(factory: Arc<dyn XhrFactory>, config: &FilterConfig, event_loop: EventLoop) -> Self {
        Self {
            factory,
            filter: Arc::new(XhrFilter {
                endpoint: config.target_endpoint.clone(),
                matcher: Matcher::new(config.blocked_operations.clone()),
                reporter: Reporter::new(),
                event_loop,
            }),
        }
    }

    /// Set the diagnostic reporter
    pub fn reporter(self, reporter: Reporter) -> Self {
        let filter = XhrFilter {
            endpoint: self.filter.endpoint.clone(),
            matcher: self.filter.matcher.clone(),
            reporter,
            event_loop: self.filter.event_loop.clone(),
        };
        Self {
            factory: self.factory,
            filter: Arc::new(filter),
        }
    }

    /// Create a wrapped request object
    pub fn create_intercepted(&self) -> InterceptedXhr {
        InterceptedXhr {
            shared: Arc::new(Shared {
                inner: Mutex::new(self.factory.create()),
                synthetic: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
            filter: self.filter.clone(),
            url: String::new(),
            blocked: false,
        }
    }
}

impl XhrFactory for XhrInterceptor {
    fn create(&self) -> Box<dyn XmlHttpRequest> {
        Box::new(self.create_intercepted())
    }
}

/// State the deferred completion task needs
struct Shared {
    inner: Mutex<Box<dyn XmlHttpRequest>>,
    /// Completion properties report the synthetic exchange
    synthetic: AtomicBool,
    /// Bumped by `open` so a superseded completion does nothing
    generation: AtomicU64,
}

impl Shared {
    fn complete_synthetic(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        self.synthetic.store(true, Ordering::SeqCst);

        for kind in [EventKind::ReadyStateChange, EventKind::Load] {
            let listeners = self.inner.lock().listeners(kind);
            let event = XhrEvent {
                kind,
                ready_state: ReadyState::Done,
                status: SYNTHETIC_STATUS,
            };
            dispatch(&listeners, &event);
        }
    }

    fn is_synthetic(&self) -> bool {
        self.synthetic.load(Ordering::SeqCst)
    }
}

/// Request object that blocks denylisted GraphQL operations
pub struct InterceptedXhr {
    shared: Arc<Shared>,
    filter: Arc<XhrFilter>,
    /// URL from the most recent `open`
    url: String,
    blocked: bool,
}

impl InterceptedXhr {
    /// Whether the last `send` was answered synthetically
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// URL passed to the most recent `open`
    pub fn opened_url(&self) -> &str {
        &self.url
    }

    /// Matched operation names if this body should be blocked
    fn should_block(&self, body: Option<&Body>) -> Option<Vec<String>> {
        if !self.filter.endpoint.contains(&self.url) {
            return None;
        }
        let body = body.filter(|b| !b.is_empty())?;

        let decision = match body {
            Body::Json(value) => self.filter.matcher.classify_value(value),
            other => match other.inspect_text().with_url(&self.url) {
                Ok(text) => self.filter.matcher.classify(text),
                Err(e) => {
                    self.filter
                        .reporter
                        .inspection_failed(Transport::Xhr, &self.url, &e);
                    return None;
                }
            },
        };

        Some(decision.matched_names).filter(|names| !names.is_empty())
    }
}

impl XmlHttpRequest for InterceptedXhr {
    fn open(&mut self, method: &str, url: &str) -> Result<()> {
        self.url = url.to_string();
        self.blocked = false;
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.synthetic.store(false, Ordering::SeqCst);
        self.shared.inner.lock().open(method, url)
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.shared.inner.lock().set_request_header(name, value)
    }

    fn send(&mut self, body: Option<Body>) -> Result<()> {
        let names = match self.should_block(body.as_ref()) {
            Some(names) => names,
            None => {
                tracing::debug!(url = %self.url, "Delegating XHR send");
                return self.shared.inner.lock().send(body);
            }
        };

        self.filter
            .reporter
            .blocked(Transport::Xhr, &self.url, &names);
        self.blocked = true;

        let shared = self.shared.clone();
        let generation = shared.generation.load(Ordering::SeqCst);
        self.filter
            .event_loop
            .post(move || shared.complete_synthetic(generation));
        Ok(())
    }

    fn abort(&mut self) {
        self.shared.inner.lock().abort()
    }

    fn ready_state(&self) -> ReadyState {
        if self.shared.is_synthetic() {
            return ReadyState::Done;
        }
        self.shared.inner.lock().ready_state()
    }

    fn status(&self) -> u16 {
        if self.shared.is_synthetic() {
            return SYNTHETIC_STATUS;
        }
        self.shared.inner.lock().status()
    }

    fn status_text(&self) -> String {
        if self.shared.is_synthetic() {
            return "OK".to_string();
        }
        self.shared.inner.lock().status_text()
    }

    fn response_text(&self) -> String {
        if self.shared.is_synthetic() {
            return SyntheticResponse::body();
        }
        self.shared.inner.lock().response_text()
    }

    fn response(&self) -> Bytes {
        if self.shared.is_synthetic() {
            return Bytes::from(SyntheticResponse::body());
        }
        self.shared.inner.lock().response()
    }

    fn response_header(&self, name: &str) -> Option<String> {
        if self.shared.is_synthetic() {
            return name
                .eq_ignore_ascii_case("content-type")
                .then(|| SYNTHETIC_CONTENT_TYPE.to_string());
        }
        self.shared.inner.lock().response_header(name)
    }

    fn all_response_headers(&self) -> String {
        if self.shared.is_synthetic() {
            return format!("content-type: {}\r\n", SYNTHETIC_CONTENT_TYPE);
        }
        self.shared.inner.lock().all_response_headers()
    }

    fn add_event_listener(&mut self, kind: EventKind, listener: EventListener) {
        self.shared.inner.lock().add_event_listener(kind, listener)
    }

    fn remove_event_listener(&mut self, kind: EventKind, listener: &EventListener) {
        self.shared.inner.lock().remove_event_listener(kind, listener)
    }

    fn set_event_handler(&mut self, kind: EventKind, handler: Option<EventListener>) {
        self.shared.inner.lock().set_event_handler(kind, handler)
    }

    fn listeners(&self, kind: EventKind) -> Vec<EventListener> {
        self.shared.inner.lock().listeners(kind)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Error;
    use crate::network::DiagnosticLog;
    use crate::xhr::EventListeners;

    const ENDPOINT: &str = "https://api.example.com/graphql";

    /// Fake XHR recording the calls it receives
    #[derive(Default)]
    struct FakeXhr {
        calls: Arc<Mutex<Vec<String>>>,
        listeners: EventListeners,
        state: Option<ReadyState>,
    }

    impl XmlHttpRequest for FakeXhr {
        fn open(&mut self, method: &str, url: &str) -> Result<()> {
            self.calls.lock().push(format!("open {} {}", method, url));
            self.state = Some(ReadyState::Opened);
            Ok(())
        }
        fn set_request_header(&mut self, name: &str, value: &str) -> Result<()> {
            self.calls.lock().push(format!("header {}={}", name, value));
            Ok(())
        }
        fn send(&mut self, body: Option<Body>) -> Result<()> {
            let text = body.map(|b| b.inspect_text().unwrap_or_default());
            self.calls.lock().push(format!("send {:?}", text));
            Ok(())
        }
        fn abort(&mut self) {
            self.calls.lock().push("abort".to_string());
        }
        fn ready_state(&self) -> ReadyState {
            self.state.unwrap_or(ReadyState::Unsent)
        }
        fn status(&self) -> u16 {
            0
        }
        fn status_text(&self) -> String {
            String::new()
        }
        fn response_text(&self) -> String {
            String::new()
        }
        fn response(&self) -> Bytes {
            Bytes::new()
        }
        fn response_header(&self, _name: &str) -> Option<String> {
            None
        }
        fn all_response_headers(&self) -> String {
            String::new()
        }
        fn add_event_listener(&mut self, kind: EventKind, listener: EventListener) {
            self.listeners.add(kind, listener);
        }
        fn remove_event_listener(&mut self, kind: EventKind, listener: &EventListener) {
            self.listeners.remove(kind, listener);
        }
        fn set_event_handler(&mut self, kind: EventKind, handler: Option<EventListener>) {
            self.listeners.set_handler(kind, handler);
        }
        fn listeners(&self, kind: EventKind) -> Vec<EventListener> {
            self.listeners.for_kind(kind)
        }
    }

    struct FakeFactory {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl XhrFactory for FakeFactory {
        fn create(&self) -> Box<dyn XmlHttpRequest> {
            Box::new(FakeXhr {
                calls: self.calls.clone(),
                ..Default::default()
            })
        }
    }

    fn setup() -> (XhrInterceptor, Arc<Mutex<Vec<String>>>, EventLoop, DiagnosticLog) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let event_loop = EventLoop::new();
        let log = DiagnosticLog::new();
        let interceptor = XhrInterceptor::new(
            Arc::new(FakeFactory {
                calls: calls.clone(),
            }),
            &FilterConfig::new(ENDPOINT).block("Blocked"),
            event_loop.clone(),
        )
        .reporter(Reporter::new().with_sink(log.sink()));
        (interceptor, calls, event_loop, log)
    }

    #[test]
    fn test_blocked_send_completes_on_next_tick() {
        let (interceptor, calls, event_loop, log) = setup();
        let mut xhr = interceptor.create_intercepted();

        xhr.open("POST", ENDPOINT).unwrap();
        xhr.send(Some(Body::from(r#"{"operationName":"Blocked"}"#)))
            .unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in [EventKind::ReadyStateChange, EventKind::Load] {
            let e = events.clone();
            xhr.add_event_listener(
                kind,
                Arc::new(move |ev: &XhrEvent| e.lock().push(ev.clone())),
            );
        }

        assert!(xhr.is_blocked());
        assert_eq!(xhr.ready_state(), ReadyState::Opened);
        assert!(events.lock().is_empty());

        assert_eq!(event_loop.run_until_idle(10), 1);

        assert_eq!(xhr.ready_state(), ReadyState::Done);
        assert_eq!(xhr.status(), 200);
        assert_eq!(xhr.response_text(), r#"{"data":null,"errors":[]}"#);
        assert_eq!(xhr.response_header("Content-Type").as_deref(), Some("application/json"));

        let kinds: Vec<EventKind> = events.lock().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::ReadyStateChange, EventKind::Load]);

        // The real object never saw send
        assert_eq!(*calls.lock(), vec![format!("open POST {}", ENDPOINT)]);
        assert_eq!(log.blocks().len(), 1);
    }

    #[test]
    fn test_blocked_send_completes_with_full_queue() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let event_loop = EventLoop::with_max_tasks(1);
        let interceptor = XhrInterceptor::new(
            Arc::new(FakeFactory {
                calls: calls.clone(),
            }),
            &FilterConfig::new(ENDPOINT).block("Blocked"),
            event_loop.clone(),
        );

        // Host timer fills the queue
        event_loop.set_timeout(|| {}, Duration::ZERO).unwrap();
        assert!(event_loop.set_timeout(|| {}, Duration::ZERO).is_err());

        let mut xhr = interceptor.create_intercepted();
        xhr.open("POST", ENDPOINT).unwrap();
        let loads = Arc::new(Mutex::new(0));
        let l = loads.clone();
        xhr.add_event_listener(EventKind::Load, Arc::new(move |_: &XhrEvent| *l.lock() += 1));
        xhr.send(Some(Body::from(r#"{"operationName":"Blocked"}"#)))
            .unwrap();

        event_loop.run_until_idle(100);

        assert_eq!(xhr.ready_state(), ReadyState::Done);
        assert_eq!(xhr.status(), 200);
        assert_eq!(*loads.lock(), 1);
    }

    #[test]
    fn test_unmatched_send_delegates() {
        let (interceptor, calls, event_loop, _) = setup();
        let mut xhr = interceptor.create_intercepted();

        xhr.open("POST", ENDPOINT).unwrap();
        xhr.set_request_header("content-type", "application/json").unwrap();
        xhr.send(Some(Body::from(r#"{"operationName":"Allowed"}"#)))
            .unwrap();

        assert!(!xhr.is_blocked());
        assert_eq!(event_loop.pending_count(), 0);
        assert_eq!(
            *calls.lock(),
            vec![
                format!("open POST {}", ENDPOINT),
                "header content-type=application/json".to_string(),
                r#"send Some("{\"operationName\":\"Allowed\"}")"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_out_of_scope_delegates() {
        let (interceptor, calls, _, log) = setup();
        let mut xhr = interceptor.create_intercepted();

        xhr.open("POST", "https://other.example.com/graphql").unwrap();
        xhr.send(Some(Body::from(r#"{"operationName":"Blocked"}"#)))
            .unwrap();

        assert!(!xhr.is_blocked());
        assert_eq!(calls.lock().len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_empty_body_delegates() {
        let (interceptor, calls, _, _) = setup();
        let mut xhr = interceptor.create_intercepted();

        xhr.open("POST", ENDPOINT).unwrap();
        xhr.send(None).unwrap();
        xhr.open("POST", ENDPOINT).unwrap();
        xhr.send(Some(Body::from(""))).unwrap();

        assert!(!xhr.is_blocked());
        assert_eq!(calls.lock().iter().filter(|c| c.starts_with("send")).count(), 2);
    }

    #[test]
    fn test_unreadable_body_delegates() {
        let (interceptor, calls, _, log) = setup();
        let mut xhr = interceptor.create_intercepted();

        xhr.open("POST", ENDPOINT).unwrap();
        xhr.send(Some(Body::from(vec![0xff, 0x00]))).unwrap();

        assert!(!xhr.is_blocked());
        assert_eq!(calls.lock().len(), 2);
        assert_eq!(log.len(), 1);
        assert!(!log.records()[0].is_block());
    }

    #[test]
    fn test_structured_body_blocks() {
        let (interceptor, _, event_loop, _) = setup();
        let mut xhr = interceptor.create_intercepted();

        xhr.open("POST", ENDPOINT).unwrap();
        xhr.send(Some(Body::from(serde_json::json!([
            { "operationName": "Other" },
            { "operationName": "Blocked" }
        ]))))
        .unwrap();

        assert!(xhr.is_blocked());
        event_loop.run_until_idle(10);
        assert_eq!(xhr.status(), 200);
    }

    #[test]
    fn test_handler_property_fires() {
        let (interceptor, _, event_loop, _) = setup();
        let mut xhr = interceptor.create_intercepted();
        let fired = Arc::new(Mutex::new(0));

        let f = fired.clone();
        xhr.set_event_handler(EventKind::Load, Some(Arc::new(move |_: &XhrEvent| *f.lock() += 1)));
        xhr.open("POST", ENDPOINT).unwrap();
        xhr.send(Some(Body::from("garbage Blocked garbage"))).unwrap();
        event_loop.run_until_idle(10);

        assert_eq!(*fired.lock(), 1);
    }

    #[test]
    fn test_reopen_supersedes_pending_completion() {
        let (interceptor, _, event_loop, _) = setup();
        let mut xhr = interceptor.create_intercepted();

        xhr.open("POST", ENDPOINT).unwrap();
        xhr.send(Some(Body::from(r#"{"operationName":"Blocked"}"#)))
            .unwrap();
        xhr.open("GET", "https://other.example.com/").unwrap();
        event_loop.run_until_idle(10);

        assert!(!xhr.is_blocked());
        assert_eq!(xhr.ready_state(), ReadyState::Opened);
        assert_eq!(xhr.opened_url(), "https://other.example.com/");
    }

    #[test]
    fn test_abort_passes_through() {
        let (interceptor, calls, _, _) = setup();
        let mut xhr = interceptor.create_intercepted();
        xhr.abort();
        assert_eq!(*calls.lock(), vec!["abort".to_string()]);
    }

    #[test]
    fn test_factory_returns_boxed_wrapper() {
        let (interceptor, calls, _, _) = setup();
        let factory: &dyn XhrFactory = &interceptor;

        let mut xhr = factory.create();
        xhr.open("GET", ENDPOINT).unwrap();
        assert_eq!(xhr.ready_state(), ReadyState::Opened);
        assert_eq!(calls.lock().len(), 1);
    }

    #[test]
    fn test_real_errors_propagate() {
        struct Failing;
        impl XhrFactory for Failing {
            fn create(&self) -> Box<dyn XmlHttpRequest> {
                Box::new(RejectingXhr(FakeXhr::default()))
            }
        }
        struct RejectingXhr(FakeXhr);
        impl XmlHttpRequest for RejectingXhr {
            fn open(&mut self, _: &str, _: &str) -> Result<()> {
                Err(Error::invalid_state("open", "rejected"))
            }
            fn set_request_header(&mut self, n: &str, v: &str) -> Result<()> {
                self.0.set_request_header(n, v)
            }
            fn send(&mut self, _: Option<Body>) -> Result<()> {
                Err(Error::invalid_state("send", "rejected"))
            }
            fn abort(&mut self) {}
            fn ready_state(&self) -> ReadyState {
                self.0.ready_state()
            }
            fn status(&self) -> u16 {
                0
            }
            fn status_text(&self) -> String {
                String::new()
            }
            fn response_text(&self) -> String {
                String::new()
            }
            fn response(&self) -> Bytes {
                Bytes::new()
            }
            fn response_header(&self, _: &str) -> Option<String> {
                None
            }
            fn all_response_headers(&self) -> String {
                String::new()
            }
            fn add_event_listener(&mut self, k: EventKind, l: EventListener) {
                self.0.add_event_listener(k, l)
            }
            fn remove_event_listener(&mut self, k: EventKind, l: &EventListener) {
                self.0.remove_event_listener(k, l)
            }
            fn set_event_handler(&mut self, k: EventKind, h: Option<EventListener>) {
                self.0.set_event_handler(k, h)
            }
            fn listeners(&self, k: EventKind) -> Vec<EventListener> {
                self.0.listeners(k)
            }
        }

        let interceptor =
            XhrInterceptor::new(Arc::new(Failing), &FilterConfig::new(ENDPOINT), EventLoop::new());
        let mut xhr = interceptor.create_intercepted();

        assert!(xhr.open("POST", ENDPOINT).is_err());
        assert!(xhr.send(Some(Body::from("{}"))).is_err());
    }
}
