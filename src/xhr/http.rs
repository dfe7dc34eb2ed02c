// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! reqwest-backed XHR object
//!
//! Network I/O runs on tokio; completion is posted back to the
//! [`EventLoop`] so listeners only ever run while the host drives the loop.

use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use super::events::{dispatch, EventKind, EventListener, EventListeners, XhrEvent};
use super::{ReadyState, XhrFactory, XmlHttpRequest};
use crate::error::{Error, Result};
use crate::http::{Body, HttpClient, Request, Response};
use crate::scheduler::EventLoop;

/// Mutable request state shared with the in-flight I/O task
#[derive(Debug)]
struct XhrState {
    ready_state: ReadyState,
    method: Method,
    url: Option<Url>,
    request_headers: HeaderMap,
    send_flag: bool,
    /// Bumped by open/abort so stale completions are ignored
    generation: u64,
    status: u16,
    status_text: String,
    response_headers: HeaderMap,
    response_body: Bytes,
    listeners: EventListeners,
}

impl XhrState {
    fn new() -> Self {
        Self {
            ready_state: ReadyState::Unsent,
            method: Method::GET,
            url: None,
            request_headers: HeaderMap::new(),
            send_flag: false,
            generation: 0,
            status: 0,
            status_text: String::new(),
            response_headers: HeaderMap::new(),
            response_body: Bytes::new(),
            listeners: EventListeners::new(),
        }
    }

    fn reset_response(&mut self) {
        self.status = 0;
        self.status_text.clear();
        self.response_headers.clear();
        self.response_body = Bytes::new();
    }

    fn event(&self, kind: EventKind) -> XhrEvent {
        XhrEvent {
            kind,
            ready_state: self.ready_state,
            status: self.status,
        }
    }
}

/// Real XHR object performing requests through [`HttpClient`]
pub struct HttpXhr {
    state: Arc<Mutex<XhrState>>,
    client: HttpClient,
    event_loop: EventLoop,
}

impl HttpXhr {
    /// Create a request object
    pub fn new(client: HttpClient, event_loop: EventLoop) -> Self {
        Self {
            state: Arc::new(Mutex::new(XhrState::new())),
            client,
            event_loop,
        }
    }

    fn build_request(state: &XhrState, body: Option<Body>) -> Result<Request> {
        let url = state
            .url
            .as_ref()
            .ok_or_else(|| Error::invalid_state("send", "no URL"))?;

        let mut request = Request::new(state.method.clone(), url.as_str())?;
        request.headers = state.request_headers.clone();
        if state.method != Method::GET && state.method != Method::HEAD {
            request.body = body.filter(|b| !b.is_empty());
        }
        Ok(request)
    }
}

/// Fire events in order without holding the state lock during callbacks
fn fire(state: &Mutex<XhrState>, kinds: &[EventKind]) {
    for kind in kinds {
        let (listeners, event) = {
            let state = state.lock();
            (state.listeners.for_kind(*kind), state.event(*kind))
        };
        dispatch(&listeners, &event);
    }
}

fn complete(state: &Mutex<XhrState>, generation: u64, result: Result<Response>) {
    {
        let mut s = state.lock();
        if s.generation != generation {
            return;
        }
        s.send_flag = false;
        match result {
            Ok(ref response) => {
                s.status = response.status_code();
                s.status_text = response
                    .status
                    .canonical_reason()
                    .unwrap_or("")
                    .to_string();
                s.response_headers = response.headers.clone();
                s.ready_state = ReadyState::HeadersReceived;
            }
            Err(ref e) => {
                tracing::debug!(error = %e, "XHR request failed");
                s.reset_response();
                s.ready_state = ReadyState::Done;
            }
        }
    }

    let response = match result {
        Ok(response) => response,
        Err(_) => {
            fire(
                state,
                &[EventKind::ReadyStateChange, EventKind::Error, EventKind::LoadEnd],
            );
            return;
        }
    };

    fire(state, &[EventKind::ReadyStateChange]);

    state.lock().ready_state = ReadyState::Loading;
    fire(state, &[EventKind::ReadyStateChange]);

    {
        let mut s = state.lock();
        s.response_body = response.body;
        s.ready_state = ReadyState::Done;
    }
    fire(
        state,
        &[EventKind::ReadyStateChange, EventKind::Load, EventKind::LoadEnd],
    );
}

impl XmlHttpRequest for HttpXhr {
    fn open(&mut self, method: &str, url: &str) -> Result<()> {
        let method = Method::from_str(&method.to_ascii_uppercase())
            .map_err(|e| Error::other(format!("Invalid method '{}': {}", method, e)))?;
        let url = Url::parse(url)?;

        {
            let mut s = self.state.lock();
            s.generation += 1;
            s.method = method;
            s.url = Some(url);
            s.request_headers.clear();
            s.send_flag = false;
            s.reset_response();
            s.ready_state = ReadyState::Opened;
        }

        fire(&self.state, &[EventKind::ReadyStateChange]);
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) -> Result<()> {
        let mut s = self.state.lock();
        if s.ready_state != ReadyState::Opened || s.send_flag {
            return Err(Error::invalid_state(
                "setRequestHeader",
                format!("{:?}", s.ready_state),
            ));
        }

        let name = HeaderName::try_from(name)
            .map_err(|e| Error::other(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| Error::other(format!("Invalid header value: {}", e)))?;
        s.request_headers.append(name, value);
        Ok(())
    }

    fn send(&mut self, body: Option<Body>) -> Result<()> {
        let (request, generation) = {
            let mut s = self.state.lock();
            if s.ready_state != ReadyState::Opened || s.send_flag {
                return Err(Error::invalid_state("send", format!("{:?}", s.ready_state)));
            }
            let request = Self::build_request(&s, body)?;
            s.send_flag = true;
            (request, s.generation)
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                self.state.lock().send_flag = false;
                return Err(Error::invalid_state("send", "no tokio runtime"));
            }
        };

        fire(&self.state, &[EventKind::LoadStart]);

        let guard = self.event_loop.hold_io();
        let client = self.client.clone();
        let event_loop = self.event_loop.clone();
        let state = self.state.clone();
        runtime.spawn(async move {
            let result = client.execute(request).await;
            event_loop.post(move || complete(&state, generation, result));
            drop(guard);
        });

        Ok(())
    }

    fn abort(&mut self) {
        let in_flight = {
            let mut s = self.state.lock();
            s.generation += 1;
            let in_flight = s.send_flag;
            s.send_flag = false;
            s.reset_response();
            if in_flight {
                s.ready_state = ReadyState::Done;
            }
            in_flight
        };

        if in_flight {
            fire(
                &self.state,
                &[EventKind::ReadyStateChange, EventKind::Abort, EventKind::LoadEnd],
            );
        }
        self.state.lock().ready_state = ReadyState::Unsent;
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready_state
    }

    fn status(&self) -> u16 {
        self.state.lock().status
    }

    fn status_text(&self) -> String {
        self.state.lock().status_text.clone()
    }

    fn response_text(&self) -> String {
        let s = self.state.lock();
        if s.ready_state < ReadyState::Loading {
            return String::new();
        }
        String::from_utf8_lossy(&s.response_body).into_owned()
    }

    fn response(&self) -> Bytes {
        self.state.lock().response_body.clone()
    }

    fn response_header(&self, name: &str) -> Option<String> {
        let s = self.state.lock();
        let values: Vec<&str> = s
            .response_headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    fn all_response_headers(&self) -> String {
        let s = self.state.lock();
        s.response_headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| format!("{}: {}\r\n", name.as_str(), v))
            })
            .collect()
    }

    fn add_event_listener(&mut self, kind: EventKind, listener: EventListener) {
        self.state.lock().listeners.add(kind, listener);
    }

    fn remove_event_listener(&mut self, kind: EventKind, listener: &EventListener) {
        self.state.lock().listeners.remove(kind, listener);
    }

    fn set_event_handler(&mut self, kind: EventKind, handler: Option<EventListener>) {
        self.state.lock().listeners.set_handler(kind, handler);
    }

    fn listeners(&self, kind: EventKind) -> Vec<EventListener> {
        self.state.lock().listeners.for_kind(kind)
    }
}

/// Constructor for [`HttpXhr`] objects sharing one client and event loop
#[derive(Clone)]
pub struct HttpXhrFactory {
    client: HttpClient,
    event_loop: EventLoop,
}

impl HttpXhrFactory {
    /// Create a factory
    pub fn new(client: HttpClient, event_loop: EventLoop) -> Self {
        Self { client, event_loop }
    }
}

impl XhrFactory for HttpXhrFactory {
    fn create(&self) -> Box<dyn XmlHttpRequest> {
        Box::new(HttpXhr::new(self.client.clone(), self.event_loop.clone()))
    }
}
