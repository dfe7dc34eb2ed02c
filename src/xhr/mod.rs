// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! XHR-style request objects
//!
//! A stateful request is configured with `open`, triggered with `send`, and
//! completes later through event listeners. [`XmlHttpRequest`] lists the
//! whole surface a host can use, so wrappers can pass every member through
//! explicitly.

mod events;
mod http;
mod interceptor;

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;
use crate::http::Body;

pub use events::{dispatch, EventKind, EventListener, EventListeners, XhrEvent};
pub use http::{HttpXhr, HttpXhrFactory};
pub use interceptor::{InterceptedXhr, XhrInterceptor};

/// XHR ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ReadyState {
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

impl ReadyState {
    /// Numeric value as exposed by `readyState`
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Stateful request object
pub trait XmlHttpRequest: Send {
    /// Configure method and URL
    fn open(&mut self, method: &str, url: &str) -> Result<()>;

    /// Add a request header; only valid between `open` and `send`
    fn set_request_header(&mut self, name: &str, value: &str) -> Result<()>;

    /// Start the request; completion is reported through events
    fn send(&mut self, body: Option<Body>) -> Result<()>;

    /// Cancel an in-flight request
    fn abort(&mut self);

    fn ready_state(&self) -> ReadyState;

    fn status(&self) -> u16;

    fn status_text(&self) -> String;

    fn response_text(&self) -> String;

    fn response(&self) -> Bytes;

    fn response_header(&self, name: &str) -> Option<String>;

    /// All response headers, one `name: value\r\n` line each
    fn all_response_headers(&self) -> String;

    fn add_event_listener(&mut self, kind: EventKind, listener: EventListener);

    fn remove_event_listener(&mut self, kind: EventKind, listener: &EventListener);

    /// Set or clear the `on<event>` handler property
    fn set_event_handler(&mut self, kind: EventKind, handler: Option<EventListener>);

    /// Callbacks an event of this kind would reach, in invocation order
    fn listeners(&self, kind: EventKind) -> Vec<EventListener>;
}

/// Constructor for request objects
pub trait XhrFactory: Send + Sync {
    /// Create a fresh request object
    fn create(&self) -> Box<dyn XmlHttpRequest>;
}
