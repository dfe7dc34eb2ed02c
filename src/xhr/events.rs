// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! XHR events and listener registry

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::ReadyState;

/// XHR event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    ReadyStateChange,
    LoadStart,
    Progress,
    Load,
    Error,
    Abort,
    Timeout,
    LoadEnd,
}

impl EventKind {
    /// DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::ReadyStateChange => "readystatechange",
            EventKind::LoadStart => "loadstart",
            EventKind::Progress => "progress",
            EventKind::Load => "load",
            EventKind::Error => "error",
            EventKind::Abort => "abort",
            EventKind::Timeout => "timeout",
            EventKind::LoadEnd => "loadend",
        }
    }

    /// Parse a DOM event name
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "readystatechange" => EventKind::ReadyStateChange,
            "loadstart" => EventKind::LoadStart,
            "progress" => EventKind::Progress,
            "load" => EventKind::Load,
            "error" => EventKind::Error,
            "abort" => EventKind::Abort,
            "timeout" => EventKind::Timeout,
            "loadend" => EventKind::LoadEnd,
            _ => return None,
        })
    }
}

/// Event delivered to listeners, with a snapshot of the request state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XhrEvent {
    pub kind: EventKind,
    pub ready_state: ReadyState,
    pub status: u16,
}

/// Event listener callback
pub type EventListener = Arc<dyn Fn(&XhrEvent) + Send + Sync>;

/// Listener registry backing `add_event_listener` and the `on<event>` handlers
#[derive(Default, Clone)]
pub struct EventListeners {
    listeners: HashMap<EventKind, Vec<EventListener>>,
    handlers: HashMap<EventKind, EventListener>,
}

impl EventListeners {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; registering the same listener twice is a no-op
    pub fn add(&mut self, kind: EventKind, listener: EventListener) {
        let entry = self.listeners.entry(kind).or_default();
        if !entry.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            entry.push(listener);
        }
    }

    /// Remove a previously registered listener
    pub fn remove(&mut self, kind: EventKind, listener: &EventListener) {
        if let Some(entry) = self.listeners.get_mut(&kind) {
            entry.retain(|l| !Arc::ptr_eq(l, listener));
        }
    }

    /// Set or clear the `on<event>` handler
    pub fn set_handler(&mut self, kind: EventKind, handler: Option<EventListener>) {
        match handler {
            Some(handler) => {
                self.handlers.insert(kind, handler);
            }
            None => {
                self.handlers.remove(&kind);
            }
        }
    }

    /// Callbacks to invoke for an event: the handler, then listeners in
    /// registration order
    pub fn for_kind(&self, kind: EventKind) -> Vec<EventListener> {
        self.handlers
            .get(&kind)
            .into_iter()
            .chain(self.listeners.get(&kind).into_iter().flatten())
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("listeners", &self.listeners.values().map(Vec::len).sum::<usize>())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Invoke callbacks for one event
pub fn dispatch(listeners: &[EventListener], event: &XhrEvent) {
    for listener in listeners {
        listener(event);
    }
}
