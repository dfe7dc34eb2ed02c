// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request body representation

use bytes::Bytes;
use serde_json::Value;

use crate::error::{Error, Result};

/// Request body as handed over by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Text body, sent as-is
    Text(String),
    /// Raw bytes
    Bytes(Bytes),
    /// Structured body, serialized as JSON when sent
    Json(Value),
}

impl Body {
    /// Check if the body carries no payload
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Text(text) => text.is_empty(),
            Body::Bytes(bytes) => bytes.is_empty(),
            Body::Json(value) => value.is_null(),
        }
    }

    /// Body as text for inspection only
    ///
    /// Raw bytes must be valid UTF-8.
    pub fn inspect_text(&self) -> Result<String> {
        match self {
            Body::Text(text) => Ok(text.clone()),
            Body::Bytes(bytes) => std::str::from_utf8(bytes)
                .map(String::from)
                .map_err(|e| Error::extraction(format!("body is not valid UTF-8: {}", e))),
            Body::Json(value) => Ok(serde_json::to_string(value)?),
        }
    }

    /// Wire bytes
    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Body::Text(text) => Ok(Bytes::from(text.clone())),
            Body::Bytes(bytes) => Ok(bytes.clone()),
            Body::Json(value) => Ok(Bytes::from(serde_json::to_vec(value)?)),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}
