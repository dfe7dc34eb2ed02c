// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Synthetic "successful no-op" GraphQL response

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code of a synthetic response
pub const SYNTHETIC_STATUS: u16 = 200;

/// Content type of a synthetic response
pub const SYNTHETIC_CONTENT_TYPE: &str = "application/json";

/// Body substituted for a blocked call: `{"data":null,"errors":[]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntheticResponse {
    pub data: Option<Value>,
    pub errors: Vec<Value>,
}

impl SyntheticResponse {
    /// Serialized body text
    pub fn body() -> String {
        // Serializing a null and an empty array cannot fail
        serde_json::to_string(&Self::default())
            .unwrap_or_else(|_| r#"{"data":null,"errors":[]}"#.to_string())
    }
}
