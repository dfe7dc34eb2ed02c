// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Filter configuration: target endpoint and blocked operation set

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorContext, Result};

/// Default GraphQL endpoint the filter watches
pub const DEFAULT_TARGET_ENDPOINT: &str = "https://web.prod.cloud.netflix.com/graphql";

/// Operations blocked out of the box
pub const DEFAULT_BLOCKED_OPERATIONS: &[&str] = &[
    "CLCSInterstitialPlaybackAndPostPlayback",
    "CLCSInterstitialLolomo",
];

/// URL prefix that puts a request in scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetEndpoint(String);

impl TargetEndpoint {
    /// Create a new target endpoint
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    /// Check whether a URL is in scope
    pub fn contains(&self, url: &str) -> bool {
        !self.0.is_empty() && url.starts_with(&self.0)
    }

    /// Get the prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TargetEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_ENDPOINT)
    }
}

/// Immutable set of blocked operation names
///
/// Keeps the configured order so fallback matches are reported
/// deterministically. Cloning shares the underlying storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct BlockedOperationSet {
    names: Arc<[String]>,
}

impl BlockedOperationSet {
    /// Create a set from operation names, dropping duplicates
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique.into(),
        }
    }

    /// Check membership
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Iterate names in configured order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of blocked operations
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for BlockedOperationSet {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_OPERATIONS.iter().copied())
    }
}

impl From<Vec<String>> for BlockedOperationSet {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<BlockedOperationSet> for Vec<String> {
    fn from(set: BlockedOperationSet) -> Self {
        set.names.to_vec()
    }
}

/// Filter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Endpoint prefix
    #[serde(default)]
    pub target_endpoint: TargetEndpoint,
    /// Blocked operation names
    #[serde(default)]
    pub blocked_operations: BlockedOperationSet,
}

impl FilterConfig {
    /// Create a config with the given endpoint and no blocked operations
    pub fn new(target_endpoint: impl Into<String>) -> Self {
        Self {
            target_endpoint: TargetEndpoint::new(target_endpoint),
            blocked_operations: BlockedOperationSet::new(Vec::<String>::new()),
        }
    }

    /// Set the target endpoint
    pub fn target_endpoint(mut self, prefix: impl Into<String>) -> Self {
        self.target_endpoint = TargetEndpoint::new(prefix);
        self
    }

    /// Replace the blocked operation set
    pub fn blocked_operations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_operations = BlockedOperationSet::new(names);
        self
    }

    /// Add one blocked operation
    pub fn block(mut self, name: impl Into<String>) -> Self {
        let mut names: Vec<String> = self.blocked_operations.into();
        names.push(name.into());
        self.blocked_operations = BlockedOperationSet::new(names);
        self
    }

    /// Parse a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(&format!("reading {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if self.target_endpoint.as_str().is_empty() {
            return Err(Error::config("target endpoint must not be empty"));
        }
        if self.blocked_operations.iter().any(|name| name.is_empty()) {
            return Err(Error::config("blocked operation names must not be empty"));
        }
        Ok(())
    }
}
