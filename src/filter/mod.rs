// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Operation filter
//!
//! Configuration, payload matching and the synthetic response shared by
//! both interceptors.

mod config;
mod matcher;
mod synthetic;

pub use config::{
    BlockedOperationSet, FilterConfig, TargetEndpoint, DEFAULT_BLOCKED_OPERATIONS,
    DEFAULT_TARGET_ENDPOINT,
};
pub use matcher::{InterceptionDecision, Matcher};
pub use synthetic::{SyntheticResponse, SYNTHETIC_CONTENT_TYPE, SYNTHETIC_STATUS};
