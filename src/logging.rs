// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Logging setup for hosts without their own subscriber

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Default filter directive when `RUST_LOG` is unset
pub const DEFAULT_DIRECTIVE: &str = "opblock=info";

/// Install a fmt subscriber filtered by `RUST_LOG`
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::config(format!("tracing subscriber: {}", e)))
}
