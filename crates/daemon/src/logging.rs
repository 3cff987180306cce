// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup for hosts embedding the runtime.

/// Initializes a `tracing-subscriber` formatter honoring `RUST_LOG`,
/// defaulting to `info` when unset.
pub fn init() {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();
}
