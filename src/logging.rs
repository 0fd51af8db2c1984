// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup shared by the CLI and the system tests.

use crate::config::Environment;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Where formatted events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Plain stdout, for the CLI
    Stdout,
    /// The libtest capture, so output shows up next to the failing test
    TestHarness,
}

/// Install the global fmt subscriber for the CLI.
///
/// `TEST_LOG_LEVEL` wins over `RUST_LOG`, `info` is used when neither is set.
pub fn init(environment: &Environment) {
    install(environment, LogTarget::Stdout);
}

/// Same as [`init`], writing through the test harness capture
pub fn init_for_tests(environment: &Environment) {
    install(environment, LogTarget::TestHarness);
}

/// Returns false when a subscriber was already installed; the first one is kept.
pub fn install(environment: &Environment, target: LogTarget) -> bool {
    let builder =
        tracing_subscriber::fmt().with_env_filter(build_filter(environment.log_level.as_deref()));
    let installed = match target {
        LogTarget::Stdout => builder.try_init(),
        LogTarget::TestHarness => builder.with_test_writer().try_init(),
    };
    if installed.is_err() {
        debug!("Tracing subscriber already installed");
        return false;
    }
    true
}

fn build_filter(log_level: Option<&str>) -> EnvFilter {
    match log_level {
        Some(level) => EnvFilter::try_new(level.to_ascii_lowercase())
            .unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}
