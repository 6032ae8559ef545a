// SPDX-FileCopyrightText: 2026 Freeloader Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Freeloader integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a running proxy.
//!
//! # Components
//!
//! - [`MockBackend`] - scripted completion backend with a call log
//! - [`StaticCatalog`] - in-memory model catalog
//! - [`RecordingUsageLog`] - usage log that keeps every record
//! - [`TestHarness`] - a full router over a temp SQLite database

pub mod fixtures;
pub mod harness;
pub mod mock_backend;

pub use fixtures::{RecordingUsageLog, StaticCatalog, test_model};
pub use harness::TestHarness;
pub use mock_backend::{MockBackend, MockReply};
