// SPDX-FileCopyrightText: 2026 Stoa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Stoa integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockGenerator`] - Mock generation service with queued outcomes
//! - [`MockJournal`] - In-memory journal store with failure injection
//! - [`MockIdentity`] - In-memory identity provider with session broadcast
//! - [`TestHarness`] - Real SQLite journal + mock generator + reflection service

pub mod harness;
pub mod mock_generator;
pub mod mock_identity;
pub mod mock_journal;

pub use harness::TestHarness;
pub use mock_generator::MockGenerator;
pub use mock_identity::MockIdentity;
pub use mock_journal::{MockJournal, RecordCall};
