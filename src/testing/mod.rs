//! Testing infrastructure for claude-loop.
//!
//! This module provides mocks and fixtures for testing the decision core
//! without a network connection or a git repository.
//!
//! # Architecture
//!
//! The testing infrastructure is organized into:
//! - **Mocks**: Test doubles for [`AnalysisClient`](crate::analysis::client::AnalysisClient)
//!   and [`ChangeSource`](crate::changes::ChangeSource) with controllable behavior
//! - **Fixtures**: Sample state documents (test-only)
//!
//! # Example
//!
//! ```rust,ignore
//! use claude_loop::testing::{MockAnalysisClient, MockChangeSource};
//!
//! let client = MockAnalysisClient::new().with_response("{}");
//! let changes = MockChangeSource::new(" src/lib.rs | 2 +-");
//! ```

#[cfg(test)]
pub mod fixtures;
pub mod mocks;

// Re-export commonly used types
#[cfg(test)]
pub use fixtures::*;
pub use mocks::*;
