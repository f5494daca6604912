//! claude-loop - decision core for iterative coding-agent loops
//!
//! Invoked once per loop iteration to read the persisted state document,
//! decide whether the last iteration made progress, and produce either an
//! AI-derived continuation directive or a deterministic fallback suggestion.
//!
//! # Architecture
//!
//! - [`state`] - Tolerant parser for the loop state document
//! - [`changes`] - Working-tree change summary (git, bounded by a timeout)
//! - [`idle`] - Multi-signal idle detection between two iterations
//! - [`analysis`] - One-shot AI analysis with validated response and fallback
//! - [`presets`] - Built-in and user presets, deterministic suggestion rotation
//! - [`commands`] - Command file generation from presets
//! - [`config`] - Configuration loading
//! - [`error`] - Custom error types
//! - [`testing`] - Mocks and fixtures
//!
//! # Example
//!
//! ```rust,ignore
//! use claude_loop::analysis::{client::detect_client, AnalysisOrchestrator};
//! use claude_loop::changes::GitChangeProbe;
//! use claude_loop::config::Config;
//!
//! let config = Config::load(None)?;
//! let orchestrator = AnalysisOrchestrator::new(detect_client(&config.analysis));
//! let document = std::fs::read_to_string(".claude/loop-state.md")?;
//! let report = orchestrator.report(&document, &GitChangeProbe::new(".")).await;
//!
//! if !report.ai_available {
//!     let presets = claude_loop::PresetTable::load(config.user_presets_path().as_deref());
//!     let next = claude_loop::presets::select(&presets, "generic", i64::from(report.state.iteration));
//!     println!("{}", next.suggestion);
//! }
//! ```

pub mod analysis;
pub mod changes;
pub mod commands;
pub mod config;
pub mod error;
pub mod idle;
pub mod presets;
pub mod state;
pub mod testing;

// Re-export commonly used types
pub use error::{LoopError, Result};

pub use analysis::{AnalysisOrchestrator, AnalysisReport, Directive, ProgressStatus};
pub use changes::{ChangeSource, GitChangeProbe, StaticChangeSource};
pub use commands::CommandBuilder;
pub use config::Config;
pub use idle::{evaluate, IdleSignals, IdleVerdict};
pub use presets::{Preset, PresetTable, SuggestionResult, SuggestionRotator};
pub use state::{Snapshot, SnapshotSummary};
