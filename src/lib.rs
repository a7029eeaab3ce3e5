//! Splice - Video Assembly Library
//!
//! Takes a batch of uploaded clips, stamps each with a running timestamp,
//! prepends an optional title card and concatenates everything into one MP4
//! inside a per-request workspace.
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (workspace, timestamp, av)
//! - ports/: Trait definitions (subprocess runner, storage)
//! - adapters/: Concrete implementations (process, fs, janitor, http)
//! - application/: The merge pipeline orchestrator
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use adapters::local::{FsAdapter, Janitor, ProcessRunner};
pub use application::orchestrator::{MergeOutput, OrchestratorService, PipelineSettings};
pub use config::LocalConfig;
pub use domain::error::{ErrorKind, PipelineError, PipelineResult};
pub use domain::jobs::{MergeRequest, Upload};
