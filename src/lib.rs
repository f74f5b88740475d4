//! score-tree: hierarchical score model for optical music recognition.
//!
//! A recognized page is held as a typed tree (score, pages, systems, staves,
//! measures and their symbols). Four pre-order passes recompute derived
//! state, propagate highlights, paint the background layer and render the
//! foreground. All display coordinates go through a shared zoom transform.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;
pub mod zoom;

pub use api::{ScoreEngine, ScoreEngineConfig};
pub use error::{ScoreError, ScoreResult};
