//! Offline coffee leaf scanner: a bundled image classifier behind a small
//! capture → classify → verdict pipeline, plus the per-screen state of the
//! journey that leads up to it.

pub mod config;
pub mod error;
pub mod interpreter;
pub mod journey;
pub mod pipeline;
pub mod resources;
pub mod session;
pub mod types;
pub mod ui;
pub mod voice;

pub use error::{ClassificationError, ResourceKind};
pub use types::{ClassificationResult, ImageSample, Prediction, Provenance, Verdict};
