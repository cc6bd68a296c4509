//! Core type definitions for the detector service

mod config;
mod detection;

pub use config::DetectorConfig;
pub use detection::{AiSpan, Detection, Label};
