//! Pipeline Configuration Module
//!
//! Classifier thresholds and collaborator settings loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `ROAD_VISION_CONFIG` environment variable (path to TOML file)
//! 2. `road_vision.toml` in the current working directory
//! 3. Built-in defaults (see `defaults`)
//!
//! There is no global config: `Classifier::from_config` copies the
//! thresholds it needs.

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;
