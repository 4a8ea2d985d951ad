//! Routebind library
//!
//! Manifest loading and route planning behind the `routebind` binary.

pub mod manifest;
pub mod planner;

pub use manifest::{BindingManifest, ManifestError};
pub use planner::{plan, validate, PlanError, PlanReport, PlannedIntegration};
