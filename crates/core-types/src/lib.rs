//! Shared primitives for the routebind crates.
//!
//! Everything here is plain data: the stack environment ARNs are formatted
//! against, construct paths that give resources a stable identity, and the
//! principals that permission grants are issued to.

pub mod arn;
pub mod construct;
pub mod principal;

pub use arn::{format_arn, ArnComponents, ArnFormat, StackEnv};
pub use construct::{node_unique_id, ConstructPath};
pub use principal::ServicePrincipal;

use thiserror::Error;

/// Errors raised while building core primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid construct id '{0}': ids must be non-empty and must not contain '/'")]
    InvalidConstructId(String),
    #[error("unable to calculate a unique id for an empty set of components")]
    EmptyPath,
}
