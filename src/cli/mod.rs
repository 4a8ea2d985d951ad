pub mod output;
pub mod plan;
pub mod runtime;

pub use plan::{cmd_plan, cmd_validate, ManifestArgs};
