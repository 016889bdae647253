//! Scene planning: group chunks into scenes and decide how each is shown.

pub mod planner;
pub mod prompt;
pub mod repair;
pub mod types;

pub use planner::{DEFAULT_ORACLE_TIMEOUT, ScenePlanner};
pub use repair::check_invariants;
pub use types::{DisplayStyle, Pace, ScenePlan, SemanticLabel, VisualType};
