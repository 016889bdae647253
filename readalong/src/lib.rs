//! readalong - turn pasted prose into narrated chunks grouped into
//! illustrated scenes.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod text;
pub mod timeline;

pub use config::ReadalongConfig;
pub use error::{OracleRejection, PlanError};
pub use pipeline::{Pipeline, PlannedParagraph};
pub use plan::{ScenePlan, ScenePlanner};
pub use text::{Chunk, Paragraph};
pub use timeline::{SceneGroup, SubtitleCue, SubtitleTiming, build_cues, group_scenes};
