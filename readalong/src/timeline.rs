//! What the playback side needs from a plan: one visual fetch per scene and
//! timed subtitle cues.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;

use crate::plan::{DisplayStyle, Pace, ScenePlan, SemanticLabel, VisualType};
use crate::text::word_count;

const DEFAULT_WORDS_PER_SECOND: f64 = 2.5;
const DEFAULT_MIN_DISPLAY_SECS: f64 = 1.2;

/// A run of chunks sharing one visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGroup {
    pub scene_id: u32,
    /// Chunk indices covered by this scene
    pub chunks: Range<usize>,
    pub semantic_label: SemanticLabel,
    pub display_style: DisplayStyle,
    pub visual_type: Option<VisualType>,
    pub visual_queries: Vec<String>,
}

impl SceneGroup {
    /// Whether a visual has to be fetched for this scene.
    pub fn needs_visual(&self) -> bool {
        self.display_style == DisplayStyle::Visual && !self.visual_queries.is_empty()
    }
}

/// Collapse consecutive plans with the same scene id. Visual directives come
/// from the scene's first chunk.
pub fn group_scenes(plans: &[ScenePlan]) -> Vec<SceneGroup> {
    let mut groups: Vec<SceneGroup> = Vec::new();

    for plan in plans {
        match groups.last_mut() {
            Some(group) if group.scene_id == plan.scene_id => {
                group.chunks.end = plan.index + 1;
            }
            _ => groups.push(SceneGroup {
                scene_id: plan.scene_id,
                chunks: plan.index..plan.index + 1,
                semantic_label: plan.semantic_label,
                display_style: plan.display_style,
                visual_type: plan.visual_type,
                visual_queries: plan.visual_queries.clone(),
            }),
        }
    }

    groups
}

/// Reading-speed model for subtitle display time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTiming {
    #[serde(default = "default_words_per_second")]
    pub words_per_second: f64,

    #[serde(default = "default_min_display_secs")]
    pub min_display_secs: f64,
}

fn default_words_per_second() -> f64 {
    DEFAULT_WORDS_PER_SECOND
}

fn default_min_display_secs() -> f64 {
    DEFAULT_MIN_DISPLAY_SECS
}

impl Default for SubtitleTiming {
    fn default() -> Self {
        Self {
            words_per_second: DEFAULT_WORDS_PER_SECOND,
            min_display_secs: DEFAULT_MIN_DISPLAY_SECS,
        }
    }
}

impl SubtitleTiming {
    /// How long `text` stays on screen at `pace`.
    ///
    /// Non-finite or negative settings fall back to the defaults.
    pub fn display_duration(&self, text: &str, pace: Pace) -> Duration {
        let rate = finite_or(self.words_per_second, DEFAULT_WORDS_PER_SECOND).max(0.1);
        let floor = finite_or(self.min_display_secs, DEFAULT_MIN_DISPLAY_SECS);
        let secs = word_count(text) as f64 / rate * pace_factor(pace);
        Duration::try_from_secs_f64(secs.max(floor))
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_MIN_DISPLAY_SECS))
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        default
    }
}

fn pace_factor(pace: Pace) -> f64 {
    match pace {
        Pace::Slow => 1.3,
        Pace::Normal => 1.0,
        Pace::Fast => 0.8,
    }
}

/// One subtitle line on the playback timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleCue {
    pub index: usize,
    #[serde(with = "secs")]
    pub start: Duration,
    #[serde(with = "secs")]
    pub end: Duration,
    pub text: String,
}

/// Lay the chunks end to end.
pub fn build_cues(plans: &[ScenePlan], timing: &SubtitleTiming) -> Vec<SubtitleCue> {
    let mut cursor = Duration::ZERO;

    plans
        .iter()
        .map(|plan| {
            let start = cursor;
            cursor += timing.display_duration(&plan.chunk_text, plan.pace);
            SubtitleCue {
                index: plan.index,
                start,
                end: cursor,
                text: plan.chunk_text.clone(),
            }
        })
        .collect()
}

mod secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64((d.as_secs_f64() * 1000.0).round() / 1000.0)
    }
}
