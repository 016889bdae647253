//! Scene plan types shared by the planner and its consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a chunk is doing, rhetorically. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticLabel {
    Counting,
    Explaining,
    Arguing,
    Questioning,
    Emphasizing,
    Comparing,
    Listing,
    Storytelling,
    Describing,
    Concluding,
    Transitioning,
    EmotionalPositive,
    EmotionalNegative,
    Neutral,
    Dramatic,
    Humorous,
    Warning,
    Instructing,
}

impl SemanticLabel {
    pub const ALL: [SemanticLabel; 18] = [
        Self::Counting,
        Self::Explaining,
        Self::Arguing,
        Self::Questioning,
        Self::Emphasizing,
        Self::Comparing,
        Self::Listing,
        Self::Storytelling,
        Self::Describing,
        Self::Concluding,
        Self::Transitioning,
        Self::EmotionalPositive,
        Self::EmotionalNegative,
        Self::Neutral,
        Self::Dramatic,
        Self::Humorous,
        Self::Warning,
        Self::Instructing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counting => "counting",
            Self::Explaining => "explaining",
            Self::Arguing => "arguing",
            Self::Questioning => "questioning",
            Self::Emphasizing => "emphasizing",
            Self::Comparing => "comparing",
            Self::Listing => "listing",
            Self::Storytelling => "storytelling",
            Self::Describing => "describing",
            Self::Concluding => "concluding",
            Self::Transitioning => "transitioning",
            Self::EmotionalPositive => "emotional_positive",
            Self::EmotionalNegative => "emotional_negative",
            Self::Neutral => "neutral",
            Self::Dramatic => "dramatic",
            Self::Humorous => "humorous",
            Self::Warning => "warning",
            Self::Instructing => "instructing",
        }
    }

    /// Exact match after trimming and lowercasing.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|label| label.as_str() == s)
    }
}

impl fmt::Display for SemanticLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    Visual,
    TextOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualType {
    Gif,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Slow,
    Normal,
    Fast,
}

impl Pace {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "slow" => Some(Self::Slow),
            "normal" => Some(Self::Normal),
            "fast" => Some(Self::Fast),
            _ => None,
        }
    }
}

/// Visual and pacing directives for one chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePlan {
    /// Index of the chunk this plan belongs to
    pub index: usize,
    /// The chunk text, exactly as segmented
    pub chunk_text: String,
    /// Positive, non-decreasing; shared by every chunk of a scene
    pub scene_id: u32,
    /// True when this chunk starts a scene
    pub is_new_scene: bool,
    pub semantic_label: SemanticLabel,
    /// How strongly the visual should change here, in `[0, 1]`
    pub visual_change_confidence: f64,
    pub display_style: DisplayStyle,
    /// `None` exactly when the display style is text-only
    pub visual_type: Option<VisualType>,
    /// Search queries for the scene visual; only on a scene's first chunk
    pub visual_queries: Vec<String>,
    pub pace: Pace,
}

impl ScenePlan {
    pub fn is_visual(&self) -> bool {
        self.display_style == DisplayStyle::Visual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!(SemanticLabel::parse("neutral"), Some(SemanticLabel::Neutral));
        assert_eq!(
            SemanticLabel::parse(" Emotional_Positive "),
            Some(SemanticLabel::EmotionalPositive)
        );
        assert_eq!(SemanticLabel::parse("sarcastic"), None);
    }

    #[test]
    fn test_label_strings_match_serde() {
        for label in SemanticLabel::ALL {
            let json = serde_json::to_value(label).unwrap();
            assert_eq!(json, serde_json::Value::String(label.as_str().to_string()));
        }
    }

    #[test]
    fn test_pace_parse() {
        assert_eq!(Pace::parse("FAST"), Some(Pace::Fast));
        assert_eq!(Pace::parse("brisk"), None);
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let plan = ScenePlan {
            index: 0,
            chunk_text: "Hello there.".to_string(),
            scene_id: 1,
            is_new_scene: true,
            semantic_label: SemanticLabel::EmotionalNegative,
            visual_change_confidence: 0.8,
            display_style: DisplayStyle::TextOnly,
            visual_type: None,
            visual_queries: Vec::new(),
            pace: Pace::Slow,
        };

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["chunkText"], "Hello there.");
        assert_eq!(json["sceneId"], 1);
        assert_eq!(json["isNewScene"], true);
        assert_eq!(json["semanticLabel"], "emotional_negative");
        assert_eq!(json["displayStyle"], "text_only");
        assert!(json["visualType"].is_null());
        assert_eq!(json["pace"], "slow");
    }
}
