//! Field-level validation and scene consistency repair.
//!
//! Oracle output is treated as untyped JSON. Every field is checked on its
//! own and replaced by a default when it is missing or malformed, so one bad
//! field never costs the rest of the record. Scene ids are then made
//! consistent with `isNewScene` in a single left-to-right pass.

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::types::{DisplayStyle, Pace, ScenePlan, SemanticLabel, VisualType};
use crate::text::Chunk;
use crate::text::normalize::normalize_whitespace;

const MAX_QUERIES: usize = 3;
const QUERY_WORDS: usize = 5;

const NEW_SCENE_CONFIDENCE: f64 = 0.8;
const CONTINUED_SCENE_CONFIDENCE: f64 = 0.2;

/// What the forward pass carries from one chunk to the next.
#[derive(Debug, Default)]
struct SceneState {
    previous: Option<u32>,
    seen: HashSet<u32>,
}

/// Resolve one plan per chunk from optional oracle records.
///
/// `oracle` must hold one record per chunk when present; the planner
/// guarantees that before calling.
pub fn resolve_plans(chunks: &[Chunk], oracle: Option<&[Value]>) -> Vec<ScenePlan> {
    chunks
        .iter()
        .scan(SceneState::default(), |state, chunk| {
            let record = oracle
                .and_then(|items| items.get(chunk.index))
                .and_then(Value::as_object);
            Some(resolve_chunk(chunk, record, state))
        })
        .collect()
}

fn resolve_chunk(
    chunk: &Chunk,
    record: Option<&Map<String, Value>>,
    state: &mut SceneState,
) -> ScenePlan {
    let raw = RawFields::read(record);

    let (scene_id, is_new_scene) = match state.previous {
        None => (1, true),
        Some(previous) => {
            let scene_id = raw.scene_id.unwrap_or(previous);
            let is_new = raw
                .is_new_scene
                .unwrap_or_else(|| !state.seen.contains(&scene_id));
            repair_scene(previous, scene_id, is_new)
        }
    };

    state.previous = Some(scene_id);
    state.seen.insert(scene_id);

    let visual_change_confidence = raw.confidence.unwrap_or(if is_new_scene {
        NEW_SCENE_CONFIDENCE
    } else {
        CONTINUED_SCENE_CONFIDENCE
    });

    let display_style = raw.display_style.unwrap_or(DisplayStyle::Visual);
    let visual_type = match display_style {
        DisplayStyle::Visual => Some(raw.visual_type.unwrap_or(VisualType::Gif)),
        DisplayStyle::TextOnly => None,
    };

    let visual_queries = if is_new_scene && display_style == DisplayStyle::Visual {
        if raw.queries.is_empty() {
            vec![synthesize_query(&chunk.text)]
        } else {
            raw.queries
        }
    } else {
        Vec::new()
    };

    ScenePlan {
        index: chunk.index,
        chunk_text: chunk.text.clone(),
        scene_id,
        is_new_scene,
        semantic_label: raw.label.unwrap_or(SemanticLabel::Neutral),
        visual_change_confidence,
        display_style,
        visual_type,
        visual_queries,
        pace: raw.pace.unwrap_or(Pace::Normal),
    }
}

/// Make the scene id agree with the new-scene flag.
///
/// A new scene that does not move forward is bumped past the previous id;
/// this check runs first. When no id is left above the previous one the
/// chunk continues the previous scene. A continuing chunk with a different
/// id is pulled back onto the previous scene.
fn repair_scene(previous: u32, scene_id: u32, is_new: bool) -> (u32, bool) {
    if is_new && scene_id <= previous {
        match previous.checked_add(1) {
            Some(next) => (next, true),
            None => (previous, false),
        }
    } else if !is_new && scene_id != previous {
        (previous, false)
    } else {
        (scene_id, is_new)
    }
}

/// Oracle fields that passed type and range checks. `None` means "use the default".
#[derive(Debug, Default)]
struct RawFields {
    scene_id: Option<u32>,
    is_new_scene: Option<bool>,
    label: Option<SemanticLabel>,
    confidence: Option<f64>,
    display_style: Option<DisplayStyle>,
    visual_type: Option<VisualType>,
    queries: Vec<String>,
    pace: Option<Pace>,
}

impl RawFields {
    fn read(record: Option<&Map<String, Value>>) -> Self {
        let Some(record) = record else {
            return Self::default();
        };
        let get = |camel: &str, snake: &str| record.get(camel).or_else(|| record.get(snake));

        Self {
            scene_id: get("sceneId", "scene_id").and_then(positive_id),
            is_new_scene: get("isNewScene", "is_new_scene").and_then(Value::as_bool),
            label: get("semanticLabel", "semantic_label")
                .and_then(Value::as_str)
                .and_then(SemanticLabel::parse),
            confidence: get("visualChangeConfidence", "visual_change_confidence")
                .and_then(Value::as_f64)
                .filter(|c| (0.0..=1.0).contains(c)),
            display_style: get("displayStyle", "display_style")
                .and_then(Value::as_str)
                .map(|s| match s.trim().to_lowercase().as_str() {
                    "text_only" => DisplayStyle::TextOnly,
                    _ => DisplayStyle::Visual,
                }),
            visual_type: get("visualType", "visual_type")
                .and_then(Value::as_str)
                .and_then(|s| match s.trim().to_lowercase().as_str() {
                    "image" => Some(VisualType::Image),
                    "gif" => Some(VisualType::Gif),
                    _ => None,
                }),
            queries: get("visualQueries", "visual_queries")
                .and_then(Value::as_array)
                .map(|items| clean_queries(items))
                .unwrap_or_default(),
            pace: get("pace", "pace").and_then(Value::as_str).and_then(Pace::parse),
        }
    }
}

/// Positive integer, also accepting integral floats such as `2.0`.
fn positive_id(value: &Value) -> Option<u32> {
    let id = match value.as_u64() {
        Some(id) => id,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || f < 1.0 || f > u32::MAX as f64 {
                return None;
            }
            f as u64
        }
    };
    u32::try_from(id).ok().filter(|id| *id > 0)
}

fn clean_queries(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(normalize_whitespace)
        .filter(|q| !q.is_empty())
        .take(MAX_QUERIES)
        .collect()
}

/// First few words of the chunk, stripped of edge punctuation.
fn synthesize_query(text: &str) -> String {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .take(QUERY_WORDS)
        .collect();

    if words.is_empty() {
        text.split_whitespace().take(QUERY_WORDS).collect::<Vec<_>>().join(" ")
    } else {
        words.join(" ")
    }
}

/// List every broken plan-sequence invariant. Empty means the sequence is valid.
pub fn check_invariants(plans: &[ScenePlan]) -> Vec<String> {
    let mut problems = Vec::new();

    for (i, plan) in plans.iter().enumerate() {
        if plan.index != i {
            problems.push(format!("plan {i} has index {}", plan.index));
        }
        if plan.scene_id == 0 {
            problems.push(format!("plan {i} has scene id 0"));
        }

        let prev = if i == 0 { None } else { plans.get(i - 1) };
        match prev {
            None => {
                if plan.scene_id != 1 || !plan.is_new_scene {
                    problems.push("first plan must start scene 1".to_string());
                }
            }
            Some(prev) => {
                if plan.scene_id < prev.scene_id {
                    problems.push(format!("plan {i} scene id goes backwards"));
                }
                if plan.is_new_scene != (plan.scene_id != prev.scene_id) {
                    problems.push(format!("plan {i} new-scene flag disagrees with scene id"));
                }
            }
        }

        if (plan.display_style == DisplayStyle::TextOnly) != plan.visual_type.is_none() {
            problems.push(format!("plan {i} visual type does not match display style"));
        }
        if !(0.0..=1.0).contains(&plan.visual_change_confidence) {
            problems.push(format!("plan {i} confidence out of range"));
        }
        if !plan.is_new_scene && !plan.visual_queries.is_empty() {
            problems.push(format!("plan {i} continues a scene but has queries"));
        }
        if plan.is_new_scene && plan.is_visual() && plan.visual_queries.is_empty() {
            problems.push(format!("plan {i} starts a visual scene without queries"));
        }
        if plan.visual_queries.len() > MAX_QUERIES {
            problems.push(format!("plan {i} has too many queries"));
        }
    }

    problems
}
