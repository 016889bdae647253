//! Oracle request construction and reply extraction.

use llm_client::LlmRequest;
use serde_json::Value;

use super::types::SemanticLabel;
use crate::error::OracleRejection;
use crate::text::Chunk;

const SYSTEM_PROMPT: &str = r#"You plan visuals for a narrated reading app. The text has already been split into numbered chunks that are read aloud one after another. For every chunk decide whether it continues the current visual scene or starts a new one, and describe how it should be shown.

Rules:
- Return exactly one object per chunk, in index order. Never merge, split, skip or rewrite chunks.
- Group consecutive chunks about the same idea, image or moment into one scene. Start a new scene only when the subject, setting or tone clearly shifts.
- sceneId starts at 1 and only ever increases by 1 when a new scene starts. The first chunk always starts scene 1.
- isNewScene is true exactly when the chunk starts a scene.
- semanticLabel must be one of: {labels}.
- visualChangeConfidence is a number from 0 to 1: 0.7-1.0 for a clear change of scene, 0.4-0.6 for a shift in emphasis, 0.0-0.3 when the visual should stay.
- displayStyle is "visual" when a picture helps, "text_only" for abstract or connective text.
- visualType is "gif" for actions, reactions and emotions, "image" for places, objects and people; null when displayStyle is "text_only".
- visualQueries holds 1-3 short search phrases (2-4 words each) for the scene visual, only on chunks that start a visual scene; otherwise [].
- pace is "slow" for dramatic or emotional text, "fast" for light or listy text, otherwise "normal".

Respond with a JSON array only, no commentary. Each element looks like:
{"sceneId": 1, "isNewScene": true, "semanticLabel": "describing", "visualChangeConfidence": 0.9, "displayStyle": "visual", "visualType": "image", "visualQueries": ["foggy harbor dawn"], "pace": "normal"}"#;

const TOKENS_PER_CHUNK: u32 = 120;
const MAX_TOKENS: u32 = 8192;

pub fn system_prompt() -> String {
    let labels = SemanticLabel::ALL
        .iter()
        .map(SemanticLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    SYSTEM_PROMPT.replace("{labels}", &labels)
}

pub fn user_prompt(chunks: &[Chunk]) -> String {
    let mut prompt = format!(
        "Plan these {} chunks. Return a JSON array of exactly {} objects.\n\n",
        chunks.len(),
        chunks.len()
    );
    for chunk in chunks {
        prompt.push_str(&format!("[{}] {}\n", chunk.index, chunk.text));
    }
    prompt
}

/// Build the single oracle request for a paragraph's chunks.
pub fn build_request(chunks: &[Chunk]) -> LlmRequest {
    let max_tokens = (chunks.len() as u32)
        .saturating_mul(TOKENS_PER_CHUNK)
        .saturating_add(256)
        .min(MAX_TOKENS);

    LlmRequest::new(user_prompt(chunks))
        .with_system(system_prompt())
        .with_max_tokens(max_tokens)
        .with_temperature(0.2)
}

/// Pull the per-chunk array out of an oracle reply.
///
/// Accepts bare JSON, JSON inside a Markdown code fence, or an array
/// embedded in surrounding prose. Anything else is rejected whole.
pub fn parse_oracle_response(
    content: &str,
    expected: usize,
) -> Result<Vec<Value>, OracleRejection> {
    let body = strip_code_fence(content);

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(err) => match embedded_array(body) {
            Some(value) => value,
            None => return Err(OracleRejection::NotJson(err.to_string())),
        },
    };

    let Value::Array(items) = value else {
        return Err(OracleRejection::NotArray);
    };

    if items.len() != expected {
        return Err(OracleRejection::LengthMismatch {
            expected,
            got: items.len(),
        });
    }

    Ok(items)
}

/// Contents of the first fenced block, or the trimmed input.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[open + 3..];
    // skip the info string (```json)
    let body_start = after_open.find('\n').map_or(0, |p| p + 1);
    let body = &after_open[body_start..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn embedded_array(text: &str) -> Option<Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .filter(Value::is_array)
}
