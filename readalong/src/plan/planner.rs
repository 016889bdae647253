//! Hybrid scene planner: guaranteed chunking plus advisory oracle labels.

use llm_client::LlmProvider;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::prompt::{build_request, parse_oracle_response};
use super::repair::{check_invariants, resolve_plans};
use super::types::ScenePlan;
use crate::error::PlanError;
use crate::text::{Chunk, chunk_paragraph};

/// How long a single oracle call may take before defaults are used.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Plans scenes for one paragraph at a time.
///
/// Cheap to share: every call is independent, so one planner can serve
/// concurrent paragraphs.
#[derive(Clone)]
pub struct ScenePlanner {
    oracle: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
}

impl ScenePlanner {
    pub fn new(oracle: Arc<dyn LlmProvider>) -> Self {
        Self {
            oracle: Some(oracle),
            timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    /// A planner with no oracle; every plan comes from defaults.
    pub fn offline() -> Self {
        Self {
            oracle: None,
            timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Chunk `paragraph` and plan a scene for every chunk.
    ///
    /// Only empty input fails. Oracle timeouts, errors and malformed replies
    /// fall back to default plans.
    pub async fn plan(&self, paragraph: &str) -> Result<Vec<ScenePlan>, PlanError> {
        if paragraph.trim().is_empty() {
            return Err(PlanError::EmptyInput);
        }

        let chunks = chunk_paragraph(paragraph);
        self.plan_chunks(&chunks).await
    }

    /// Plan already-segmented chunks. Indices must run `0..chunks.len()`.
    pub async fn plan_chunks(&self, chunks: &[Chunk]) -> Result<Vec<ScenePlan>, PlanError> {
        if chunks.is_empty() {
            return Err(PlanError::NoChunksProduced);
        }

        let records = self.consult_oracle(chunks).await;
        let plans = resolve_plans(chunks, records.as_deref());

        let problems = check_invariants(&plans);
        if !problems.is_empty() {
            warn!("scene plan failed validation: {}", problems.join("; "));
        }

        Ok(plans)
    }

    /// One bounded oracle call. `None` means "use defaults for everything".
    async fn consult_oracle(&self, chunks: &[Chunk]) -> Option<Vec<Value>> {
        let oracle = self.oracle.as_ref()?;
        let request = build_request(chunks);

        debug!(
            "asking {} to label {} chunks (timeout {:?})",
            oracle.name(),
            chunks.len(),
            self.timeout
        );

        let response = match tokio::time::timeout(self.timeout, oracle.complete(request)).await {
            Err(_) => {
                warn!(
                    "{} did not answer within {:?}; using default scene plan",
                    oracle.name(),
                    self.timeout
                );
                return None;
            }
            Ok(Err(err)) => {
                warn!("{} failed: {}; using default scene plan", oracle.name(), err);
                return None;
            }
            Ok(Ok(response)) => response,
        };

        if let Some(usage) = &response.usage {
            debug!(
                "tokens: {} in, {} out",
                usage.input_tokens, usage.output_tokens
            );
        }

        match parse_oracle_response(&response.content, chunks.len()) {
            Ok(records) => Some(records),
            Err(rejection) => {
                warn!(
                    "discarding {} reply: {}; using default scene plan",
                    oracle.name(),
                    rejection
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::types::{DisplayStyle, Pace, SemanticLabel, VisualType};
    use llm_client::{MockProvider, MockStep};

    const TWO_SENTENCES: &str = "X is here. Y follows next.";

    fn planner(mock: MockProvider) -> (ScenePlanner, Arc<MockProvider>) {
        let mock = Arc::new(mock);
        (ScenePlanner::new(mock.clone()), mock)
    }

    fn assert_default_pair(plans: &[ScenePlan]) {
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].index, 0);
        assert_eq!(plans[0].scene_id, 1);
        assert!(plans[0].is_new_scene);
        assert_eq!(plans[1].index, 1);
        assert_eq!(plans[1].scene_id, 1);
        assert!(!plans[1].is_new_scene);
        for plan in plans {
            assert_eq!(plan.semantic_label, SemanticLabel::Neutral);
            assert_eq!(plan.display_style, DisplayStyle::Visual);
            assert_eq!(plan.visual_type, Some(VisualType::Gif));
            assert_eq!(plan.pace, Pace::Normal);
        }
        assert!(check_invariants(plans).is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_is_an_error() {
        let planner = ScenePlanner::offline();
        assert_eq!(planner.plan("").await, Err(PlanError::EmptyInput));
        assert_eq!(planner.plan("  \n\t ").await, Err(PlanError::EmptyInput));
    }

    #[tokio::test]
    async fn test_no_chunks_is_an_error() {
        let planner = ScenePlanner::offline();
        assert_eq!(planner.plan_chunks(&[]).await, Err(PlanError::NoChunksProduced));
    }

    #[tokio::test]
    async fn test_offline_planner_uses_defaults() {
        let plans = ScenePlanner::offline().plan(TWO_SENTENCES).await.unwrap();
        assert_default_pair(&plans);
        assert_eq!(plans[0].chunk_text, "X is here.");
        assert_eq!(plans[0].visual_queries, vec!["X is here"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_oracle_times_out_to_defaults() {
        let (planner, mock) = planner(MockProvider::hangs());
        let plans = planner.plan(TWO_SENTENCES).await.unwrap();
        assert_default_pair(&plans);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_oracle_past_timeout_is_ignored() {
        let reply = r#"[{"sceneId":1,"isNewScene":true,"semanticLabel":"dramatic"},
                        {"sceneId":2,"isNewScene":true,"semanticLabel":"dramatic"}]"#;
        let (planner, _) = planner(MockProvider::delayed(Duration::from_secs(31), reply));
        let plans = planner.plan(TWO_SENTENCES).await.unwrap();
        assert_default_pair(&plans);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout() {
        let reply = r#"[{"semanticLabel":"dramatic"},{"semanticLabel":"dramatic"}]"#;
        let (planner, _) = planner(MockProvider::delayed(Duration::from_secs(5), reply));
        let planner = planner.with_timeout(Duration::from_secs(10));
        let plans = planner.plan(TWO_SENTENCES).await.unwrap();
        assert_eq!(plans[1].semantic_label, SemanticLabel::Dramatic);
    }

    #[tokio::test]
    async fn test_failing_oracle_uses_defaults_without_retry() {
        let (planner, mock) = planner(MockProvider::fails(503, "overloaded"));
        let plans = planner.plan(TWO_SENTENCES).await.unwrap();
        assert_default_pair(&plans);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_replies_use_defaults() {
        for reply in [
            "not json at all",
            r#"{"sceneId": 1}"#,
            r#"[{"sceneId": 1}]"#,
            r#"[{}, {}, {}]"#,
        ] {
            let (planner, _) = planner(MockProvider::responds(reply));
            let plans = planner.plan(TWO_SENTENCES).await.unwrap();
            assert_default_pair(&plans);
        }
    }

    #[tokio::test]
    async fn test_valid_fenced_reply_is_used() {
        let reply = "```json\n[\n\
            {\"sceneId\":1,\"isNewScene\":true,\"semanticLabel\":\"describing\",\"visualChangeConfidence\":0.9,\
             \"displayStyle\":\"visual\",\"visualType\":\"image\",\"visualQueries\":[\"letter x\"],\"pace\":\"slow\"},\n\
            {\"sceneId\":2,\"isNewScene\":true,\"semanticLabel\":\"transitioning\",\"visualChangeConfidence\":0.75,\
             \"displayStyle\":\"text_only\",\"visualType\":null,\"visualQueries\":[],\"pace\":\"fast\"}\n]\n```";
        let (planner, mock) = planner(MockProvider::responds(reply));

        let plans = planner.plan(TWO_SENTENCES).await.unwrap();

        assert_eq!(plans[0].visual_type, Some(VisualType::Image));
        assert_eq!(plans[0].visual_queries, vec!["letter x"]);
        assert_eq!(plans[0].pace, Pace::Slow);
        assert_eq!(plans[1].scene_id, 2);
        assert_eq!(plans[1].semantic_label, SemanticLabel::Transitioning);
        assert_eq!(plans[1].display_style, DisplayStyle::TextOnly);
        assert_eq!(plans[1].visual_type, None);
        assert!(check_invariants(&plans).is_empty());

        let request = mock.last_request().unwrap();
        assert!(request.prompt.contains("[0] X is here."));
        assert!(request.prompt.contains("[1] Y follows next."));
    }

    #[tokio::test]
    async fn test_partially_invalid_reply_is_repaired() {
        let text = "The ship left port. Gulls circled above. A storm gathered fast. Everyone ran below.";
        let reply = r#"[
            {"sceneId": 1, "isNewScene": true, "semanticLabel": "storytelling"},
            {"sceneId": 1, "isNewScene": false, "semanticLabel": "describing"},
            {"isNewScene": true, "semanticLabel": "dramatic", "visualQueries": []},
            {"sceneId": 9, "isNewScene": false, "pace": "fast", "visualQueries": ["ignored"]}
        ]"#;
        let (planner, _) = planner(MockProvider::responds(reply));

        let plans = planner.plan(text).await.unwrap();

        assert_eq!(plans.len(), 4);
        let ids: Vec<u32> = plans.iter().map(|p| p.scene_id).collect();
        assert_eq!(ids, vec![1, 1, 2, 2]);
        assert!(plans[2].is_new_scene);
        assert_eq!(plans[2].visual_queries, vec!["A storm gathered fast"]);
        assert!(plans[3].visual_queries.is_empty());
        assert_eq!(plans[3].pace, Pace::Fast);
        assert!(check_invariants(&plans).is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_scene_ids_do_not_break_plan() {
        let text = "The ship left port. Gulls circled above. A storm gathered fast.";
        let reply = r#"[
            {"sceneId": 1, "isNewScene": true},
            {"sceneId": 4294967295, "isNewScene": true},
            {"sceneId": 4294967295, "isNewScene": true}
        ]"#;
        let (planner, _) = planner(MockProvider::responds(reply));

        let plans = planner.plan(text).await.unwrap();

        let ids: Vec<(u32, bool)> = plans.iter().map(|p| (p.scene_id, p.is_new_scene)).collect();
        assert_eq!(ids, vec![(1, true), (u32::MAX, true), (u32::MAX, false)]);
        assert!(check_invariants(&plans).is_empty());
    }

    #[tokio::test]
    async fn test_planner_shared_across_paragraphs() {
        let (planner, mock) = planner(MockProvider::scripted(vec![
            MockStep::Fail {
                status: 500,
                message: "boom".to_string(),
            },
            MockStep::Respond(r#"[{"semanticLabel": "humorous"}]"#.to_string()),
        ]));

        let (a, b) = tokio::join!(planner.plan("First paragraph."), planner.plan("Second one."));
        let a = a.unwrap();
        let b = b.unwrap();

        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(mock.call_count(), 2);
        let labels = [a[0].semantic_label, b[0].semantic_label];
        assert!(labels.contains(&SemanticLabel::Humorous));
        assert!(labels.contains(&SemanticLabel::Neutral));
    }
}
