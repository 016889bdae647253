//! Whole-input planning: paragraphs in, planned paragraphs out.

use futures_util::future::join_all;
use log::{debug, info};
use serde::Serialize;

use crate::error::PlanError;
use crate::plan::{ScenePlan, ScenePlanner};
use crate::text::{Paragraph, ParagraphLimits, split_paragraphs};

/// One input paragraph with its scene plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedParagraph {
    pub index: usize,
    pub text: String,
    pub plans: Vec<ScenePlan>,
}

/// Splits input into paragraphs and plans them concurrently.
#[derive(Clone)]
pub struct Pipeline {
    planner: ScenePlanner,
    limits: ParagraphLimits,
}

impl Pipeline {
    pub fn new(planner: ScenePlanner) -> Self {
        Self {
            planner,
            limits: ParagraphLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ParagraphLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn paragraphs(&self, text: &str) -> Vec<Paragraph> {
        split_paragraphs(text, &self.limits)
    }

    pub async fn process(&self, text: &str) -> Result<Vec<PlannedParagraph>, PlanError> {
        self.process_with_progress(text, |_, _| {}).await
    }

    /// Like [`Pipeline::process`], calling `on_done(done, total)` as each
    /// paragraph finishes. Output keeps input order regardless of finish order.
    pub async fn process_with_progress<F>(
        &self,
        text: &str,
        on_done: F,
    ) -> Result<Vec<PlannedParagraph>, PlanError>
    where
        F: Fn(usize, usize),
    {
        let paragraphs = self.paragraphs(text);
        if paragraphs.is_empty() {
            return Err(PlanError::EmptyInput);
        }

        let total = paragraphs.len();
        info!("planning {} paragraph(s)", total);

        let done = std::cell::Cell::new(0usize);
        let tasks = paragraphs.iter().map(|paragraph| {
            let done = &done;
            let on_done = &on_done;
            async move {
                let plans = self.planner.plan(&paragraph.text).await;
                done.set(done.get() + 1);
                on_done(done.get(), total);
                debug!("paragraph {} planned", paragraph.index);
                plans
            }
        });

        let results = join_all(tasks).await;

        paragraphs
            .into_iter()
            .zip(results)
            .map(|(paragraph, plans)| {
                Ok(PlannedParagraph {
                    index: paragraph.index,
                    text: paragraph.text,
                    plans: plans?,
                })
            })
            .collect()
    }
}
