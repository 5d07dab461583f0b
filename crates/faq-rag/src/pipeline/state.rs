//! Per-query pipeline state and its transition table

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use faq_index::{Chunk, SearchResult};

use crate::error::{Error, Result};

/// Where a query currently sits in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Retrieved,
    Validated { passed: bool },
    Answered,
    Refused,
    Done,
    Failed,
}

impl Stage {
    /// The transition table. Anything not listed here is illegal.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;

        match (self, next) {
            (Start, Retrieved) => true,
            (Retrieved, Validated { .. }) => true,
            (Validated { passed: true }, Answered) => true,
            (Validated { passed: false }, Refused) => true,
            (Answered | Refused, Done) => true,
            // Only the provider-backed stages can fail
            (Start | Validated { passed: true }, Failed) => true,
            _ => false,
        }
    }

    /// No transitions leave this stage
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineOutcome {
    Answered,
    Refused,
}

/// Validation result: pass/fail plus a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub reason: String,
}

impl Verdict {
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
        }
    }
}

/// Owned copy of a search hit, detached from the index borrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// Squared euclidean distance, lower is closer
    pub distance: f32,
    /// 0-based rank among the returned set
    pub rank: usize,
}

impl From<SearchResult<'_>> for RetrievedChunk {
    fn from(result: SearchResult<'_>) -> Self {
        Self {
            chunk: result.chunk.clone(),
            distance: result.distance,
            rank: result.rank,
        }
    }
}

/// Mutable record threaded through one pipeline run
///
/// Created per query, owned by the orchestrator, dropped after the response.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub query: String,
    /// Rank order
    pub results: Vec<RetrievedChunk>,
    pub validation: Option<Verdict>,
    pub answer: String,
    pub sources: BTreeSet<String>,
    stage: Stage,
}

impl PipelineState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            validation: None,
            answer: String::new(),
            sources: BTreeSet::new(),
            stage: Stage::Start,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to `next` if the table allows it
    pub fn advance(&mut self, next: Stage) -> Result<()> {
        if !self.stage.can_advance_to(next) {
            return Err(Error::internal(format!(
                "illegal pipeline transition {:?} -> {:?}",
                self.stage, next
            )));
        }
        tracing::debug!("Pipeline stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Record a fatal fault. Clears anything a caller could mistake for an answer.
    ///
    /// Always lands in `Failed`, even from a stage the table does not expect
    /// to fail (an internal error, for instance).
    pub(crate) fn fail(&mut self) {
        if !self.stage.can_advance_to(Stage::Failed) {
            tracing::warn!("Unexpected failure in pipeline stage {:?}", self.stage);
        }
        tracing::debug!("Pipeline stage {:?} -> Failed", self.stage);
        self.answer.clear();
        self.sources.clear();
        self.stage = Stage::Failed;
    }

    /// `Some` once the run reached `Done`
    pub fn outcome(&self) -> Option<PipelineOutcome> {
        if self.stage != Stage::Done {
            return None;
        }
        match &self.validation {
            Some(v) if v.passed => Some(PipelineOutcome::Answered),
            Some(_) => Some(PipelineOutcome::Refused),
            None => None,
        }
    }
}
