//! Validation stage: admission rules over retrieved chunks
//!
//! Pure function of its inputs. No provider calls.

use crate::config::ValidationConfig;

use super::state::{RetrievedChunk, Verdict};

pub const REASON_NO_RESULTS: &str = "no relevant content found";
pub const REASON_INSUFFICIENT: &str = "insufficient context";
pub const REASON_GENERAL: &str = "general query — answering from context";
pub const REASON_DOMAIN: &str = "domain query validated";

/// Decides whether generation may proceed
#[derive(Debug, Clone)]
pub struct Validator {
    min_results: usize,
    /// Lowercased once at construction
    domain_keywords: Vec<String>,
}

impl Validator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            min_results: config.min_results,
            domain_keywords: config
                .domain_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// First matching rule wins
    ///
    /// The keyword check only picks the reason. Off-topic queries still pass.
    pub fn validate(&self, query: &str, results: &[RetrievedChunk]) -> Verdict {
        if results.is_empty() {
            return Verdict::fail(REASON_NO_RESULTS);
        }
        if results.len() < self.min_results {
            return Verdict::fail(REASON_INSUFFICIENT);
        }

        let query = query.to_lowercase();
        if self.domain_keywords.iter().any(|k| query.contains(k.as_str())) {
            Verdict::pass(REASON_DOMAIN)
        } else {
            Verdict::pass(REASON_GENERAL)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}
