//! FAQ records and their cleaning/chunking rules

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use faq_index::Chunk;

use crate::error::Result;

/// One question/answer pair from the raw FAQ export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub id: String,
    pub category: String,
    pub source: String,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl FaqRecord {
    /// Trim every field and lowercase the question
    pub fn normalized(&self) -> Self {
        Self {
            id: self.id.trim().to_string(),
            category: self.category.trim().to_string(),
            source: self.source.trim().to_string(),
            question: self.question.trim().to_lowercase(),
            answer: self.answer.trim().to_string(),
            last_updated: self.last_updated.as_ref().map(|s| s.trim().to_string()),
        }
    }

    /// Each record is exactly one chunk
    pub fn to_chunk(&self) -> Chunk {
        Chunk::new(
            format!("{}_chunk_1", self.id),
            self.category.clone(),
            self.source.clone(),
            format!("Question: {}\nAnswer: {}", self.question, self.answer),
        )
    }
}

/// Read a JSON array of records
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<FaqRecord>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<FaqRecord> = serde_json::from_str(&raw)?;
    tracing::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Normalize records, dropping empty ones and repeated ids (first wins)
pub fn clean_records(records: &[FaqRecord]) -> Vec<FaqRecord> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(records.len());

    for record in records.iter().map(FaqRecord::normalized) {
        if record.id.is_empty() || record.question.is_empty() || record.answer.is_empty() {
            tracing::warn!("Skipping incomplete FAQ record {:?}", record.id);
            continue;
        }
        if !seen.insert(record.id.clone()) {
            tracing::warn!("Skipping duplicate FAQ record {}", record.id);
            continue;
        }
        cleaned.push(record);
    }

    tracing::info!("Cleaned {} of {} records", cleaned.len(), records.len());
    cleaned
}
