//! Pipeline orchestrator
//!
//! Drives one `PipelineState` from `Start` to `Done`:
//!
//! ```text
//! Start -> Retrieved -> Validated -> Answered -> Done
//!                                 \-> Refused  -/
//! ```
//!
//! Any provider fault moves the state to `Failed` and is returned to the
//! caller. A refusal is a normal outcome, not an error.

use std::sync::Arc;

use faq_index::VectorIndex;

use crate::config::RagConfig;
use crate::error::Result;
use crate::providers::{EmbeddingProvider, GenerationProvider};

use super::generation::{Generator, REFUSAL};
use super::retrieval::Retriever;
use super::state::{PipelineState, Stage};
use super::validation::Validator;

/// The three stages wired together. Cheap to share behind an `Arc`.
pub struct Pipeline {
    retriever: Retriever,
    validator: Validator,
    generator: Generator,
}

impl Pipeline {
    pub fn new(retriever: Retriever, validator: Validator, generator: Generator) -> Self {
        Self {
            retriever,
            validator,
            generator,
        }
    }

    /// Wire the stages from config around a loaded index
    pub fn from_config(
        config: &RagConfig,
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        let timeout = config.pipeline.provider_timeout();

        Self::new(
            Retriever::new(embedder, index, config.retrieval.top_k, timeout),
            Validator::new(&config.validation),
            Generator::new(generator, timeout),
        )
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        self.retriever.index()
    }

    pub fn top_k(&self) -> usize {
        self.retriever.top_k()
    }

    /// Answer one query. Returns the finished state, or the fault that stopped it.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<PipelineState> {
        tracing::info!("Query received");
        let mut state = PipelineState::new(query);
        self.drive(&mut state).await?;
        Ok(state)
    }

    /// Step `state` until it is terminal. On a fault the state is left in `Failed`.
    pub async fn drive(&self, state: &mut PipelineState) -> Result<()> {
        while !state.stage().is_terminal() {
            if let Err(e) = self.step(state).await {
                state.fail();
                tracing::error!("Pipeline failed: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Perform the single transition out of the current stage
    pub async fn step(&self, state: &mut PipelineState) -> Result<()> {
        match state.stage() {
            Stage::Start => {
                state.results = self.retriever.retrieve(&state.query).await?;
                state.advance(Stage::Retrieved)
            }
            Stage::Retrieved => {
                let verdict = self.validator.validate(&state.query, &state.results);
                tracing::info!(passed = verdict.passed, "Validation: {}", verdict.reason);
                let next = Stage::Validated {
                    passed: verdict.passed,
                };
                state.validation = Some(verdict);
                state.advance(next)
            }
            Stage::Validated { passed: true } => {
                let (answer, sources) = self.generator.generate(&state.query, &state.results).await?;
                state.answer = answer;
                state.sources = sources;
                state.advance(Stage::Answered)
            }
            Stage::Validated { passed: false } => {
                tracing::warn!("Refusing query without generation");
                state.answer = REFUSAL.to_string();
                state.sources.clear();
                state.advance(Stage::Refused)
            }
            Stage::Answered | Stage::Refused => state.advance(Stage::Done),
            stage @ (Stage::Done | Stage::Failed) => state.advance(stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pipeline::PipelineOutcome;
    use async_trait::async_trait;
    use faq_index::Chunk;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Returns a fixed vector for every text
    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("connection refused"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Counts calls and answers with a canned string, or fails
    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl GenerationProvider for CountingGenerator {
        async fn complete(&self, _instruction: &str, _context: &str, _query: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::generation("model crashed"))
            } else {
                Ok("ANSWER".to_string())
            }
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    fn index(categories: &[&str]) -> Arc<VectorIndex> {
        let chunks = categories
            .iter()
            .enumerate()
            .map(|(i, c)| Chunk::new(format!("c{}", i), *c, "cms.gov", format!("text {}", i)))
            .collect();
        let embeddings = (0..categories.len()).map(|i| vec![i as f32, 0.0]).collect();
        Arc::new(VectorIndex::build(chunks, embeddings).unwrap())
    }

    fn pipeline(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<CountingGenerator>,
        min_results: usize,
    ) -> Pipeline {
        let mut config = RagConfig::default();
        config.validation.min_results = min_results;
        Pipeline::from_config(&config, index(&["A", "A", "B"]), embedder, generator)
    }

    #[tokio::test]
    async fn test_sources_are_deduplicated_categories() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline(Arc::new(FixedEmbedder(vec![0.0, 0.0])), generator.clone(), 1);

        let state = tokio_test::assert_ok!(pipeline.run("medicare costs").await);
        assert_eq!(state.answer, "ANSWER");
        assert_eq!(
            state.sources.into_iter().collect::<Vec<_>>(),
            vec!["A".to_string(), "B".to_string()]
        );
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refusal_skips_generation() {
        let generator = Arc::new(CountingGenerator::default());
        // Three chunks can never satisfy a minimum of four
        let pipeline = pipeline(Arc::new(FixedEmbedder(vec![0.0, 0.0])), generator.clone(), 4);

        let state = pipeline.run("medicare").await.unwrap();
        assert_eq!(state.answer, REFUSAL);
        assert!(state.sources.is_empty());
        assert_eq!(state.outcome(), Some(PipelineOutcome::Refused));
        assert_eq!(state.validation.unwrap().reason, "insufficient context");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_fatal() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline(Arc::new(FailingEmbedder), generator.clone(), 1);

        let err = pipeline.run("medicare").await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_fatal() {
        let generator = Arc::new(CountingGenerator {
            fail: true,
            ..Default::default()
        });
        let pipeline = pipeline(Arc::new(FixedEmbedder(vec![0.0, 0.0])), generator, 1);

        let err = tokio_test::assert_err!(pipeline.run("medicare").await);
        assert!(matches!(err, Error::GenerationUnavailable(_)));
    }

    #[tokio::test]
    async fn test_wrong_query_dimension_is_index_error() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline(Arc::new(FixedEmbedder(vec![0.0, 0.0, 0.0])), generator, 1);

        let err = pipeline.run("medicare").await.unwrap_err();
        assert!(matches!(err, Error::Index(_)));
    }

    #[tokio::test]
    async fn test_slow_embedding_times_out() {
        struct SlowEmbedder;

        #[async_trait]
        impl EmbeddingProvider for SlowEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![0.0, 0.0])
            }

            fn name(&self) -> &str {
                "slow"
            }
        }

        let generator = Arc::new(CountingGenerator::default());
        let pipeline = Pipeline::new(
            Retriever::new(
                Arc::new(SlowEmbedder),
                index(&["A"]),
                3,
                Duration::from_millis(20),
            ),
            Validator::default(),
            Generator::new(generator, Duration::from_secs(1)),
        );

        let err = pipeline.run("medicare").await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
    }

    /// Sleeps past any sensible timeout before answering
    struct SlowGenerator;

    #[async_trait]
    impl GenerationProvider for SlowGenerator {
        async fn complete(&self, _instruction: &str, _context: &str, _query: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }

        fn model(&self) -> &str {
            "slow"
        }
    }

    /// Fails with an error that is not a provider fault
    struct BrokenGenerator;

    #[async_trait]
    impl GenerationProvider for BrokenGenerator {
        async fn complete(&self, _instruction: &str, _context: &str, _query: &str) -> Result<String> {
            Err(Error::internal("template missing"))
        }

        fn name(&self) -> &str {
            "broken"
        }

        fn model(&self) -> &str {
            "broken"
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::internal("tokenizer missing"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn pipeline_with(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Pipeline {
        Pipeline::new(
            Retriever::new(embedder, index(&["A", "B"]), 3, Duration::from_secs(1)),
            Validator::default(),
            Generator::new(generator, Duration::from_millis(20)),
        )
    }

    #[tokio::test]
    async fn test_slow_generation_times_out_and_fails_state() {
        let pipeline = pipeline_with(Arc::new(FixedEmbedder(vec![0.0, 0.0])), Arc::new(SlowGenerator));
        let mut state = PipelineState::new("medicare");

        let err = tokio_test::assert_err!(pipeline.drive(&mut state).await);
        assert!(matches!(err, Error::GenerationUnavailable(_)));
        assert_eq!(state.stage(), Stage::Failed);
        assert!(state.answer.is_empty());
        assert!(state.sources.is_empty());
        assert_eq!(state.outcome(), None);
    }

    #[tokio::test]
    async fn test_generation_errors_are_rewrapped() {
        let pipeline = pipeline_with(Arc::new(FixedEmbedder(vec![0.0, 0.0])), Arc::new(BrokenGenerator));

        let err = pipeline.run("medicare").await.unwrap_err();
        assert!(matches!(err, Error::GenerationUnavailable(ref msg) if msg.contains("template missing")));
    }

    #[tokio::test]
    async fn test_embedding_errors_are_rewrapped() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline_with(Arc::new(BrokenEmbedder), generator.clone());
        let mut state = PipelineState::new("medicare");

        let err = pipeline.drive(&mut state).await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(ref msg) if msg.contains("tokenizer missing")));
        assert_eq!(state.stage(), Stage::Failed);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_step_walks_every_stage() {
        let generator = Arc::new(CountingGenerator::default());
        let pipeline = pipeline(Arc::new(FixedEmbedder(vec![0.0, 0.0])), generator, 1);
        let mut state = PipelineState::new("what color is the sky");

        let mut seen = vec![state.stage()];
        while !state.stage().is_terminal() {
            pipeline.step(&mut state).await.unwrap();
            seen.push(state.stage());
        }

        assert_eq!(
            seen,
            vec![
                Stage::Start,
                Stage::Retrieved,
                Stage::Validated { passed: true },
                Stage::Answered,
                Stage::Done,
            ]
        );
        assert_eq!(
            state.validation.unwrap().reason,
            "general query — answering from context"
        );
    }
}
