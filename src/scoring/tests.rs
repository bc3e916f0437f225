use std::sync::Arc;

use super::*;
use crate::decision::{DecisionStrategy, GenerationTrace, ScoreDistribution, ScoreScale};
use crate::inference::mock::{MockInvoker, relevance_trace, unparseable_trace};
use crate::inference::tokenizer::word_level_tokenizer;
use crate::inference::{HfTokenizer, InferenceError, InferenceInvoker, OutputConstraint};
use crate::prompt::{PromptTruncator, pair_prompt};

fn scorer(invoker: &Arc<MockInvoker>) -> RelevanceScorer {
    RelevanceScorer::new(invoker.clone(), 20)
}

mod score_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_token_end_to_end() {
        let invoker = Arc::new(MockInvoker::first_token(4.0, 0.0));
        let outcome = scorer(&invoker)
            .score("Query: q Document: d Relevant:")
            .await
            .unwrap();

        let result = outcome.result;
        let expected = 4f64.exp() / (1.0 + 4f64.exp());
        assert_eq!(result.prediction, "true");
        assert!((result.score() - expected).abs() < 1e-9);
        assert!((result.score() - 0.982).abs() < 1e-3);
        assert_eq!(result.logit_true, Some(4.0));
        assert_eq!(result.logit_false, Some(0.0));
        assert!((result.prob_true + result.prob_false - 1.0).abs() < 1e-9);
        assert!(result.is_relevant());
        assert!(result.error.is_none());
        assert_eq!(outcome.source, ResultSource::Inference);
    }

    #[tokio::test]
    async fn test_capital_of_france_pair() {
        let invoker = Arc::new(MockInvoker::first_token(5.0, 1.0));
        let prompt = pair_prompt("capital of France", "Paris is the capital of France.");

        let result = scorer(&invoker).score(&prompt).await.unwrap().result;

        assert_eq!(
            invoker.last_request().unwrap().prompt,
            "Query: capital of France Document: Paris is the capital of France. Relevant:"
        );
        assert_eq!(result.prediction, "true");
        assert!((result.score() - 0.982).abs() < 1e-3);
        assert!((result.prob_false - 0.018).abs() < 1e-3);
        assert_eq!(result.logit_true, Some(5.0));
        assert_eq!(result.logit_false, Some(1.0));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_chat_end_to_end() {
        let invoker = Arc::new(MockInvoker::chat(-0.1, -2.4));
        let result = scorer(&invoker).score("prompt").await.unwrap().result;

        let expected = 1.0 / (1.0 + (-2.3f64).exp());
        assert_eq!(result.prediction, "true");
        assert!((result.prob_true - expected).abs() < 1e-9);
        assert!(result.is_relevant());
    }

    #[tokio::test]
    async fn test_chat_false_decision() {
        let invoker = Arc::new(MockInvoker::chat(-3.0, -0.05));
        let result = scorer(&invoker).score("prompt").await.unwrap().result;

        assert_eq!(result.prediction, "false");
        assert!(result.prob_false > result.prob_true);
        assert!(!result.is_relevant());
    }

    #[tokio::test]
    async fn test_decision_not_found_falls_back() {
        let invoker = Arc::new(MockInvoker::new(
            "mock",
            DecisionStrategy::RankedScan,
            unparseable_trace("  maybe  "),
        ));

        let result = scorer(&invoker).score("prompt").await.unwrap().result;

        assert_eq!(result.prediction, "maybe");
        assert_eq!(result.prob_true, 0.5);
        assert_eq!(result.prob_false, 0.5);
        assert!(result.logit_true.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("could not detect true/false token position")
        );
        assert!(!result.is_relevant());
    }

    #[tokio::test]
    async fn test_missing_label_falls_back_with_partial_score() {
        let positions = vec![ScoreDistribution::ranked([
            (None, "true", -0.01),
            (None, "yes", -5.0),
        ])];
        let trace = GenerationTrace::new(positions, vec!["true".to_string()], ScoreScale::LogProb);
        let invoker = Arc::new(MockInvoker::new("mock", DecisionStrategy::RankedScan, trace));

        let result = scorer(&invoker).score("prompt").await.unwrap().result;

        assert!(result.is_fallback());
        assert_eq!(result.prob_true, 0.5);
        assert_eq!(result.logit_true, Some(-0.01));
        assert!(result.logit_false.is_none());
        assert!(result.error.unwrap().contains("false"));
    }

    #[tokio::test]
    async fn test_both_labels_impossible_is_neutral_without_error() {
        let invoker = Arc::new(MockInvoker::chat(f64::NEG_INFINITY, f64::NEG_INFINITY));
        invoker.set_trace(relevance_trace(f64::NEG_INFINITY, f64::NEG_INFINITY));

        let result = scorer(&invoker).score("prompt").await.unwrap().result;

        assert_eq!(result.prob_true, 0.5);
        assert_eq!(result.prob_false, 0.5);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_inference_failure_is_an_error() {
        let invoker = Arc::new(MockInvoker::failing(
            DecisionStrategy::RankedScan,
            "runtime unreachable",
        ));

        let err = scorer(&invoker).score("prompt").await.unwrap_err();

        assert!(matches!(
            err,
            ScoringError::Inference(InferenceError::InferenceFailed { .. })
        ));
        assert_eq!(err.kind(), "inference_failed");
    }

    #[tokio::test]
    async fn test_request_carries_constraint_and_budget() {
        let invoker = Arc::new(MockInvoker::chat(-0.1, -2.0));
        let scorer = RelevanceScorer::new(invoker.clone(), 7)
            .with_constraint(OutputConstraint::relevance_schema());

        scorer.score("judge this").await.unwrap();

        let request = invoker.last_request().unwrap();
        assert_eq!(request.prompt, "judge this");
        assert_eq!(request.max_new_tokens, 7);
        assert_eq!(request.constraint, Some(OutputConstraint::relevance_schema()));
    }

    #[tokio::test]
    async fn test_prompt_is_truncated_before_inference() {
        let tokenizer = HfTokenizer::new(word_level_tokenizer(&["a", "b", "c", "d"]));
        let invoker = Arc::new(MockInvoker::chat(-0.1, -2.0));
        let scorer = scorer(&invoker)
            .with_truncator(PromptTruncator::new(Arc::new(tokenizer), 2));

        scorer.score("a b c d").await.unwrap();

        assert_eq!(invoker.last_request().unwrap().prompt, "a b");
    }
}

mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_hit_skips_inference() {
        let invoker = Arc::new(MockInvoker::first_token(2.0, -1.0));
        let scorer = scorer(&invoker).with_cache_capacity(16);

        let first = scorer.score("same prompt").await.unwrap();
        let second = scorer.score("same prompt").await.unwrap();

        assert_eq!(invoker.calls(), 1);
        assert_eq!(first.source, ResultSource::Inference);
        assert!(second.is_cached());
        assert_eq!(first.result, second.result);
        assert_ne!(first.request_id, second.request_id);
    }

    #[tokio::test]
    async fn test_distinct_prompts_miss() {
        let invoker = Arc::new(MockInvoker::first_token(2.0, -1.0));
        let scorer = scorer(&invoker).with_cache_capacity(16);

        scorer.score("prompt one").await.unwrap();
        scorer.score("prompt two").await.unwrap();

        assert_eq!(invoker.calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_disables_cache() {
        let invoker = Arc::new(MockInvoker::first_token(2.0, -1.0));
        let scorer = scorer(&invoker).with_cache_capacity(0);

        assert!(scorer.cache().is_none());
        scorer.score("p").await.unwrap();
        scorer.score("p").await.unwrap();
        assert_eq!(invoker.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let invoker = Arc::new(MockInvoker::first_token(2.0, -1.0));
        invoker.set_failure("temporarily down");
        let scorer = scorer(&invoker).with_cache_capacity(16);

        assert!(scorer.score("p").await.is_err());

        invoker.set_trace(crate::inference::mock::first_token_trace(2.0, -1.0));
        let outcome = scorer.score("p").await.unwrap();

        assert_eq!(outcome.source, ResultSource::Inference);
        assert_eq!(invoker.calls(), 2);
    }

    #[test]
    fn test_result_cache_basics() {
        let cache = ResultCache::with_capacity(4);
        let key = hash_prompt("prompt");
        assert!(cache.get(&key).is_none());

        let result = evaluate_trace(
            &crate::inference::mock::first_token_trace(1.0, 0.0),
            &MockInvoker::first_token(1.0, 0.0).strategy(),
        );
        cache.insert(key, result.clone());

        assert_eq!(cache.get(&key), Some(result));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_hash_prompt_is_stable() {
        assert_eq!(hash_prompt("abc"), hash_prompt("abc"));
        assert_ne!(hash_prompt("abc"), hash_prompt("abd"));
    }
}

mod result_tests {
    use super::*;
    use crate::decision::{DecisionScores, ExtractionError, Probabilities};

    #[test]
    fn test_scored_result_fields() {
        let scores = DecisionScores {
            position: 0,
            score_true: 1.5,
            score_false: -0.5,
            probabilities: Probabilities {
                prob_true: 0.88,
                prob_false: 0.12,
            },
        };

        let result = RelevanceResult::scored("true", &scores);

        assert_eq!(result.score(), 0.88);
        assert_eq!(result.logit_true, Some(1.5));
        assert!(!result.is_fallback());
    }

    #[test]
    fn test_equal_probabilities_are_not_relevant() {
        let result =
            RelevanceResult::fallback("", &ExtractionError::DecisionNotFound, None, None);
        assert!(!result.is_relevant());
        assert!(result.is_fallback());
    }
}
