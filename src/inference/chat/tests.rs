use super::*;
use serial_test::serial;
use std::time::Duration;

fn completion(content: serde_json::Value) -> CreateChatCompletionResponse {
    serde_json::from_value(serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": DEFAULT_CHAT_MODEL,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{ \"relevance\": true }" },
            "finish_reason": "stop",
            "logprobs": { "content": content }
        }]
    }))
    .unwrap()
}

fn position(token: &str, logprob: f32, top: &[(&str, f32)]) -> serde_json::Value {
    let top: Vec<serde_json::Value> = top
        .iter()
        .map(|(t, lp)| serde_json::json!({ "token": t, "logprob": lp, "bytes": null }))
        .collect();
    serde_json::json!({ "token": token, "logprob": logprob, "bytes": null, "top_logprobs": top })
}

mod config_tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();

        assert!(!config.is_enabled());
        assert_eq!(config.model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.max_prompt_tokens, DEFAULT_MAX_PROMPT_TOKENS);
        assert_eq!(config.max_new_tokens, DEFAULT_MAX_NEW_TOKENS);
        assert_eq!(config.top_logprobs, DEFAULT_TOP_LOGPROBS);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let config = ChatConfig::new("http://localhost:8000/v1/");
        assert_eq!(
            config.completions_url().as_deref(),
            Some("http://localhost:8000/v1/chat/completions")
        );
        assert!(ChatConfig::default().completions_url().is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ChatConfig::new("localhost:8000").validate().is_err());
        assert!(ChatConfig::new("http://x").with_top_logprobs(0).validate().is_err());
        assert!(
            ChatConfig::new("http://x")
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );

        let empty_model = ChatConfig {
            model: "  ".to_string(),
            ..ChatConfig::new("http://x")
        };
        assert!(empty_model.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        // SAFETY: Test code only, serialized with other env-mutating tests.
        unsafe {
            std::env::set_var("JUDGE_CHAT_URL", "http://vllm:8000/v1");
            std::env::set_var("JUDGE_CHAT_TOKENIZER_PATH", "/models/llama/tokenizer.json");
            std::env::set_var("JUDGE_TOP_LOGPROBS", "50");
            std::env::set_var("JUDGE_CHAT_TIMEOUT_SECS", "5");
            std::env::set_var("JUDGE_MAX_PROMPT_TOKENS", "not-a-number");
        }

        let config = ChatConfig::from_env();

        // SAFETY: Test code only.
        unsafe {
            std::env::remove_var("JUDGE_CHAT_URL");
            std::env::remove_var("JUDGE_CHAT_TOKENIZER_PATH");
            std::env::remove_var("JUDGE_TOP_LOGPROBS");
            std::env::remove_var("JUDGE_CHAT_TIMEOUT_SECS");
            std::env::remove_var("JUDGE_MAX_PROMPT_TOKENS");
        }

        assert_eq!(config.base_url.as_deref(), Some("http://vllm:8000/v1"));
        assert_eq!(
            config.tokenizer_path,
            Some(std::path::PathBuf::from("/models/llama/tokenizer.json"))
        );
        assert_eq!(config.top_logprobs, 50);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_prompt_tokens, DEFAULT_MAX_PROMPT_TOKENS);
        assert!(config.api_key.is_none());
    }
}

mod invoker_tests {
    use super::*;
    use crate::inference::{GenerationRequest, InferenceInvoker, OutputConstraint};

    #[test]
    fn test_new_requires_url() {
        let err = ChatLogprobInvoker::new(ChatConfig::default()).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidConfig { .. }));
    }

    #[test]
    fn test_invoker_identity() {
        let invoker = ChatLogprobInvoker::new(ChatConfig::new("http://localhost:8000/v1")).unwrap();

        assert_eq!(invoker.name(), "chat");
        assert_eq!(invoker.strategy(), DecisionStrategy::RankedScan);
        assert_eq!(
            invoker.endpoint(),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let invoker = ChatLogprobInvoker::new(
            ChatConfig::new("http://localhost:8000/v1").with_top_logprobs(7),
        )
        .unwrap();
        let request = GenerationRequest::new("Query: q\n\nDocument: d", 20)
            .with_constraint(OutputConstraint::relevance_schema());

        let body = invoker.request_body(&request);

        assert_eq!(body["model"], DEFAULT_CHAT_MODEL);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 20);
        assert_eq!(body["logprobs"], true);
        assert_eq!(body["top_logprobs"], 7);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], DEFAULT_SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["content"], "Query: q\n\nDocument: d");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["name"],
            "RelevanceCheck"
        );
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["required"][0],
            "relevance"
        );
    }

    #[test]
    fn test_request_body_without_constraint() {
        let invoker = ChatLogprobInvoker::new(ChatConfig::new("http://localhost:8000/v1")).unwrap();
        let body = invoker.request_body(&GenerationRequest::new("prompt", 5));

        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_request_body_default_top_logprobs() {
        let invoker = ChatLogprobInvoker::new(ChatConfig::new("http://localhost:8000/v1")).unwrap();
        let body = invoker.request_body(&GenerationRequest::new("prompt", 5));

        assert_eq!(body["top_logprobs"], 1000);
    }

    #[tokio::test]
    async fn test_generate_connection_refused_is_request_failure() {
        let invoker = ChatLogprobInvoker::new(
            ChatConfig::new("http://127.0.0.1:1/v1").with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        let err = invoker
            .generate(&GenerationRequest::new("prompt", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::RequestFailed { .. }));
    }
}

mod trace_tests {
    use super::*;

    #[test]
    fn test_trace_ranks_top_logprobs() {
        let content = serde_json::json!([
            position("{", -0.001, &[("{", -0.001), ("```", -7.0)]),
            position("true", -0.2, &[("false", -1.8), ("true", -0.2)]),
        ]);

        let trace = trace_from_completion(&completion(content)).unwrap();

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.scale(), ScoreScale::LogProb);
        assert_eq!(trace.text(), "{true");

        let decision = trace.position(1).unwrap();
        assert_eq!(&*decision.top().unwrap().token, "true");
        assert_eq!(decision.entries()[0].rank, 1);
        assert_eq!(&*decision.entries()[1].token, "false");
        assert_eq!(decision.entries()[1].rank, 2);
        assert!((decision.entries()[1].score - f64::from(-1.8f32)).abs() < 1e-9);
        assert!(decision.entries().iter().all(|e| e.token_id.is_none()));
    }

    #[test]
    fn test_trace_uses_sampled_token_when_top_is_empty() {
        let content = serde_json::json!([position("true", -0.5, &[])]);

        let trace = trace_from_completion(&completion(content)).unwrap();
        let only = trace.position(0).unwrap();

        assert_eq!(only.len(), 1);
        assert_eq!(&*only.top().unwrap().token, "true");
    }

    #[test]
    fn test_trace_without_logprobs_is_malformed() {
        let response: CreateChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000u32,
            "model": DEFAULT_CHAT_MODEL,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "{}" },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let err = trace_from_completion(&response).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse { .. }));
    }

    #[test]
    fn test_trace_without_choices_is_malformed() {
        let response: CreateChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000u32,
            "model": DEFAULT_CHAT_MODEL,
            "choices": []
        }))
        .unwrap();

        let err = trace_from_completion(&response).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse { .. }));
    }
}
