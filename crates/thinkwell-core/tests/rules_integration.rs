//! Rule Table Integration Tests
//!
//! Tests loading the shipped config/rules.yaml

use std::path::PathBuf;
use thinkwell_core::{
    shape_request, ChatRequest, MessageRole, RuleLoader, RuleResolver, RuleTable, SegmentResult,
    ThinkLevel, ThinkSetting,
};

fn project_rules_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("config/rules.yaml")
}

fn resolver() -> RuleResolver {
    let table = RuleLoader::with_path(project_rules_file())
        .load()
        .expect("Failed to load rules");
    RuleResolver::new(table)
}

fn stream(resolver: &RuleResolver, model: &str, text: &str, size: usize) -> SegmentResult {
    let config = resolver.resolve(model, ThinkSetting::OFF);
    let mut segmenter = config.stream_segmenter();
    let mut total = SegmentResult::default();
    let chars: Vec<char> = text.chars().collect();
    for chunk in chars.chunks(size) {
        total.extend(segmenter.push(&chunk.iter().collect::<String>()));
    }
    total.extend(segmenter.finish());
    total
}

#[test]
fn test_shipped_file_matches_embedded_table() {
    let table = RuleLoader::with_path(project_rules_file()).load().unwrap();
    assert_eq!(table, RuleTable::embedded().unwrap());
}

#[test]
fn test_shipped_file_is_a_copy_of_embedded_file() {
    let shipped = std::fs::read_to_string(project_rules_file()).unwrap();
    assert_eq!(
        shipped,
        thinkwell_core::rules::EMBEDDED_RULES,
        "config/rules.yaml must be kept identical to crates/thinkwell-core/config/rules.yaml"
    );
}

#[test]
fn test_shipped_rule_order() {
    let resolver = resolver();
    let prefixes: Vec<_> = resolver
        .table()
        .rules()
        .iter()
        .map(|r| r.prefix.as_str())
        .collect();

    assert_eq!(
        prefixes,
        vec![
            "qwen3",
            "deepseek-r1",
            "magistral",
            "gpt-oss",
            "cogito",
            "granite3.2",
            "granite3.2-vision",
            "granite3.3",
            "phi4-reasoning",
            "phi4-mini-reasoning",
            "reflection",
            "deepscaler",
            "deepcoder",
        ]
    );
}

#[test]
fn test_granite_vision_is_shadowed() {
    let config = resolver().resolve("granite3.2-vision:latest", ThinkSetting::OFF);
    assert_eq!(config.matched_prefix.as_deref(), Some("granite3.2"));
    assert_eq!(config.extraction_patterns.len(), 2);
}

#[test]
fn test_every_shipped_pattern_streams_incrementally() {
    let resolver = resolver();
    for rule in resolver.table().rules() {
        for pattern in &rule.patterns {
            assert!(
                pattern.is_streamable(),
                "{}: {} should stream",
                rule.prefix,
                pattern
            );
        }
    }
}

#[test]
fn test_native_thinking_models() {
    let resolver = resolver();
    for model in ["qwen3:8b", "deepseek-r1:14b", "magistral", "gpt-oss:20b"] {
        let config = resolver.resolve(model, ThinkLevel::High.into());
        assert_eq!(config.send_reasoning_flag, ThinkSetting::Level(ThinkLevel::High));
        assert!(config.extraction_patterns.is_empty());
        assert_eq!(
            config.segment("<think>x</think>y"),
            SegmentResult::content_only("<think>x</think>y")
        );
    }
}

#[test]
fn test_cogito_request_shaping() {
    let resolver = resolver();
    let request = ChatRequest::new("cogito:14b")
        .with_prompt("Why is the sky blue?")
        .with_think(true);
    let config = resolver.resolve(&request.model, request.requested_think());
    let shaped = shape_request(&request, &config);

    assert_eq!(shaped.think, Some(ThinkSetting::OFF));
    assert_eq!(shaped.messages.len(), 2);
    assert_eq!(shaped.messages[0].role, MessageRole::System);
    assert_eq!(shaped.messages[0].content, "Enable deep thinking subroutine.");
}

#[test]
fn test_granite_control_message() {
    let resolver = resolver();
    let request = ChatRequest::new("granite3.3:8b").with_prompt("hello");
    let config = resolver.resolve(&request.model, request.requested_think());
    let shaped = shape_request(&request, &config);

    assert_eq!(shaped.messages[0].role, MessageRole::Control);
    assert_eq!(shaped.messages[0].content, "thinking");
}

#[test]
fn test_granite33_extraction() {
    let resolver = resolver();
    let text = "<think>Let me think.</think>\n<response>Hello!</response>";

    let config = resolver.resolve("granite3.3", ThinkSetting::OFF);
    let whole = config.segment(text);
    assert_eq!(whole, SegmentResult::new("Let me think.", "Hello!"));

    for size in [1, 3, 7, 25, 1000] {
        assert_eq!(stream(&resolver, "granite3.3", text, size), whole);
    }
}

#[test]
fn test_reflection_extraction() {
    let resolver = resolver();
    let text = "<thinking>plan</thinking>\n<output>answer</output>";
    let whole = resolver.resolve("reflection:70b", ThinkSetting::OFF).segment(text);
    assert_eq!(whole, SegmentResult::new("plan", "answer"));
    assert_eq!(stream(&resolver, "reflection:70b", text, 2), whole);
}

#[test]
fn test_unknown_model_uses_default_think_tags() {
    let resolver = resolver();
    let config = resolver.resolve("llama3.2", ThinkSetting::from(true));

    assert!(config.matched_prefix.is_none());
    assert_eq!(config.send_reasoning_flag, ThinkSetting::OFF);
    assert!(config.injected_message.is_none());
    assert_eq!(
        config.segment("<think>abc</think>def"),
        SegmentResult::new("abc", "def")
    );
    assert_eq!(
        stream(&resolver, "llama3.2", "<think>abc</think>def", 1),
        SegmentResult::new("abc", "def")
    );
}
