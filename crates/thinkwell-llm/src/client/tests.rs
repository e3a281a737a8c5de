//! Tests for client module

use super::*;
use crate::error::Error;
use crate::mock::{text_chunks, text_response, MockTransport};
use crate::ollama::types::ResponseMessage;
use crate::transport::MockChatTransport;
use tempfile::TempDir;
use thinkwell_core::{
    InjectedMessage, MessageRole, Rule, RuleTable, ThinkLevel, ThinkSetting,
};

fn resolver() -> RuleResolver {
    RuleResolver::new(
        RuleTable::default()
            .with_rule(Rule::new("cogito").with_injected_message(InjectedMessage::new(
                MessageRole::System,
                "Enable deep thinking subroutine.",
            )))
            .with_rule(
                Rule::new("qwen3")
                    .with_force_disable_flag(false)
                    .with_patterns(Vec::new()),
            ),
    )
}

fn client(transport: &MockTransport) -> ThinkClient {
    ThinkClient::new(Arc::new(transport.clone()), resolver())
}

async fn collect(stream: ThinkStream) -> Vec<Result<ThinkChatResponse>> {
    stream.collect().await
}

fn totals(items: &[Result<ThinkChatResponse>]) -> SegmentResult {
    let mut total = SegmentResult::default();
    for item in items.iter().flatten() {
        total.extend(item.segment().clone());
    }
    total
}

#[tokio::test]
async fn test_call_segments_default_think_tags() {
    let transport = MockTransport::new();
    transport.add_response(text_response("llama3.2", "<think>abc</think>def"));

    let response = client(&transport)
        .call(&ChatRequest::new("llama3.2").with_prompt("hi"), true)
        .await
        .unwrap();

    assert_eq!(response.parts(), ("abc", "def"));
    assert_eq!(response.to_string(), "def");
    // raw response untouched
    assert_eq!(response.message.content, "<think>abc</think>def");
}

#[tokio::test]
async fn test_call_sends_shaped_request() {
    let transport = MockTransport::new();
    let request = ChatRequest::new("cogito:8b")
        .with_prompt("Why is the sky blue?")
        .with_think(true);

    client(&transport).call(&request, false).await.unwrap();

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].think, Some(ThinkSetting::OFF));
    assert!(!sent[0].stream);
    assert_eq!(sent[0].messages.len(), 2);
    assert_eq!(sent[0].messages[0].content, "Enable deep thinking subroutine.");
    assert_eq!(request.messages.len(), 1);
}

#[tokio::test]
async fn test_call_merges_native_thinking() {
    let transport = MockTransport::new();
    transport.add_response(ChatResponse {
        message: ResponseMessage {
            content: "Blue light scatters more.".to_string(),
            thinking: Some("Rayleigh scattering".to_string()),
            ..Default::default()
        },
        ..text_response("qwen3:4b", "")
    });

    let request = ChatRequest::new("qwen3:4b")
        .with_prompt("Why is the sky blue?")
        .with_think(ThinkLevel::High);
    let response = client(&transport).call(&request, false).await.unwrap();

    assert_eq!(response.reasoning(), "Rayleigh scattering");
    assert_eq!(response.content(), "Blue light scatters more.");
    assert_eq!(
        transport.requests()[0].think,
        Some(ThinkSetting::Level(ThinkLevel::High))
    );
}

#[tokio::test]
async fn test_call_uses_cache() {
    let temp_dir = TempDir::new().unwrap();
    let transport = MockTransport::new();
    transport.add_response(text_response("m", "<think>a</think>b"));
    transport.add_response(text_response("m", "fresh"));
    let client = client(&transport).with_cache(ResponseCache::new(temp_dir.path()));
    let request = ChatRequest::new("m").with_prompt("hi");

    let first = client.call(&request, true).await.unwrap();
    let second = client.call(&request, true).await.unwrap();
    assert_eq!(transport.request_count(), 1);
    assert_eq!(first, second);
    assert_eq!(second.parts(), ("a", "b"));

    // bypassing the cache hits the transport again
    let third = client.call(&request, false).await.unwrap();
    assert_eq!(transport.request_count(), 2);
    assert_eq!(third.content(), "fresh");

    assert_eq!(client.clear_cache().await.unwrap(), 1);
}

#[tokio::test]
async fn test_call_propagates_transport_error() {
    let mut transport = MockChatTransport::new();
    transport
        .expect_chat()
        .times(1)
        .returning(|_| Err(Error::Api("model does not support thinking".to_string())));

    let temp_dir = TempDir::new().unwrap();
    let cache = ResponseCache::new(temp_dir.path());
    let client = ThinkClient::new(Arc::new(transport), resolver()).with_cache(cache.clone());

    let result = client
        .call(&ChatRequest::new("qwen3").with_prompt("hi"), true)
        .await;
    assert!(matches!(result, Err(Error::Api(_))));
    assert_eq!(cache.clear().await.unwrap(), 0);
}

#[tokio::test]
async fn test_stream_yields_every_chunk() {
    let transport = MockTransport::new();
    transport.add_stream(text_chunks("m", &["<thi", "nk>abc</th", "ink>def"]));

    let stream = client(&transport)
        .stream(&ChatRequest::new("m").with_prompt("hi"), false)
        .await
        .unwrap();
    let items = collect(stream).await;

    assert_eq!(items.len(), 4);
    let parts: Vec<(String, String)> = items
        .iter()
        .flatten()
        .map(|r| (r.reasoning().to_string(), r.content().to_string()))
        .collect();
    assert_eq!(
        parts,
        vec![
            (String::new(), String::new()),
            ("abc".to_string(), String::new()),
            (String::new(), "def".to_string()),
            (String::new(), String::new()),
        ]
    );
    assert!(items[3].as_ref().unwrap().done);
    assert!(transport.requests()[0].stream);
}

#[tokio::test]
async fn test_stream_flushes_on_done_chunk() {
    let transport = MockTransport::new();
    transport.add_stream(text_chunks("m", &["<think>still thinking</thi"]));

    let stream = client(&transport)
        .stream(&ChatRequest::new("m").with_prompt("hi"), false)
        .await
        .unwrap();
    let items = collect(stream).await;

    assert_eq!(items.len(), 2);
    let last = items[1].as_ref().unwrap();
    assert!(last.done);
    assert_eq!(last.reasoning(), "</thi");
    assert_eq!(totals(&items), SegmentResult::new("still thinking</thi", ""));
}

#[tokio::test]
async fn test_stream_without_done_chunk_flushes_and_skips_cache() {
    let temp_dir = TempDir::new().unwrap();
    let transport = MockTransport::new();
    let mut chunks = text_chunks("m", &["<think>abc</thi"]);
    chunks.pop();
    transport.add_stream(chunks.clone());
    transport.add_stream(chunks);
    let client = client(&transport).with_cache(ResponseCache::new(temp_dir.path()));
    let request = ChatRequest::new("m").with_prompt("hi");

    let items = collect(client.stream(&request, true).await.unwrap()).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().reasoning(), "abc");
    let flushed = items[1].as_ref().unwrap();
    assert_eq!(flushed.reasoning(), "</thi");
    assert_eq!(flushed.model, "m");

    // incomplete streams are not cached
    collect(client.stream(&request, true).await.unwrap()).await;
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_stream_replays_from_cache() {
    let temp_dir = TempDir::new().unwrap();
    let transport = MockTransport::new();
    transport.add_stream(text_chunks("cogito", &["<think>", "plan", "</think>", "answer"]));
    let client = client(&transport).with_cache(ResponseCache::new(temp_dir.path()));
    let request = ChatRequest::new("cogito").with_prompt("hi");

    let live = collect(client.stream(&request, true).await.unwrap()).await;
    let replayed = collect(client.stream(&request, true).await.unwrap()).await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(live.len(), replayed.len());
    assert_eq!(totals(&live), SegmentResult::new("plan", "answer"));
    assert_eq!(totals(&replayed), totals(&live));

    // whole and streamed requests have different fingerprints
    client.call(&request, true).await.unwrap();
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_stream_error_ends_stream() {
    let mut transport = MockChatTransport::new();
    transport.expect_chat_stream().times(1).returning(|_| {
        let chunks = vec![
            Ok(text_chunks("m", &["<think>partial"]).remove(0)),
            Err(Error::Network("connection reset".to_string())),
            Ok(text_response("m", "never seen")),
        ];
        let stream: ChunkStream = Box::pin(futures::stream::iter(chunks));
        Ok(stream)
    });

    let client = ThinkClient::new(Arc::new(transport), resolver());
    let items = collect(
        client
            .stream(&ChatRequest::new("m").with_prompt("hi"), false)
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().reasoning(), "partial");
    assert!(matches!(items[1], Err(Error::Network(_))));
}

#[tokio::test]
async fn test_stream_open_failure() {
    let mut transport = MockChatTransport::new();
    transport
        .expect_chat_stream()
        .returning(|_| Err(Error::Timeout(300_000)));

    let client = ThinkClient::new(Arc::new(transport), resolver());
    let result = client
        .stream(&ChatRequest::new("m").with_prompt("hi"), false)
        .await;
    assert!(matches!(result, Err(Error::Timeout(300_000))));
}

#[tokio::test]
async fn test_stream_empty_patterns_pass_through() {
    let transport = MockTransport::new();
    transport.add_stream(text_chunks("qwen3", &["<think>", "x", "</think>"]));

    let items = collect(
        client(&transport)
            .stream(&ChatRequest::new("qwen3").with_prompt("hi"), false)
            .await
            .unwrap(),
    )
    .await;

    let contents: Vec<&str> = items.iter().flatten().map(|r| r.content()).collect();
    assert_eq!(contents, vec!["<think>", "x", "</think>", ""]);
}

#[tokio::test]
async fn test_default_think_depends_on_mode() {
    let transport = MockTransport::new();
    transport.add_response(text_response("qwen3", "ok"));
    transport.add_stream(text_chunks("qwen3", &["ok"]));
    let client = client(&transport);
    let request = ChatRequest::new("qwen3").with_prompt("hi");

    client.call(&request, false).await.unwrap();
    collect(client.stream(&request, false).await.unwrap()).await;

    let sent = transport.requests();
    assert_eq!(sent[0].think, Some(ThinkSetting::OFF));
    assert_eq!(sent[1].think, Some(ThinkSetting::Enabled(true)));

    // an explicit request wins in both modes
    let explicit = request.clone().with_think(false);
    assert_eq!(client.prepare(&explicit, true).1.think, Some(ThinkSetting::OFF));
    // rules that force the flag off still apply to streams
    let (_, shaped) = client.prepare(&ChatRequest::new("cogito").with_prompt("hi"), true);
    assert_eq!(shaped.think, Some(ThinkSetting::OFF));
}

#[tokio::test]
async fn test_stream_stops_after_done_chunk() {
    let transport = MockTransport::new();
    let mut chunks = text_chunks("m", &["<think>a</think>b"]);
    chunks.push(text_response("m", "<think>late</think>tail"));
    transport.add_stream(chunks);

    let items = collect(
        client(&transport)
            .stream(&ChatRequest::new("m").with_prompt("hi"), false)
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(items.len(), 2);
    assert!(items[1].as_ref().unwrap().done);
    assert_eq!(totals(&items), SegmentResult::new("a", "b"));
}

#[tokio::test]
async fn test_model_management() {
    let transport = MockTransport::new();
    let client = client(&transport);

    let models = client.list_models().await.unwrap();
    assert_eq!(models[0].name, crate::mock::MOCK_MODEL);

    let unloaded = client.unload("qwen3").await.unwrap();
    assert_eq!(unloaded.model, "qwen3");
    assert_eq!(unloaded.done_reason.as_deref(), Some("unload"));

    // no cache configured
    assert_eq!(client.clear_cache().await.unwrap(), 0);
}
