use codematch_core::providers::embedder::openai::OpenAIEmbedder;
use codematch_core::providers::embedder::titan::TitanEmbedder;
use codematch_core::providers::embedder::Embedder;
use codematch_core::providers::llm::gemini::GeminiClient;
use codematch_core::providers::llm::openai::OpenAIClient;
use codematch_core::providers::llm::{generate_code, LlmClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn titan_embedder_sends_input_text() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(header("Authorization", "Bearer secret"))
        .and(body_json(json!({ "inputText": "def f(): pass" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "embedding": [0.5, -0.25, 1.0],
                "inputTextTokenCount": 5
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let embedder = TitanEmbedder::new(
        format!("{}/embed", server.uri()),
        "amazon.titan-embed-text-v1".into(),
        Some("secret".into()),
    );
    let v = embedder.embed("def f(): pass").await?;
    assert_eq!(v, vec![0.5, -0.25, 1.0]);
    assert_eq!(embedder.model_id(), "titan/amazon.titan-embed-text-v1");
    Ok(())
}

#[tokio::test]
async fn titan_embedder_surfaces_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;

    let embedder = TitanEmbedder::new(server.uri(), "m".into(), None);
    let err = embedder.embed("x").await.unwrap_err();
    assert!(err.to_string().contains("denied"), "{err}");
}

#[tokio::test]
async fn titan_embedder_rejects_empty_vectors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [] })))
        .mount(&server)
        .await;

    let embedder = TitanEmbedder::new(server.uri(), "m".into(), None);
    assert!(embedder.embed("x").await.is_err());
}

#[tokio::test]
async fn openai_embedder_reads_first_vector() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "embedding": [1.0, 2.0] }]
        })))
        .mount(&server)
        .await;

    let embedder =
        OpenAIEmbedder::new("text-embedding-3-small".into(), "sk-test".into()).with_base_url(server.uri());
    assert_eq!(embedder.embed("hello").await?, vec![1.0, 2.0]);
    Ok(())
}

#[tokio::test]
async fn gemini_client_joins_parts_and_strips_fences() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "```python\ndef add(a, b):\n" },
                    { "text": "    return a + b\n```" }
                ]},
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("gemini-pro".into(), "g-key".into(), 0.2, 256)
        .with_base_url(server.uri());
    assert_eq!(client.provider_name(), "gemini");
    let code = generate_code(&client, "Add two numbers").await?;
    assert_eq!(code, "def add(a, b):\n    return a + b");
    Ok(())
}

#[tokio::test]
async fn gemini_client_reports_blocked_prompts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("gemini-pro".into(), "k".into(), 0.2, 256)
        .with_base_url(server.uri());
    let err = client.complete("x").await.unwrap_err();
    assert!(err.to_string().contains("SAFETY"), "{err}");
}

#[tokio::test]
async fn openai_client_reads_message_content() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "def f():\n    return 1" } }]
        })))
        .mount(&server)
        .await;

    let client =
        OpenAIClient::new("gpt-4o-mini".into(), "sk".into(), 0.0, 128).with_base_url(server.uri());
    let resp = client.complete("one").await?;
    assert_eq!(resp.text, "def f():\n    return 1");
    assert_eq!(resp.provider, "openai");
    Ok(())
}
