use super::*;
use arena_core::TokenUsage;
use arena_runner::AgentError;
use serde_json::{json, Map};

#[test]
fn params_become_generation_config() {
    let mut params = Map::new();
    params.insert("temperature".into(), json!(0.4));
    params.insert("maxOutputTokens".into(), json!(512));

    let body = gemini_request_body("You are a chess player.", "Your move", &params);
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a chess player.");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Your move");
    assert_eq!(body["generationConfig"]["temperature"], 0.4);
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
}

#[test]
fn empty_config_and_system_prompt_are_omitted() {
    let body = gemini_request_body("", "Your move", &Map::new());
    assert!(body.get("systemInstruction").is_none());
    assert!(body.get("generationConfig").is_none());
}

#[test]
fn candidate_parts_are_joined() {
    let body = json!({
        "candidates": [{ "content": { "parts": [{ "text": "Thinking... " }, { "text": "[e7e5]" }] } }],
        "usageMetadata": { "promptTokenCount": 300, "candidatesTokenCount": 12, "totalTokenCount": 340 }
    });
    let reply = parse_gemini_response(&body).unwrap();
    assert_eq!(reply.text, "Thinking... [e7e5]");
    // total may include tokens not counted in either side
    assert_eq!(reply.usage, TokenUsage::new(300, 12, 340));
}

#[test]
fn blocked_prompt_is_a_response_error() {
    let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
    let err = parse_gemini_response(&body).unwrap_err();
    assert!(matches!(err, AgentError::Response(msg) if msg == "prompt blocked: SAFETY"));
}

#[test]
fn endpoint_includes_model() {
    let mut spec = AgentSpec::new(Provider::Gemini, "gemini-2.5-flash");
    spec.base_url = Some("https://example.test/v1beta/".into());
    let agent = GeminiAgent::new(&spec, "key").unwrap();
    assert_eq!(
        agent.endpoint(),
        "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
    );
}
