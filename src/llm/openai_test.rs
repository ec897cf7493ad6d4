use super::*;

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-5-nano",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "  Hello!\n" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text, "Hello!");
    assert_eq!(resp.model, "gpt-5-nano");
    assert_eq!(resp.finish_reason, "stop");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn parse_null_content_is_empty_text() {
    let json = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": null }, "finish_reason": "length" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert!(resp.text.is_empty());
    assert_eq!(resp.finish_reason, "length");
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn parse_missing_choices_errors() {
    let json = serde_json::json!({ "model": "gpt-5-nano", "choices": [] }).to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_invalid_json_errors() {
    assert!(matches!(parse_chat_completions_response("not json"), Err(LlmError::ApiParse(_))));
}

#[test]
fn build_messages_prepends_system() {
    let history = vec![Message::user("hi"), Message::assistant("hello")];
    let msgs = build_messages("be kind", &history);
    let value = serde_json::to_value(&msgs).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            { "role": "system", "content": "be kind" },
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "hello" }
        ])
    );
}

#[test]
fn build_messages_skips_blank_system() {
    let history = vec![Message::user("hi")];
    assert_eq!(build_messages("  ", &history).len(), 1);
}
