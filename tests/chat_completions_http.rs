//! HTTP-level tests for the chat-completions client.
//!
//! Each test starts a one-shot server on a loopback port, points the client
//! at it and checks both the request the client sent and how it maps the
//! canned response.

use hugo_scribe::llm::{ChatCompletionsClient, CompletionClient, CompletionOptions, LlmError};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 50,
    temperature: 0.5,
    timeout: Duration::from_secs(5),
};

/// What the server saw.
struct Captured {
    request_line: String,
    headers: Vec<String>,
    body: serde_json::Value,
}

/// Serve exactly one request with `status` and `body`, after `delay`.
fn serve_once(
    status: u16,
    body: &'static str,
    delay: Duration,
) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut headers = Vec::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            headers.push(line);
        }
        let mut raw = vec![0; content_length];
        reader.read_exact(&mut raw).unwrap();
        let _ = tx.send(Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: serde_json::from_slice(&raw).unwrap_or(serde_json::Value::Null),
        });

        thread::sleep(delay);
        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
    });

    (base_url, rx)
}

// =========================================================================
// Success
// =========================================================================

#[test]
fn sends_bearer_request_and_returns_content() {
    let (url, rx) = serve_once(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"Hello there"}}]}"#,
        Duration::ZERO,
    );
    let client = ChatCompletionsClient::new(url, "deepseek-chat", "sk-live");

    let text = client.complete("be brief", "say hi", &OPTIONS).unwrap();
    assert_eq!(text, "Hello there");

    let seen = rx.recv().unwrap();
    assert_eq!(seen.request_line, "POST /chat/completions HTTP/1.1");
    assert!(
        seen.headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case("authorization: Bearer sk-live"))
    );
    assert_eq!(seen.body["model"], "deepseek-chat");
    assert_eq!(seen.body["max_tokens"], 50);
    assert_eq!(seen.body["stream"], false);
    assert_eq!(seen.body["messages"][0]["role"], "system");
    assert_eq!(seen.body["messages"][0]["content"], "be brief");
    assert_eq!(seen.body["messages"][1]["role"], "user");
    assert_eq!(seen.body["messages"][1]["content"], "say hi");
}

#[test]
fn empty_system_prompt_sends_single_message() {
    let (url, rx) = serve_once(
        200,
        r#"{"choices":[{"message":{"content":"OK"}}]}"#,
        Duration::ZERO,
    );
    let client = ChatCompletionsClient::new(format!("{url}/"), "m", "k");

    client.complete("", "ping", &OPTIONS).unwrap();

    let seen = rx.recv().unwrap();
    assert_eq!(seen.request_line, "POST /chat/completions HTTP/1.1");
    assert_eq!(seen.body["messages"].as_array().unwrap().len(), 1);
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn unauthorized_maps_to_auth() {
    let (url, _rx) = serve_once(
        401,
        r#"{"error":{"message":"Authentication Fails"}}"#,
        Duration::ZERO,
    );
    let client = ChatCompletionsClient::new(url, "m", "bad-key");
    assert_eq!(client.complete("", "x", &OPTIONS), Err(LlmError::Auth));
}

#[test]
fn too_many_requests_maps_to_rate_limit() {
    let (url, _rx) = serve_once(429, r#"{"error":{"message":"slow down"}}"#, Duration::ZERO);
    let client = ChatCompletionsClient::new(url, "m", "k");
    assert_eq!(client.complete("", "x", &OPTIONS), Err(LlmError::RateLimit));
}

#[test]
fn server_error_passes_remote_message_through() {
    let (url, _rx) = serve_once(
        500,
        r#"{"error":{"message":"Model overloaded"}}"#,
        Duration::ZERO,
    );
    let client = ChatCompletionsClient::new(url, "m", "k");
    assert_eq!(
        client.complete("", "x", &OPTIONS),
        Err(LlmError::Upstream("Model overloaded".into()))
    );
}

#[test]
fn slow_server_maps_to_timeout() {
    let (url, _rx) = serve_once(
        200,
        r#"{"choices":[{"message":{"content":"late"}}]}"#,
        Duration::from_secs(3),
    );
    let client = ChatCompletionsClient::new(url, "m", "k");
    let options = CompletionOptions {
        timeout: Duration::from_secs(1),
        ..OPTIONS
    };
    assert_eq!(client.complete("", "x", &options), Err(LlmError::Timeout(1)));
}

#[test]
fn missing_key_never_connects() {
    // Nothing listens here; an attempted request would fail as upstream.
    let client = ChatCompletionsClient::new("http://127.0.0.1:9", "m", "  ");
    assert_eq!(client.complete("", "x", &OPTIONS), Err(LlmError::Auth));
}
