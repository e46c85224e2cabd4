//! A2A protocol client - Agent Card fetch and JSON-RPC message send
//!
//! The `A2aEndpoint` trait is the seam between the check pipeline and the
//! network; tests script it with in-memory fakes while `HttpA2aClient` is
//! the real reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::application::errors::ClientError;
use crate::domain::entities::{AgentCard, AGENT_CARD_PATH};

/// The two documented HTTP surfaces of an agent under test
#[async_trait]
pub trait A2aEndpoint: Send + Sync {
    /// GET the Agent Card from the well-known path
    async fn fetch_agent_card(&self) -> Result<AgentCard, ClientError>;

    /// POST a `message/send` JSON-RPC call; returns the parsed response body
    async fn send_message(&self, text: &str) -> Result<Value, ClientError>;
}

/// HTTP client bound to one agent base URL.
///
/// One instance per TestRun; every request shares the configured timeout.
/// The underlying connection pool is released when the client is dropped.
pub struct HttpA2aClient {
    base_url: String,
    client: Client,
}

impl HttpA2aClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl A2aEndpoint for HttpA2aClient {
    async fn fetch_agent_card(&self) -> Result<AgentCard, ClientError> {
        let url = format!("{}{}", self.base_url, AGENT_CARD_PATH);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        response
            .json::<AgentCard>()
            .await
            .map_err(|e| ClientError::Protocol(e.to_string()))
    }

    async fn send_message(&self, text: &str) -> Result<Value, ClientError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "message/send",
            "params": {
                "message": {
                    "messageId": Uuid::new_v4().to_string(),
                    "role": "user",
                    "parts": [
                        {"type": "text", "text": text}
                    ]
                }
            },
            "id": 1
        });

        let response = self
            .client
            .post(format!("{}/", self.base_url))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Protocol(e.to_string()))
    }
}

/// Pull the reply text out of a `message/send` JSON-RPC response.
///
/// Validates the JSON-RPC 2.0 envelope, surfaces the `error` branch
/// verbatim, and concatenates the text parts of the result. The result may
/// carry parts under `output[*]`, under `message`, or directly on itself;
/// parts are keyed by `kind` or `type`. Returns the (possibly empty)
/// concatenated text.
pub fn extract_reply(response: &Value) -> Result<String, String> {
    if response.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err("missing or invalid 'jsonrpc' version field".to_string());
    }

    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(format!("agent returned error: {}", message));
    }

    let result = response
        .get("result")
        .ok_or_else(|| "missing 'result' in JSON-RPC response".to_string())?;

    let mut text = String::new();
    if let Some(output) = result.get("output").and_then(Value::as_array) {
        for message in output {
            collect_text_parts(message, &mut text);
        }
    } else if let Some(message) = result.get("message") {
        collect_text_parts(message, &mut text);
    } else {
        collect_text_parts(result, &mut text);
    }
    Ok(text)
}

fn collect_text_parts(node: &Value, out: &mut String) {
    let Some(parts) = node.get("parts").and_then(Value::as_array) else {
        return;
    };
    for part in parts {
        let part_type = part
            .get("kind")
            .or_else(|| part.get("type"))
            .and_then(Value::as_str);
        if part_type == Some("text") {
            out.push_str(part.get("text").and_then(Value::as_str).unwrap_or(""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn reply_requires_jsonrpc_version() {
        let response = json!({"result": {"parts": [{"type": "text", "text": "hi"}]}, "id": 1});
        let err = extract_reply(&response).unwrap_err();
        assert!(err.contains("jsonrpc"), "unexpected error: {}", err);
    }

    #[test]
    fn error_branch_surfaces_message_verbatim() {
        let response = json!({
            "jsonrpc": "2.0",
            "error": {"code": -32601, "message": "Method not found"},
            "id": 1
        });
        let err = extract_reply(&response).unwrap_err();
        assert_eq!(err, "agent returned error: Method not found");
    }

    #[test]
    fn missing_result_is_an_error() {
        let response = json!({"jsonrpc": "2.0", "id": 1});
        let err = extract_reply(&response).unwrap_err();
        assert!(err.contains("result"), "unexpected error: {}", err);
    }

    #[test]
    fn reply_from_output_messages() {
        let response = json!({
            "jsonrpc": "2.0",
            "result": {
                "output": [
                    {"role": "agent", "parts": [{"type": "text", "text": "Echo: "}]},
                    {"role": "agent", "parts": [{"type": "text", "text": "hi"}]}
                ]
            },
            "id": 1
        });
        assert_eq!(extract_reply(&response).unwrap(), "Echo: hi");
    }

    #[test]
    fn reply_from_nested_message_object() {
        let response = json!({
            "jsonrpc": "2.0",
            "result": {
                "message": {
                    "role": "agent",
                    "parts": [{"kind": "text", "text": "Echo: hi"}]
                }
            },
            "id": 1
        });
        assert_eq!(extract_reply(&response).unwrap(), "Echo: hi");
    }

    #[test]
    fn reply_from_flat_result_with_kind_field() {
        let response = json!({
            "jsonrpc": "2.0",
            "result": {"parts": [{"kind": "text", "text": "Echo: hi"}]},
            "id": 1
        });
        assert_eq!(extract_reply(&response).unwrap(), "Echo: hi");
    }

    #[test]
    fn non_text_parts_are_ignored() {
        let response = json!({
            "jsonrpc": "2.0",
            "result": {
                "parts": [
                    {"type": "file", "uri": "file:///tmp/x"},
                    {"type": "text", "text": "hello there"}
                ]
            },
            "id": 1
        });
        assert_eq!(extract_reply(&response).unwrap(), "hello there");
    }

    #[test]
    fn result_without_parts_yields_empty_text() {
        let response = json!({"jsonrpc": "2.0", "result": {"status": "ok"}, "id": 1});
        assert_eq!(extract_reply(&response).unwrap(), "");
    }

    /// Minimal canned-response agent: serves the card on GET and the
    /// JSON-RPC body on POST, one connection at a time, closing after each.
    async fn spawn_fake_agent(card: Value, rpc_response: Value) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let card = card.clone();
                let rpc_response = rpc_response.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    let header_end = loop {
                        let n = match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&chunk[..n]);
                        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            break pos + 4;
                        }
                    };

                    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                    let content_length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            if name.eq_ignore_ascii_case("content-length") {
                                value.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    while buf.len() < header_end + content_length {
                        let n = match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&chunk[..n]);
                    }

                    let body = if head.starts_with("GET") {
                        card.to_string()
                    } else {
                        rpc_response.to_string()
                    };
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn http_client_fetches_and_sends_against_fake_agent() {
        let card = json!({
            "name": "echo",
            "version": "1.0.0",
            "description": "echoes input",
            "protocolVersion": "0.3"
        });
        let rpc = json!({
            "jsonrpc": "2.0",
            "result": {
                "output": [
                    {"role": "agent", "parts": [{"type": "text", "text": "Echo: hi"}]}
                ]
            },
            "id": 1
        });
        let url = spawn_fake_agent(card, rpc).await;

        let client = HttpA2aClient::new(&url, Duration::from_secs(5)).unwrap();

        let card = client.fetch_agent_card().await.unwrap();
        assert_eq!(card.name.as_deref(), Some("echo"));
        assert!(card.missing_required_fields().is_empty());

        let response = client.send_message("hi").await.unwrap();
        assert_eq!(extract_reply(&response).unwrap(), "Echo: hi");
    }

    #[tokio::test]
    async fn connection_refused_maps_to_transport_error() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}", addr);
        let client = HttpA2aClient::new(&url, Duration::from_secs(2)).unwrap();
        match client.fetch_agent_card().await {
            Err(ClientError::Transport(_)) | Err(ClientError::Timeout) => {}
            other => panic!("expected transport error, got {:?}", other.map(|c| c.name)),
        }
    }
}
