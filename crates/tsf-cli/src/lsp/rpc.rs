//! JSON-RPC messages with `Content-Length` framing.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// An incoming request or notification. Requests carry an `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Message {
    pub const fn is_request(&self) -> bool {
        self.id.is_some()
    }
}

pub fn response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

pub fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

pub fn notification(method: &str, params: Value) -> Value {
    json!({ "jsonrpc": "2.0", "method": method, "params": params })
}

/// Reads one framed message. Returns `None` at end of input.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Message>>
where
    R: AsyncBufRead + Unpin,
{
    let mut length: Option<usize> = None;
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header).await? == 0 {
            return Ok(None);
        }
        let line = header.trim_end();
        if line.is_empty() {
            if length.is_some() {
                break;
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                let value = value.trim();
                length = Some(value.parse().with_context(|| format!("invalid Content-Length {value:?}"))?);
            }
        }
    }

    let Some(length) = length else {
        bail!("message without Content-Length");
    };
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await?;
    let message = serde_json::from_slice(&body).context("malformed JSON-RPC message")?;
    Ok(Some(message))
}

/// Writes one framed message.
pub async fn write_message<W>(writer: &mut W, message: &Value) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(message)?;
    writer
        .write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())
        .await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Frames a message into bytes.
pub fn encode(message: &Value) -> Vec<u8> {
    let body = message.to_string();
    format!("Content-Length: {}\r\n\r\n{body}", body.len()).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::BufReader;

    #[tokio::test]
    async fn reads_framed_messages_in_sequence() {
        let mut input = encode(&json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}));
        input.extend(encode(&json!({"jsonrpc": "2.0", "method": "initialized", "params": {}})));
        let mut reader = BufReader::new(input.as_slice());

        let first = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(first.method, "initialize");
        assert!(first.is_request());

        let second = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(second.method, "initialized");
        assert!(!second.is_request());

        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn accepts_extra_headers() {
        let body = r#"{"jsonrpc":"2.0","method":"exit"}"#;
        let input = format!(
            "Content-Type: application/vscode-jsonrpc; charset=utf-8\r\ncontent-length: {}\r\n\r\n{body}",
            body.len()
        );
        let mut reader = BufReader::new(input.as_bytes());
        let message = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(message.method, "exit");
        assert_eq!(message.params, Value::Null);
    }

    #[tokio::test]
    async fn rejects_bad_length() {
        let mut reader = BufReader::new("Content-Length: abc\r\n\r\n{}".as_bytes());
        assert!(read_message(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn write_then_read_preserves_body() {
        let mut buffer = Vec::new();
        let message = notification("window/logMessage", json!({"message": "zażółć"}));
        write_message(&mut buffer, &message).await.unwrap();
        assert_eq!(buffer, encode(&message));
    }
}
