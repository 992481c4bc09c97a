use std::time::Duration;

use categorizer::inference::types::{InferenceConfig, OllamaApi};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
};

/// What the mock server saw for the single request it accepted.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub body: serde_json::Value,
}

pub struct MockServer {
    pub endpoint: String,
    captured: oneshot::Receiver<CapturedRequest>,
}

impl MockServer {
    pub async fn captured(self) -> CapturedRequest {
        self.captured.await.expect("server should capture the request")
    }
}

/// Serves exactly one HTTP response, then closes the connection.
pub async fn spawn_http_server(status: &'static str, content_type: &'static str, body: String) -> MockServer {
    spawn_chunked_server(status, content_type, vec![body.into_bytes()]).await
}

/// Like [`spawn_http_server`], but writes the body in separate writes with a
/// pause between them so the client sees the chunk boundaries.
pub async fn spawn_chunked_server(
    status: &'static str,
    content_type: &'static str,
    chunks: Vec<Vec<u8>>,
) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let address = listener.local_addr().expect("local addr should exist");
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept should succeed");
        let captured = read_request(&mut stream).await;
        let _ = tx.send(captured);

        let content_length = chunks.iter().map(Vec::len).sum::<usize>();
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
            status, content_length, content_type
        );
        stream
            .write_all(head.as_bytes())
            .await
            .expect("headers should be written");
        for chunk in chunks {
            stream
                .write_all(&chunk)
                .await
                .expect("body chunk should be written");
            stream.flush().await.expect("body chunk should flush");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let _ = stream.shutdown().await;
    });

    MockServer {
        endpoint: format!("http://{}", address),
        captured: rx,
    }
}

pub async fn spawn_json_server(status: &'static str, body: serde_json::Value) -> MockServer {
    spawn_http_server(status, "application/json", body.to_string()).await
}

pub fn config_for(endpoint: &str, api: OllamaApi) -> InferenceConfig {
    InferenceConfig {
        endpoint: endpoint.to_string(),
        api,
        model: "medllama2".to_string(),
        request_timeout_ms: Some(5_000),
    }
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).await.expect("request should be readable");
        assert!(read > 0, "client closed before sending headers");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = find_header_end(&buffer) {
            break position;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let read = stream.read(&mut chunk).await.expect("body should be readable");
        assert!(read > 0, "client closed before sending the body");
        buffer.extend_from_slice(&chunk[..read]);
    }

    let body = &buffer[body_start..body_start + content_length];
    CapturedRequest {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: serde_json::from_slice(body).unwrap_or(serde_json::Value::Null),
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}
