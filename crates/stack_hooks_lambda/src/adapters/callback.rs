use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::runtime::block_on_current;

pub trait CallbackTransport {
    /// PUTs `body` to a pre-signed callback URL and returns the HTTP status.
    fn put_status(&self, url: &str, body: &[u8]) -> Result<u16, String>;
}

/// Callback delivery over HTTPS.
///
/// The pre-signed URL is signed with an empty content type, so the header is
/// sent explicitly empty along with the exact body length.
#[derive(Debug, Clone)]
pub struct ReqwestCallbackTransport {
    client: reqwest::Client,
}

impl ReqwestCallbackTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn try_default() -> Result<Self, String> {
        reqwest::Client::builder()
            .build()
            .map(Self::new)
            .map_err(|error| format!("failed to build callback http client: {error}"))
    }
}

impl CallbackTransport for ReqwestCallbackTransport {
    fn put_status(&self, url: &str, body: &[u8]) -> Result<u16, String> {
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len())
            .body(body.to_vec());

        block_on_current(async move {
            request
                .send()
                .await
                .map(|response| response.status().as_u16())
                .map_err(|error| format!("failed to deliver status callback: {error}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    struct CapturedRequest {
        request_line: String,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    }

    /// Accepts one connection, records the request and answers with `status_line`.
    fn serve_once(status_line: &'static str) -> (String, mpsc::Receiver<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let address = listener.local_addr().expect("listener should have address");
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().expect("connection should arrive");
            let mut reader = BufReader::new(stream.try_clone().expect("stream should clone"));

            let mut request_line = String::new();
            reader
                .read_line(&mut request_line)
                .expect("request line should read");

            let mut headers = HashMap::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header should read");
                let line = line.trim_end_matches(&['\r', '\n'][..]);
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
            }

            let length = headers
                .get("content-length")
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(0);
            let mut body = vec![0u8; length];
            reader.read_exact(&mut body).expect("body should read");

            let mut stream = stream;
            stream
                .write_all(format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").as_bytes())
                .expect("response should write");

            let _ = sender.send(CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body,
            });
        });

        (format!("http://{address}/callback?signature=abc"), receiver)
    }

    fn loopback_transport() -> ReqwestCallbackTransport {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("client should build");
        ReqwestCallbackTransport::new(client)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn puts_body_with_empty_content_type_and_exact_length() {
        let (url, receiver) = serve_once("HTTP/1.1 200 OK");
        let transport = loopback_transport();
        let body = br#"{"Status":"SUCCESS"}"#;

        let status = transport.put_status(&url, body).expect("delivery should succeed");
        assert_eq!(status, 200);

        let captured = receiver.recv().expect("request should be captured");
        assert!(captured.request_line.starts_with("PUT /callback?signature=abc"));
        assert_eq!(captured.headers.get("content-type").map(String::as_str), Some(""));
        assert_eq!(
            captured.headers.get("content-length"),
            Some(&body.len().to_string())
        );
        assert_eq!(captured.body, body.to_vec());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn returns_non_success_status_without_error() {
        let (url, _receiver) = serve_once("HTTP/1.1 403 Forbidden");
        let transport = loopback_transport();

        let status = transport.put_status(&url, b"{}").expect("request should complete");
        assert_eq!(status, 403);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn connection_failure_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let address = listener.local_addr().expect("listener should have address");
        drop(listener);

        let transport = loopback_transport();
        let error = transport
            .put_status(&format!("http://{address}/callback"), b"{}")
            .expect_err("closed port should fail");
        assert!(error.contains("failed to deliver status callback"));
    }
}
