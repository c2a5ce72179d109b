//! HTTP bulk writer.

use crate::{BulkWriter, Document, Namespace, WriterError, WriterResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Request timeout for a single bulk call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request payload for one bulk write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkWriteRequest<'a> {
    batch_id: String,
    database: &'a str,
    collection: &'a str,
    documents: &'a [Document],
}

/// Response from the target.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkWriteResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Sends each batch as one JSON request to `<address>/bulk`.
///
/// A batch is attempted exactly once. Retrying belongs to whoever replays
/// a failed range of the source.
pub struct HttpBulkWriter {
    client: Client,
    endpoint: String,
    ns: Namespace,
    verbose: bool,
}

impl HttpBulkWriter {
    /// Create a writer for the target at `address`.
    pub fn new(address: &str, ns: Namespace, verbose: bool) -> WriterResult<Self> {
        let base = Url::parse(address).map_err(|e| WriterError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(WriterError::InvalidAddress {
                address: address.to_string(),
                reason: format!("unsupported scheme {}", base.scheme()),
            });
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/bulk", base.as_str().trim_end_matches('/')),
            ns,
            verbose,
        })
    }

    /// URL bulk requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BulkWriter for HttpBulkWriter {
    async fn write_bulk(&mut self, documents: Vec<Document>) -> WriterResult<()> {
        let request = BulkWriteRequest {
            batch_id: uuid::Uuid::new_v4().to_string(),
            database: &self.ns.database,
            collection: &self.ns.collection,
            documents: &documents,
        };

        if self.verbose {
            debug!(
                url = %self.endpoint,
                batch_id = %request.batch_id,
                documents = documents.len(),
                "Sending bulk write"
            );
        }

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WriterError::Rejected(format!("HTTP {}: {}", status, body)));
        }

        let result: BulkWriteResponse = response.json().await?;
        if result.success {
            Ok(())
        } else {
            Err(WriterError::Rejected(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }

    async fn close(&mut self) {
        debug!(ns = %self.ns, url = %self.endpoint, "Closed HTTP bulk writer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve exactly one request with a canned response and hand back its body.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            let request_body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                raw.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break text[split + 4..split + 4 + length].to_string();
                    }
                }
                if n == 0 {
                    break String::new();
                }
            };

            let response = format!(
                "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(request_body);
        });

        (address, rx)
    }

    #[test]
    fn new_rejects_unparseable_address() {
        let result = HttpBulkWriter::new("not a url", Namespace::new("db", "t"), false);
        assert!(matches!(result, Err(WriterError::InvalidAddress { .. })));
    }

    #[test]
    fn new_rejects_non_http_scheme() {
        let result = HttpBulkWriter::new("ftp://example.com", Namespace::new("db", "t"), false);
        assert!(matches!(result, Err(WriterError::InvalidAddress { .. })));
    }

    #[test]
    fn endpoint_appends_bulk_path() {
        let writer =
            HttpBulkWriter::new("http://localhost:8080/", Namespace::new("db", "t"), false).unwrap();
        assert_eq!(writer.endpoint(), "http://localhost:8080/bulk");
    }

    #[test]
    fn request_serializes_camel_case() {
        let documents = vec![json!({ "pk": "a" })];
        let request = BulkWriteRequest {
            batch_id: "batch-1".to_string(),
            database: "db",
            collection: "orders",
            documents: &documents,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["batchId"], "batch-1");
        assert_eq!(value["collection"], "orders");
        assert_eq!(value["documents"][0]["pk"], "a");
    }

    #[tokio::test]
    async fn write_bulk_posts_whole_batch() {
        let (address, body) = serve_once("HTTP/1.1 200 OK", r#"{"success":true}"#).await;
        let mut writer = HttpBulkWriter::new(&address, Namespace::new("db", "orders"), true).unwrap();

        writer
            .write_bulk(vec![json!({ "id": 1 }), json!({ "id": 2 })])
            .await
            .unwrap();

        let sent: serde_json::Value = serde_json::from_str(&body.await.unwrap()).unwrap();
        assert_eq!(sent["database"], "db");
        assert_eq!(sent["collection"], "orders");
        assert_eq!(sent["documents"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn write_bulk_reports_rejection_body() {
        let (address, _body) =
            serve_once("HTTP/1.1 200 OK", r#"{"success":false,"error":"duplicate key"}"#).await;
        let mut writer = HttpBulkWriter::new(&address, Namespace::new("db", "t"), false).unwrap();

        let err = writer.write_bulk(vec![json!({ "id": 1 })]).await.unwrap_err();
        assert!(matches!(err, WriterError::Rejected(msg) if msg == "duplicate key"));
    }

    #[tokio::test]
    async fn write_bulk_reports_http_status() {
        let (address, _body) =
            serve_once("HTTP/1.1 503 Service Unavailable", r#"{"success":false}"#).await;
        let mut writer = HttpBulkWriter::new(&address, Namespace::new("db", "t"), false).unwrap();

        let err = writer.write_bulk(vec![json!({ "id": 1 })]).await.unwrap_err();
        assert!(matches!(err, WriterError::Rejected(msg) if msg.starts_with("HTTP 503")));
    }
}
