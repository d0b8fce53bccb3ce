//! API client for the storefront inventory and basket endpoints.
//!
//! Every method performs exactly one network round trip and mutates nothing
//! locally. Failures are purely informative; callers re-derive authoritative
//! state with [`StorefrontClient::list_basket`].

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;

use crate::error::{ApiError, Result};
use crate::types::*;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the storefront REST API.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    client: reqwest::Client,
    base_url: String,
}

impl StorefrontClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the API (e.g., "http://localhost:8000")
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn log_response(status: StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Build an [`ApiError`] from a non-success response body.
    fn error_from_body(status: StatusCode, body: &str) -> ApiError {
        if let Ok(error) = serde_json::from_str::<ApiErrorBody>(body) {
            if error.detail.is_some() || error.code.is_some() {
                let message = error
                    .detail
                    .unwrap_or_else(|| format!("Request failed with status {}", status));
                return ApiError::api(status.as_u16(), error.code, message);
            }
        }
        ApiError::api(status.as_u16(), None, format!("Request failed: {}", body))
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::error_from_body(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            ApiError::api(
                status.as_u16(),
                None,
                format!("Failed to parse response: {}", e),
            )
        })
    }

    /// Parse a response whose success body is empty (200/204 DELETE endpoints).
    async fn parse_empty_response(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            debug!("API response status: {}", status);
            return Ok(());
        }

        let body = response.text().await?;
        Self::log_response(status, &body);
        Err(Self::error_from_body(status, &body))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────

    /// List all products.
    ///
    /// GET /products/
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let url = format!("{}/products/", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::parse_response(response).await
    }

    /// Get a product by id.
    ///
    /// GET /products/{id}
    pub async fn get_product(&self, id: i64) -> Result<Product> {
        let url = format!("{}/products/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;
        Self::parse_response(response).await
    }

    /// Create a product.
    ///
    /// POST /products/
    pub async fn create_product(&self, product: ProductCreate) -> Result<Product> {
        let url = format!("{}/products/", self.base_url);
        debug!("Creating product: {:?}", product);

        let response = self.client.post(&url).json(&product).send().await?;
        Self::parse_response(response).await
    }

    /// Apply a partial update to a product.
    ///
    /// PUT /products/{id}
    pub async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product> {
        let url = format!("{}/products/{}", self.base_url, id);
        let response = self.client.put(&url).json(&update).send().await?;
        Self::parse_response(response).await
    }

    /// Delete a product.
    ///
    /// DELETE /products/{id}
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        let url = format!("{}/products/{}", self.base_url, id);
        let response = self.client.delete(&url).send().await?;
        Self::parse_empty_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Basket
    // ─────────────────────────────────────────────────────────────────────────

    /// Read the full basket, in server order.
    ///
    /// GET /basket/
    pub async fn list_basket(&self) -> Result<Vec<BasketLine>> {
        let url = format!("{}/basket/", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::parse_response(response).await
    }

    /// Add a product to the basket.
    ///
    /// POST /basket/
    pub async fn add_line(&self, product_id: i64, quantity: i32) -> Result<BasketLine> {
        let url = format!("{}/basket/", self.base_url);
        debug!("Adding product {} x{} to basket", product_id, quantity);

        let payload = NewBasketLine {
            product_id,
            quantity,
        };
        let response = self.client.post(&url).json(&payload).send().await?;
        Self::parse_response(response).await
    }

    /// Replace a basket line's quantity.
    ///
    /// PUT /basket/{id}
    pub async fn set_quantity(&self, line_id: i64, quantity: i32) -> Result<BasketLine> {
        let url = format!("{}/basket/{}", self.base_url, line_id);
        debug!("Setting basket line {} quantity to {}", line_id, quantity);

        let payload = QuantityUpdate { quantity };
        let response = self.client.put(&url).json(&payload).send().await?;
        Self::parse_response(response).await
    }

    /// Remove a basket line.
    ///
    /// DELETE /basket/{id}
    pub async fn remove_line(&self, line_id: i64) -> Result<()> {
        let url = format!("{}/basket/{}", self.base_url, line_id);
        let response = self.client.delete(&url).send().await?;
        Self::parse_empty_response(response).await
    }

    /// Clear the whole basket. Safe to call when the basket is already empty.
    ///
    /// DELETE /basket/
    pub async fn clear_basket(&self) -> Result<()> {
        let url = format!("{}/basket/", self.base_url);
        let response = self.client.delete(&url).send().await?;
        Self::parse_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex as TokioMutex;

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        method: String,
        path: String,
        body: String,
    }

    #[derive(Debug, Clone)]
    struct MockResponse {
        status: u16,
        body: String,
    }

    fn header_end_offset(buffer: &[u8]) -> Option<usize> {
        buffer.windows(4).position(|window| window == b"\r\n\r\n")
    }

    async fn read_http_request(stream: &mut tokio::net::TcpStream) -> Option<CapturedRequest> {
        let mut buffer = Vec::new();
        loop {
            let mut chunk = [0_u8; 2048];
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                return None;
            }
            buffer.extend_from_slice(&chunk[..read]);
            if header_end_offset(&buffer).is_some() {
                break;
            }
        }

        let header_end = header_end_offset(&buffer)?;
        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let mut lines = head.lines();
        let request_line = lines.next()?.to_string();
        let mut parts = request_line.split_whitespace();
        let method = parts.next()?.to_string();
        let path = parts.next()?.to_string();

        let mut headers = HashMap::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let content_length = headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);

        let mut body = buffer[header_end + 4..].to_vec();
        while body.len() < content_length {
            let mut chunk = [0_u8; 2048];
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }

        Some(CapturedRequest {
            method,
            path,
            body: String::from_utf8_lossy(&body).to_string(),
        })
    }

    fn status_text(status: u16) -> &'static str {
        match status {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Error",
        }
    }

    async fn write_http_response(
        stream: &mut tokio::net::TcpStream,
        status: u16,
        body: &str,
    ) -> std::io::Result<()> {
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            status_text(status),
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.flush().await
    }

    async fn start_mock_server(
        responses: Vec<MockResponse>,
    ) -> (
        String,
        Arc<TokioMutex<Vec<CapturedRequest>>>,
        tokio::task::JoinHandle<()>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let captured = Arc::new(TokioMutex::new(Vec::<CapturedRequest>::new()));
        let scripted = Arc::new(TokioMutex::new(VecDeque::from(responses)));
        let captured_clone = Arc::clone(&captured);
        let scripted_clone = Arc::clone(&scripted);

        let handle = tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(value) => value,
                    Err(_) => break,
                };
                let captured_inner = Arc::clone(&captured_clone);
                let scripted_inner = Arc::clone(&scripted_clone);
                tokio::spawn(async move {
                    let Some(request) = read_http_request(&mut stream).await else {
                        return;
                    };
                    captured_inner.lock().await.push(request);

                    let response = scripted_inner.lock().await.pop_front().unwrap_or(
                        MockResponse {
                            status: 500,
                            body: r#"{"detail":"unexpected request"}"#.to_string(),
                        },
                    );
                    let _ = write_http_response(&mut stream, response.status, &response.body).await;
                });
            }
        });

        (format!("http://{}", addr), captured, handle)
    }

    #[tokio::test]
    async fn list_basket_parses_lines_in_order() {
        let body = r#"[
            {"id":1,"product_id":7,"quantity":2,"product":{"id":7,"name":"Mug","price":9.5,"stock":2}},
            {"id":2,"product_id":8,"quantity":1,"product":{"id":8,"name":"Pen","price":1.25,"stock":40}}
        ]"#;
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 200,
            body: body.to_string(),
        }])
        .await;

        let client = StorefrontClient::new(&base_url);
        let lines = client.list_basket().await.expect("list basket");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, 1);
        assert_eq!(lines[0].product.price, dec!(9.5));
        assert_eq!(lines[1].product.name, "Pen");

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/basket/");

        server.abort();
    }

    #[tokio::test]
    async fn add_line_surfaces_structured_rejection_code() {
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 400,
            body: r#"{"detail":"Product is out of stock","code":"OUT_OF_STOCK"}"#.to_string(),
        }])
        .await;

        let client = StorefrontClient::new(&base_url);
        let err = client.add_line(7, 1).await.expect_err("rejected add");

        match err {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("OUT_OF_STOCK"));
                assert_eq!(message, "Product is out of stock");
            }
            other => panic!("expected Api error, got {:?}", other),
        }

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/basket/");
        assert_eq!(requests[0].body, r#"{"product_id":7,"quantity":1}"#);

        server.abort();
    }

    #[tokio::test]
    async fn set_quantity_surfaces_legacy_detail_without_code() {
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 400,
            body: r#"{"detail":"Only 2 available"}"#.to_string(),
        }])
        .await;

        let client = StorefrontClient::new(&base_url);
        let err = client.set_quantity(1, 3).await.expect_err("rejected update");

        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.error_code(), None);
        assert_eq!(err.message(), Some("Only 2 available"));

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].path, "/basket/1");
        assert_eq!(requests[0].body, r#"{"quantity":3}"#);

        server.abort();
    }

    #[tokio::test]
    async fn remove_line_accepts_empty_no_content_response() {
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 204,
            body: String::new(),
        }])
        .await;

        let client = StorefrontClient::new(&base_url);
        client.remove_line(5).await.expect("remove line");

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/basket/5");

        server.abort();
    }

    #[tokio::test]
    async fn clear_basket_accepts_plain_ok_response() {
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 200,
            body: String::new(),
        }])
        .await;

        let client = StorefrontClient::new(&base_url);
        client.clear_basket().await.expect("clear basket");

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/basket/");

        server.abort();
    }

    #[tokio::test]
    async fn create_product_posts_payload_and_parses_created() {
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 201,
            body: r#"{"id":11,"name":"Mug","price":9.5,"description":"Ceramic","stock":4}"#
                .to_string(),
        }])
        .await;

        let client = StorefrontClient::new(&base_url);
        let product = client
            .create_product(ProductCreate {
                name: "Mug".to_string(),
                price: dec!(9.5),
                description: Some("Ceramic".to_string()),
                stock: 4,
            })
            .await
            .expect("create product");

        assert_eq!(product.id, 11);
        assert_eq!(product.stock, 4);

        let requests = captured.lock().await.clone();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/products/");
        assert!(requests[0].body.contains(r#""name":"Mug""#));

        server.abort();
    }

    #[tokio::test]
    async fn unparseable_error_body_falls_back_to_raw_text() {
        let (base_url, _captured, server) = start_mock_server(vec![MockResponse {
            status: 500,
            body: "<html>gateway broke</html>".to_string(),
        }])
        .await;

        let client = StorefrontClient::new(&base_url);
        let err = client.list_products().await.expect_err("server failure");

        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.error_code(), None);
        assert!(err.message().unwrap_or_default().contains("gateway broke"));

        server.abort();
    }
}
