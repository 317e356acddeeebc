/// HTTP testing utilities
use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use pixelpost::http::server::build_router;
use pixelpost::http::state::HttpServerState;
use tower::ServiceExt; // for `oneshot`

const TEST_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// HTTP test client for making requests to our app
pub struct TestApp {
    app: axum::Router,
}

impl TestApp {
    pub fn new(state: HttpServerState) -> Self {
        Self {
            app: build_router(state, TEST_BODY_LIMIT),
        }
    }

    async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.app.clone().oneshot(request).await?;
        TestResponse::new(response).await
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder().method("GET").uri(path).body(Body::empty())?;
        self.send(request).await
    }

    pub async fn put(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder().method("PUT").uri(path).body(Body::empty())?;
        self.send(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())?;
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, json_data: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(json_data.to_string()))?;
        self.send(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    status: StatusCode,
    body: String,
}

impl TestResponse {
    async fn new(response: axum::response::Response) -> Result<Self> {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(Self {
            status,
            body: String::from_utf8(bytes.to_vec())?,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}. Body: {}",
            expected, self.status, self.body
        );
        self
    }
}
