use crate::{
    client::traits::ImageBackend,
    config::StudioConfig,
    error::{Result, StudioError},
    models::{GenerationRequest, GenerationResponse},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Clone)]
pub struct HttpImageBackend {
    client: Client,
    endpoint: String,
}

impl HttpImageBackend {
    pub fn new(config: &StudioConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(StudioError::ConfigError(
                "Generation endpoint is required".into(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| StudioError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageBackend for HttpImageBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        log::info!(
            "Requesting {}x{} image (seed {}, {} steps)",
            request.width.pixels(),
            request.height.pixels(),
            request.seed,
            request.num_steps
        );
        log::debug!(
            "Payload carries source: {}, mask: {}",
            request.image.is_some(),
            request.mask.is_some()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Transport error calling {}: {}", self.endpoint, e);
                StudioError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Generation failed with status {}: {}", status, body);
            let message = if body.is_empty() {
                format!("HTTP error! status: {}", status.as_u16())
            } else {
                body
            };
            return Err(StudioError::network(Some(status.as_u16()), message));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let image_data = response.bytes().await?.to_vec();

        if image_data.is_empty() {
            return Err(StudioError::UnknownFailure(
                "Service returned an empty image".into(),
            ));
        }

        log::debug!("Received {} bytes ({:?})", image_data.len(), content_type);

        Ok(GenerationResponse {
            image_data,
            content_type,
        })
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return a backend
    /// pointed at it.
    async fn canned_backend(status_line: &'static str, body: &'static str) -> HttpImageBackend {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        let config = StudioConfig::new()
            .with_endpoint(format!("http://{}/generate-image", addr))
            .with_timeout(5);
        HttpImageBackend::new(&config).unwrap()
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= end + 4 + length
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced_verbatim() {
        let backend = canned_backend("HTTP/1.1 500 Internal Server Error", "model overloaded").await;
        let err = backend
            .generate(&GenerationRequest::text("x"))
            .await
            .unwrap_err();
        match err {
            StudioError::NetworkFailure { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "model overloaded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_error_body_falls_back_to_status() {
        let backend = canned_backend("HTTP/1.1 502 Bad Gateway", "").await;
        let err = backend
            .generate(&GenerationRequest::text("x"))
            .await
            .unwrap_err();
        match err {
            StudioError::NetworkFailure { status, message } => {
                assert_eq!(status, Some(502));
                assert_eq!(message, "HTTP error! status: 502");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_success_body_is_unknown_failure() {
        let backend = canned_backend("HTTP/1.1 200 OK", "").await;
        let err = backend
            .generate(&GenerationRequest::text("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::UnknownFailure(_)));
    }

    #[tokio::test]
    async fn test_success_returns_raw_bytes() {
        let backend = canned_backend("HTTP/1.1 200 OK\r\nContent-Type: image/png", "PNGDATA").await;
        let response = backend.generate(&GenerationRequest::text("x")).await.unwrap();
        assert_eq!(response.image_data, b"PNGDATA".to_vec());
        assert_eq!(response.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_backend_rejects_blank_endpoint() {
        let config = StudioConfig::new().with_endpoint("  ");
        assert!(matches!(
            HttpImageBackend::new(&config),
            Err(StudioError::ConfigError(_))
        ));
    }

    #[test]
    fn test_backend_uses_configured_endpoint() {
        let config = StudioConfig::new()
            .with_endpoint("http://127.0.0.1:9/generate-image")
            .with_timeout(5);
        let backend = HttpImageBackend::new(&config).unwrap();
        assert_eq!(backend.endpoint(), "http://127.0.0.1:9/generate-image");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_failure() {
        let config = StudioConfig::new()
            .with_endpoint("http://127.0.0.1:9/generate-image")
            .with_timeout(5);
        let backend = HttpImageBackend::new(&config).unwrap();
        let err = backend
            .generate(&GenerationRequest::text("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::NetworkFailure { status: None, .. }));
    }
}
