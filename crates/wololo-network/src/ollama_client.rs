//! Ollama 로컬 비전 백엔드.
//!
//! 루프백 서버의 `POST /api/generate`에 base64 이미지를 보낸다.
//! 도달 가능 여부는 `GET /api/tags`로 확인한다.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use wololo_core::config::OllamaConfig;
use wololo_core::error::CoreError;
use wololo_core::ports::extractor::VisionBackend;

/// Ollama 클라이언트
#[derive(Debug)]
pub struct OllamaVisionBackend {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaVisionBackend {
    pub fn new(config: &OllamaConfig) -> Result<Self, CoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        debug!(base_url = %config.base_url, model = %config.model, "OllamaVisionBackend 초기화");

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl VisionBackend for OllamaVisionBackend {
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Ollama 도달 불가: {e}");
                false
            }
        }
    }

    async fn submit(&self, jpeg: &[u8], instruction: &str) -> Result<String, CoreError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": instruction,
            "images": [B64.encode(jpeg)],
            "stream": false,
            "format": "json",
            "options": { "temperature": 0 }
        });

        debug!(model = %self.model, image_bytes = jpeg.len(), "Ollama 분석 요청");

        let resp = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::TransientExtraction(format!("Ollama 요청 실패: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CoreError::TransientExtraction(format!("Ollama 응답 읽기 실패: {e}")))?;

        if !status.is_success() {
            return Err(CoreError::TransientExtraction(format!(
                "Ollama 에러 ({status}): {text}"
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| CoreError::TransientExtraction(format!("Ollama 응답 파싱 실패: {e}")))?;
        Ok(parsed.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
