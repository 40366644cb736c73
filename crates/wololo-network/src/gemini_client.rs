//! Gemini 비전 백엔드.
//!
//! `POST /v1beta/models/{model}:generateContent`: 지시문은 system instruction,
//! 이미지는 inline base64 JPEG. 온도 0, JSON 응답 MIME 지정.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use wololo_core::config::GeminiConfig;
use wololo_core::error::CoreError;
use wololo_core::ports::extractor::VisionBackend;

/// API 키 헤더
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API 클라이언트
#[derive(Debug)]
pub struct GeminiVisionBackend {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiVisionBackend {
    /// 새 클라이언트 생성: API 키가 비어 있으면 설정 에러
    pub fn new(config: &GeminiConfig) -> Result<Self, CoreError> {
        if config.api_key.trim().is_empty() {
            return Err(CoreError::Config(
                "Gemini API 키 미설정. config.json 또는 WOLOLO_GEMINI_API_KEY를 확인하세요."
                    .into(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            timeout = config.timeout_secs,
            "GeminiVisionBackend 초기화"
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
        })
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.endpoint, self.model)
    }

    fn generation_config() -> serde_json::Value {
        json!({
            "temperature": 0,
            "topP": 0.95,
            "topK": 64,
            "maxOutputTokens": 8192,
            "responseMimeType": "application/json"
        })
    }

    /// generateContent 요청 후 텍스트 추출
    async fn generate(&self, body: serde_json::Value) -> Result<String, CoreError> {
        let url = format!("{}:generateContent", self.model_url());
        let resp = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::TransientExtraction(format!("Gemini 요청 실패: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CoreError::TransientExtraction(format!("Gemini 응답 읽기 실패: {e}")))?;

        if !status.is_success() {
            return Err(CoreError::TransientExtraction(format!(
                "Gemini API 에러 ({status}): {text}"
            )));
        }

        parse_generate_response(&text)
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// `candidates[0].content.parts[*].text` 연결
fn parse_generate_response(body: &str) -> Result<String, CoreError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CoreError::TransientExtraction(format!("Gemini 응답 파싱 실패: {e}")))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CoreError::TransientExtraction(
            "Gemini 응답에 텍스트 없음".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl VisionBackend for GeminiVisionBackend {
    async fn is_available(&self) -> bool {
        match self
            .http_client
            .get(self.model_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Gemini 도달 불가: {e}");
                false
            }
        }
    }

    async fn submit(&self, jpeg: &[u8], instruction: &str) -> Result<String, CoreError> {
        let body = json!({
            "system_instruction": { "parts": [{ "text": instruction }] },
            "contents": [{
                "role": "user",
                "parts": [
                    { "inline_data": { "mime_type": "image/jpeg", "data": B64.encode(jpeg) } },
                    { "text": "Analyze this screenshot." }
                ]
            }],
            "generationConfig": Self::generation_config()
        });

        debug!(model = %self.model, image_bytes = jpeg.len(), "Gemini 분석 요청");
        self.generate(body).await
    }

    /// API 키 확인: 텍스트 전용 요청
    async fn verify(&self) -> Result<(), CoreError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Ping." }] }],
            "generationConfig": { "temperature": 0, "maxOutputTokens": 8 }
        });
        self.generate(body)
            .await
            .map(|_| ())
            .map_err(|e| CoreError::BackendUnavailable(format!("Gemini API 키 확인 실패: {e}")))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
