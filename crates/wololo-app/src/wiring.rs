//! 어댑터 생성 (DI 와이어링).
//!
//! 설정 섹션 → 포트 구현체. 백엔드 선택과 폴백 규칙이 여기 모여 있다.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use wololo_core::config::{AppConfig, BackendKind, CaptureConfig, ExtractionConfig};
use wololo_core::config_manager::ConfigManager;
use wololo_core::error::CoreError;
use wololo_core::ports::capture::RegionCapturer;
use wololo_core::ports::extractor::{VisionBackend, VisionExtractor};
use wololo_core::ports::telemetry::{NoOpTelemetry, TelemetrySink};
use wololo_network::gemini_client::GeminiVisionBackend;
use wololo_network::ollama_client::OllamaVisionBackend;
use wololo_network::retry::{RetryPolicy, RetryingExtractor};
use wololo_network::telemetry_client::{HttpTelemetryClient, SessionInfo};
use wololo_vision::capture::XcapRegionCapturer;
use wololo_vision::normalize::NormalizeOptions;

/// 설정된 비전 백엔드
pub fn build_backend(config: &ExtractionConfig) -> Result<Arc<dyn VisionBackend>, CoreError> {
    let backend: Arc<dyn VisionBackend> = match config.backend {
        BackendKind::Gemini => Arc::new(GeminiVisionBackend::new(&config.gemini)?),
        BackendKind::Ollama => Arc::new(OllamaVisionBackend::new(&config.ollama)?),
    };
    info!(backend = backend.name(), "비전 백엔드 선택");
    Ok(backend)
}

/// 재시도/정규화가 붙은 추출기
pub fn build_extractor(config: &ExtractionConfig) -> Result<Arc<dyn VisionExtractor>, CoreError> {
    let backend = build_backend(config)?;
    let extractor = RetryingExtractor::new(backend)
        .with_policy(RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
        })
        .with_normalize(NormalizeOptions {
            max_dimension: config.max_image_dimension,
            jpeg_quality: config.jpeg_quality,
        });
    Ok(Arc::new(extractor))
}

/// 캡처 저장 디렉토리: 설정값이 없으면 플랫폼 캐시 디렉토리
pub fn capture_dir(config: &CaptureConfig) -> PathBuf {
    if let Some(dir) = &config.output_dir {
        return dir.clone();
    }
    match ConfigManager::default_capture_dir() {
        Ok(dir) => dir,
        Err(e) => {
            warn!("기본 캡처 디렉토리 결정 실패, 현재 디렉토리 사용: {e}");
            PathBuf::from("screenshots")
        }
    }
}

pub fn build_capturer(config: &CaptureConfig) -> Arc<dyn RegionCapturer> {
    let dir = capture_dir(config);
    info!(dir = %dir.display(), "캡처 저장 경로");
    Arc::new(XcapRegionCapturer::new(dir, config.jpeg_quality))
}

/// 텔레메트리 싱크. 비활성이거나 세션 생성에 실패하면 NoOp.
pub async fn build_telemetry(config: &AppConfig) -> Arc<dyn TelemetrySink> {
    if !config.telemetry.enabled {
        return Arc::new(NoOpTelemetry);
    }

    let client = match HttpTelemetryClient::new(
        &config.telemetry.base_url,
        Duration::from_secs(config.telemetry.timeout_secs),
    ) {
        Ok(client) => client,
        Err(e) => {
            warn!("텔레메트리 클라이언트 생성 실패: {e}");
            return Arc::new(NoOpTelemetry);
        }
    };

    if !client.check_server_status().await {
        warn!(base_url = %config.telemetry.base_url, "텔레메트리 서버 응답 없음, 비활성화");
        return Arc::new(NoOpTelemetry);
    }

    let info = SessionInfo::collect(
        &config.player.username,
        &config.player.teammates,
        env!("CARGO_PKG_VERSION"),
    );
    match client.create_session(&info).await {
        Ok(id) => {
            info!(session_id = %id, "텔레메트리 세션 생성");
            Arc::new(client)
        }
        Err(e) => {
            warn!("텔레메트리 세션 생성 실패: {e}");
            Arc::new(NoOpTelemetry)
        }
    }
}
