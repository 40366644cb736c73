//! 재시도 추출기.
//!
//! `VisionExtractor` 포트 구현. 백엔드 도달 가능 여부를 먼저 확인하고,
//! 이미지를 정규화한 뒤 고정 간격으로 재시도한다.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use wololo_core::error::CoreError;
use wololo_core::ports::extractor::{VisionBackend, VisionExtractor};
use wololo_vision::normalize::{normalize_file, NormalizeOptions};

/// 재시도 정책: 시도 횟수와 고정 지연
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (최소 1회)
    pub max_attempts: u32,
    /// 시도 간 지연
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// 재시도 + 이미지 정규화를 포함한 추출기
pub struct RetryingExtractor {
    backend: Arc<dyn VisionBackend>,
    policy: RetryPolicy,
    normalize: NormalizeOptions,
}

impl RetryingExtractor {
    pub fn new(backend: Arc<dyn VisionBackend>) -> Self {
        Self {
            backend,
            policy: RetryPolicy::default(),
            normalize: NormalizeOptions::default(),
        }
    }

    /// 재시도 정책 설정
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 정규화 옵션 설정
    pub fn with_normalize(mut self, options: NormalizeOptions) -> Self {
        self.normalize = options;
        self
    }

    async fn submit_with_retry(&self, jpeg: &[u8], instruction: &str) -> Result<String, CoreError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<CoreError> = None;

        for attempt in 1..=attempts {
            match self.backend.submit(jpeg, instruction).await {
                Ok(text) => {
                    debug!(
                        backend = self.backend.name(),
                        attempt,
                        chars = text.len(),
                        "추출 성공"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        "추출 실패 (시도 {}/{}): {e}",
                        attempt, attempts
                    );
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "알 수 없는 오류".to_string());
        Err(CoreError::BackendUnavailable(format!(
            "{} {}회 시도 모두 실패: {last}",
            self.backend.name(),
            attempts
        )))
    }
}

#[async_trait]
impl VisionExtractor for RetryingExtractor {
    async fn extract(&self, image_path: &Path, instruction: &str) -> Result<String, CoreError> {
        if !self.backend.is_available().await {
            return Err(CoreError::BackendUnavailable(format!(
                "{} 도달 불가",
                self.backend.name()
            )));
        }

        let path = image_path.to_path_buf();
        let options = self.normalize;
        let jpeg = tokio::task::spawn_blocking(move || normalize_file(&path, options))
            .await
            .map_err(|e| CoreError::Internal(format!("이미지 정규화 작업 실패: {e}")))??;

        self.submit_with_retry(&jpeg, instruction).await
    }
}
