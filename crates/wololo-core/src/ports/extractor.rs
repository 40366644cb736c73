//! 비전 추출 포트.
//!
//! 백엔드는 `analyze(image) -> text` 블랙박스로 취급한다.

use async_trait::async_trait;
use std::path::Path;

use crate::error::CoreError;

/// 비전 모델 백엔드: 원격(API 키) 또는 로컬(루프백) 서버
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// 백엔드 도달 가능 여부 (요청 전 확인)
    async fn is_available(&self) -> bool;

    /// 정규화된 JPEG 이미지와 지시문을 보내고 원문 텍스트를 받는다.
    ///
    /// 전송/백엔드 오류는 `CoreError::TransientExtraction`.
    async fn submit(&self, jpeg: &[u8], instruction: &str) -> Result<String, CoreError>;

    /// 자격증명/모델 확인 (CLI `check` 명령)
    async fn verify(&self) -> Result<(), CoreError> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(CoreError::BackendUnavailable(format!(
                "{} 도달 불가",
                self.name()
            )))
        }
    }

    /// 백엔드 이름 (로그용)
    fn name(&self) -> &str;
}

/// 이미지 파일 → 원문 텍스트 추출기
///
/// 구현체: `RetryingExtractor` (wololo-network)
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    /// JSON 검증 없이 모델 응답 원문을 반환한다.
    async fn extract(&self, image_path: &Path, instruction: &str) -> Result<String, CoreError>;
}
