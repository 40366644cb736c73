//! 화면 캡처 포트.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::CoreError;
use crate::models::region::{CaptureNamespace, CaptureRegion, ScreenSize};

/// 화면 영역 캡처기
///
/// 구현체: `XcapRegionCapturer` (wololo-vision)
#[async_trait]
pub trait RegionCapturer: Send + Sync {
    /// 영역을 캡처해 손실 압축 이미지로 저장하고 경로를 반환한다.
    /// 영역은 화면 경계로 잘라낸다. 재시도하지 않는다.
    async fn capture(
        &self,
        region: CaptureRegion,
        namespace: CaptureNamespace,
    ) -> Result<PathBuf, CoreError>;

    /// 주 모니터 크기
    async fn screen_size(&self) -> Result<ScreenSize, CoreError>;
}
