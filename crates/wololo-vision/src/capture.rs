//! 스크린 캡처.
//!
//! xcap 기반 주 모니터 캡처 → 영역 잘라내기 → JPEG 저장.
//! 저장 경로: `<output_dir>/<namespace>/<YYYYmmdd-HHMMSS-mmm>.jpg`

use async_trait::async_trait;
use image::{imageops, DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;
use xcap::Monitor;

use wololo_core::error::CoreError;
use wololo_core::models::region::{CaptureNamespace, CaptureRegion, ScreenSize};
use wololo_core::ports::capture::RegionCapturer;

use crate::normalize::encode_jpeg;

/// 스크린 캡처: xcap 기반
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Self {
        Self
    }

    /// 주 모니터 스크린 캡처
    pub fn capture_primary(&self) -> Result<RgbaImage, CoreError> {
        let monitors = Monitor::all()
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))?;

        let primary = monitors.iter().position(|m| m.is_primary().unwrap_or(false));
        let monitor = match primary {
            Some(idx) => monitors.into_iter().nth(idx),
            None => monitors.into_iter().next(),
        }
        .ok_or_else(|| CoreError::Capture("모니터를 찾을 수 없음".to_string()))?;

        let image = monitor
            .capture_image()
            .map_err(|e| CoreError::Capture(format!("스크린 캡처 실패: {e}")))?;

        debug!("스크린 캡처 완료: {}x{}", image.width(), image.height());
        Ok(image)
    }
}

impl Default for ScreenCapture {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// XcapRegionCapturer: RegionCapturer 포트 구현
// ============================================================

/// 영역 캡처기: 캡처/인코딩/저장은 blocking 스레드에서 수행
pub struct XcapRegionCapturer {
    output_dir: PathBuf,
    jpeg_quality: u8,
}

impl XcapRegionCapturer {
    pub fn new(output_dir: impl Into<PathBuf>, jpeg_quality: u8) -> Self {
        Self {
            output_dir: output_dir.into(),
            jpeg_quality,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl RegionCapturer for XcapRegionCapturer {
    async fn capture(
        &self,
        region: CaptureRegion,
        namespace: CaptureNamespace,
    ) -> Result<PathBuf, CoreError> {
        let output_dir = self.output_dir.clone();
        let quality = self.jpeg_quality;

        tokio::task::spawn_blocking(move || {
            let screen = ScreenCapture::new().capture_primary()?;
            let jpeg = crop_to_jpeg(&screen, region, quality)?;
            save_capture(&output_dir, namespace, &jpeg)
        })
        .await
        .map_err(|e| CoreError::Internal(format!("캡처 작업 실패: {e}")))?
    }

    async fn screen_size(&self) -> Result<ScreenSize, CoreError> {
        tokio::task::spawn_blocking(|| {
            let screen = ScreenCapture::new().capture_primary()?;
            Ok(ScreenSize {
                width: screen.width(),
                height: screen.height(),
            })
        })
        .await
        .map_err(|e| CoreError::Internal(format!("화면 크기 조회 실패: {e}")))?
    }
}

/// 화면 이미지에서 영역을 잘라 JPEG로 인코딩 (영역은 화면 경계로 클램프)
pub fn crop_to_jpeg(
    screen: &RgbaImage,
    region: CaptureRegion,
    quality: u8,
) -> Result<Vec<u8>, CoreError> {
    let bounds = ScreenSize {
        width: screen.width(),
        height: screen.height(),
    };
    let clamped = region.clamp_to(bounds).ok_or_else(|| {
        CoreError::Capture(format!(
            "캡처 영역이 화면 밖: {:?} (화면 {}x{})",
            region, bounds.width, bounds.height
        ))
    })?;

    let cropped = imageops::crop_imm(
        screen,
        clamped.x as u32,
        clamped.y as u32,
        clamped.width,
        clamped.height,
    )
    .to_image();
    let rgb = DynamicImage::ImageRgba8(cropped).to_rgb8();
    encode_jpeg(&rgb, quality).map_err(|e| CoreError::Capture(e.to_string()))
}

/// 네임스페이스 디렉토리에 타임스탬프 파일명으로 저장
pub fn save_capture(
    output_dir: &Path,
    namespace: CaptureNamespace,
    jpeg: &[u8],
) -> Result<PathBuf, CoreError> {
    let dir = output_dir.join(namespace.dir_name());
    std::fs::create_dir_all(&dir).map_err(|e| {
        CoreError::Capture(format!("캡처 디렉토리 생성 실패: {}: {e}", dir.display()))
    })?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f");
    let path = dir.join(format!("{stamp}.jpg"));
    std::fs::write(&path, jpeg)
        .map_err(|e| CoreError::Capture(format!("캡처 저장 실패: {}: {e}", path.display())))?;

    debug!(namespace = %namespace, path = %path.display(), bytes = jpeg.len(), "캡처 저장");
    Ok(path)
}
