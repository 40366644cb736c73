//! 상대 문명 카운터 분석.
//!
//! 우하단 문명 패널 캡처 → (플레이어, 문명) 추출 → 카운터 데이터 렌더링.

use std::sync::Arc;
use tracing::{debug, info};

use wololo_core::error::CoreError;
use wololo_core::models::counter::CounterDataset;
use wololo_core::models::region::{CaptureNamespace, CaptureRegion};
use wololo_core::parser::parse_civ_assignments;
use wololo_core::ports::capture::RegionCapturer;
use wololo_core::ports::extractor::VisionExtractor;
use wololo_core::prompts::civ_counter_prompt;

pub struct CivCounterService {
    capturer: Arc<dyn RegionCapturer>,
    extractor: Arc<dyn VisionExtractor>,
    dataset: CounterDataset,
    prompt: String,
}

impl CivCounterService {
    pub fn new(
        capturer: Arc<dyn RegionCapturer>,
        extractor: Arc<dyn VisionExtractor>,
        dataset: CounterDataset,
        username: &str,
        teammates: &[String],
    ) -> Self {
        Self {
            capturer,
            extractor,
            dataset,
            prompt: civ_counter_prompt(username, teammates),
        }
    }

    /// 분석 한 번 실행: 표시용 텍스트 반환
    pub async fn analyze(&self) -> Result<String, CoreError> {
        let screen = self.capturer.screen_size().await?;
        let region = CaptureRegion::civilization_panel(screen);
        let path = self
            .capturer
            .capture(region, CaptureNamespace::Civilization)
            .await?;

        let text = self.extractor.extract(&path, &self.prompt).await?;
        debug!(raw = %text, "문명 패널 응답");

        let assignments = parse_civ_assignments(&text)?;
        info!(players = assignments.len(), "상대 문명 인식");
        if assignments.is_empty() {
            return Ok("No opponents detected.".to_string());
        }
        Ok(self.dataset.render(&assignments))
    }
}
