//! 알림 파이프라인: 사이클 한 번의 전체 흐름.
//!
//! 캡처 → 추출 → 파싱 → 규칙 평가 → 큐 적재 → 드레인. 어떤 단계의
//! 실패도 사이클 밖으로 전파하지 않고 [`CycleOutcome`]으로 돌려준다.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use wololo_core::error::CoreError;
use wololo_core::models::alert::AlertKind;
use wololo_core::models::game_state::GameState;
use wololo_core::models::region::{CaptureNamespace, CaptureRegion};
use wololo_core::parser::parse_game_state;
use wololo_core::ports::capture::RegionCapturer;
use wololo_core::ports::extractor::VisionExtractor;
use wololo_core::ports::telemetry::{NoOpTelemetry, TelemetrySink};
use wololo_core::prompts::RESOURCE_CHECK_PROMPT;

use crate::dispatcher::{AlertDispatcher, DrainReport};
use crate::rules::{CooldownState, RuleEvaluator, RuleThresholds};
use crate::settings::AlertToggles;

/// 사이클이 중단된 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Capture,
    Extraction,
}

/// 사이클 결과
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// 평가와 디스패치까지 완료 (알림이 없어도 해당)
    Completed {
        state: GameState,
        alerts: Vec<AlertKind>,
        report: DrainReport,
    },
    /// 응답 파싱 실패: 이번 사이클 건너뜀
    ParseFailed { raw: String, reason: String },
    /// 캡처/추출 실패: 이번 사이클 건너뜀
    Skipped { stage: CycleStage, error: String },
}

impl CycleOutcome {
    /// 발생한 알림 종류 (완료된 사이클만)
    pub fn alerts(&self) -> &[AlertKind] {
        match self {
            CycleOutcome::Completed { alerts, .. } => alerts,
            _ => &[],
        }
    }
}

/// 알림 파이프라인
pub struct AlertPipeline {
    capturer: Arc<dyn RegionCapturer>,
    extractor: Arc<dyn VisionExtractor>,
    telemetry: Arc<dyn TelemetrySink>,
    toggles: Arc<AlertToggles>,
    evaluator: RuleEvaluator,
    dispatcher: AlertDispatcher,
    cooldowns: CooldownState,
    region: Option<CaptureRegion>,
    prompt: String,
}

impl AlertPipeline {
    pub fn new(
        capturer: Arc<dyn RegionCapturer>,
        extractor: Arc<dyn VisionExtractor>,
        dispatcher: AlertDispatcher,
        toggles: Arc<AlertToggles>,
    ) -> Self {
        Self {
            capturer,
            extractor,
            telemetry: Arc::new(NoOpTelemetry),
            toggles,
            evaluator: RuleEvaluator::default(),
            dispatcher,
            cooldowns: CooldownState::new(),
            region: None,
            prompt: RESOURCE_CHECK_PROMPT.to_string(),
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RuleThresholds) -> Self {
        self.evaluator = RuleEvaluator::new(thresholds);
        self
    }

    /// 자원 바 영역 고정 (기본값은 첫 사이클에 화면 크기로 계산)
    pub fn with_region(mut self, region: CaptureRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn toggles(&self) -> &Arc<AlertToggles> {
        &self.toggles
    }

    async fn resource_region(&mut self) -> Result<CaptureRegion, CoreError> {
        if let Some(region) = self.region {
            return Ok(region);
        }
        let screen = self.capturer.screen_size().await?;
        let region = CaptureRegion::resource_bar(screen);
        debug!(?screen, ?region, "자원 바 영역 계산");
        self.region = Some(region);
        Ok(region)
    }

    /// 사이클 한 번 실행
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let capture = match self.resource_region().await {
            Ok(region) => self.capturer.capture(region, CaptureNamespace::Resources).await,
            Err(e) => Err(e),
        };
        let image_path = match capture {
            Ok(path) => path,
            Err(e) => {
                warn!("자원 바 캡처 실패: {e}");
                return CycleOutcome::Skipped {
                    stage: CycleStage::Capture,
                    error: e.to_string(),
                };
            }
        };

        let extracted = self.extractor.extract(&image_path, &self.prompt).await;
        self.telemetry
            .record_action("resource_check", "Resource check performed");

        let text = match extracted {
            Ok(text) => text,
            Err(e) => {
                error!(fatal = e.is_cycle_fatal(), "자원 분석 실패: {e}");
                self.telemetry
                    .record_action("resource_analysis_error", &format!("Extraction failed: {e}"));
                return CycleOutcome::Skipped {
                    stage: CycleStage::Extraction,
                    error: e.to_string(),
                };
            }
        };

        let state = match parse_game_state(&text) {
            Ok(state) => state,
            Err(e) => {
                error!(raw = %e.raw(), "응답 파싱 실패: {e}");
                self.telemetry.record_action(
                    "resource_analysis_error",
                    &format!("Failed to parse AI analysis response: {}", e.raw()),
                );
                return CycleOutcome::ParseFailed {
                    raw: e.raw().to_string(),
                    reason: e.to_string(),
                };
            }
        };

        if self.cooldowns.observe_age(state.age) {
            if let Some(age) = state.age {
                info!(%age, "새 시대 진입");
                self.telemetry
                    .record_action("age_reached", &format!("Reached {age}"));
            }
        }

        let alerts = self
            .evaluator
            .evaluate(&state, &mut self.cooldowns, Instant::now());
        for alert in &alerts {
            info!(kind = %alert.kind, "{}", alert.description);
            self.telemetry
                .record_action(alert.kind.action_type(), &alert.description);
            self.dispatcher.enqueue(alert);
        }

        let report = self.dispatcher.drain(self.toggles.snapshot()).await;
        debug!(?report, "알림 드레인 완료");

        CycleOutcome::Completed {
            alerts: alerts.iter().map(|a| a.kind).collect(),
            state,
            report,
        }
    }
}
