//! 알림 파이프라인 통합 테스트.
//!
//! 추출 응답 → 파싱 → 규칙 → 디스패치 → 호스트 채널까지 크레이트 경계를
//! 넘어 검증한다.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use wololo_alerts::dispatcher::AlertDispatcher;
use wololo_alerts::flash::ChannelFlashPresenter;
use wololo_alerts::pipeline::{AlertPipeline, CycleOutcome};
use wololo_alerts::settings::AlertToggles;
use wololo_core::error::CoreError;
use wololo_core::models::alert::{AlertKind, AudioCue, FlashColor};
use wololo_core::models::game_state::Resource;
use wololo_core::models::region::{CaptureNamespace, CaptureRegion, ScreenSize};
use wololo_core::ports::alert_output::AudioPlayer;
use wololo_core::ports::capture::RegionCapturer;
use wololo_core::ports::extractor::VisionExtractor;

struct FixedCapturer;

#[async_trait]
impl RegionCapturer for FixedCapturer {
    async fn capture(
        &self,
        _region: CaptureRegion,
        _namespace: CaptureNamespace,
    ) -> Result<PathBuf, CoreError> {
        Ok(PathBuf::from("resources.jpg"))
    }

    async fn screen_size(&self) -> Result<ScreenSize, CoreError> {
        Ok(ScreenSize {
            width: 1920,
            height: 1080,
        })
    }
}

struct FixedExtractor(&'static str);

#[async_trait]
impl VisionExtractor for FixedExtractor {
    async fn extract(&self, _image: &Path, _instruction: &str) -> Result<String, CoreError> {
        Ok(self.0.to_string())
    }
}

#[derive(Default)]
struct RecordingAudio {
    played: Mutex<Vec<(String, f32)>>,
}

impl AudioPlayer for RecordingAudio {
    fn play(&self, cue: &AudioCue, volume: f32) -> Result<(), CoreError> {
        self.played.lock().push((cue.file_name().to_string(), volume));
        Ok(())
    }
}

const STONE_IDLE_CASTLE: &str = r#"```json
{
  "Resources": {"Wood": "820", "Food": "640", "Gold": "910", "Stone": "700"},
  "Villagers_on_resource": {"Wood": 40, "Food": 38, "Gold": 20, "Stone": 4},
  "Villagers": 104,
  "Idle Villagers": 2,
  "Units": {"number of villagers": 104, "number of total units": 150, "Current House limit": 200},
  "Current_age": "Castle Age",
  "Time": "00:24:05"
}
```"#;

#[tokio::test(start_paused = true)]
async fn stone_and_idle_scenario_end_to_end() {
    let audio = Arc::new(RecordingAudio::default());
    let (flash, mut flash_rx) = ChannelFlashPresenter::channel();
    let dispatcher = AlertDispatcher::new(audio.clone(), Arc::new(flash)).with_volume(0.35);

    let mut pipeline = AlertPipeline::new(
        Arc::new(FixedCapturer),
        Arc::new(FixedExtractor(STONE_IDLE_CASTLE)),
        dispatcher,
        Arc::new(AlertToggles::default()),
    );

    let started = tokio::time::Instant::now();
    let outcome = pipeline.run_cycle().await;

    assert_eq!(
        outcome.alerts(),
        &[
            AlertKind::FloatingResource(Resource::Stone),
            AlertKind::IdleVillagers(2)
        ]
    );

    let played = audio.played.lock().clone();
    assert_eq!(played.len(), 2);
    assert_eq!(played[0].0, "floating_stone.mp3");
    assert_eq!(played[1].0, AudioCue::IDLE_VILLAGERS);
    assert!((played[0].1 - 0.35).abs() < f32::EPSILON);

    let first = flash_rx.try_recv().unwrap();
    let second = flash_rx.try_recv().unwrap();
    assert!(flash_rx.try_recv().is_err());
    assert_eq!(first.text, "Use Stone!");
    assert_eq!(first.color, FlashColor::Grey);
    assert_eq!(first.position, (0, 200));
    assert_eq!(second.text, "2 Idle Villagers!");
    assert_eq!(second.position, (0, 400));

    // 두 쌍 → 틱 두 번 × 2초
    assert!(started.elapsed() >= Duration::from_secs(4));
    match outcome {
        CycleOutcome::Completed { report, .. } => {
            assert_eq!(report.ticks, 2);
            assert_eq!(report.audio_played, 2);
            assert_eq!(report.flash_presented, 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn refusal_text_produces_no_output() {
    let audio = Arc::new(RecordingAudio::default());
    let (flash, mut flash_rx) = ChannelFlashPresenter::channel();
    let dispatcher = AlertDispatcher::new(audio.clone(), Arc::new(flash));

    let mut pipeline = AlertPipeline::new(
        Arc::new(FixedCapturer),
        Arc::new(FixedExtractor("Sorry, the screenshot is too blurry to read.")),
        dispatcher,
        Arc::new(AlertToggles::default()),
    );

    let outcome = pipeline.run_cycle().await;

    match outcome {
        CycleOutcome::ParseFailed { raw, .. } => {
            assert_eq!(raw, "Sorry, the screenshot is too blurry to read.")
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(audio.played.lock().is_empty());
    assert!(flash_rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn host_toggles_apply_on_next_drain() {
    let audio = Arc::new(RecordingAudio::default());
    let (flash, mut flash_rx) = ChannelFlashPresenter::channel();
    let toggles = Arc::new(AlertToggles::default());
    let dispatcher = AlertDispatcher::new(audio.clone(), Arc::new(flash));

    let mut pipeline = AlertPipeline::new(
        Arc::new(FixedCapturer),
        Arc::new(FixedExtractor(STONE_IDLE_CASTLE)),
        dispatcher,
        toggles.clone(),
    );

    toggles.set_flash(false);
    toggles.set_idle_villager_audio(false);
    pipeline.run_cycle().await;

    let played = audio.played.lock().clone();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].0, "floating_stone.mp3");
    assert!(flash_rx.try_recv().is_err());
}
