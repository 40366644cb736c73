//! 알림 디스패처.
//!
//! 오디오 큐와 플래시 큐를 하나씩 짝지어 꺼내고, 틱마다 간격(기본 2초)을
//! 둔다. 출력 실패는 로그만 남기고 다음 틱으로 넘어간다.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use wololo_core::models::alert::{AlertEvent, AudioCue, FlashSpec};
use wololo_core::ports::alert_output::{AudioPlayer, FlashPresenter};

use crate::settings::AlertSettings;

/// 드레인 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub audio_played: usize,
    pub audio_skipped: usize,
    pub audio_failed: usize,
    pub flash_presented: usize,
    pub flash_skipped: usize,
    pub flash_failed: usize,
    /// 처리한 틱 수 (오디오/플래시 한 쌍 = 1틱)
    pub ticks: usize,
}

/// 알림 디스패처
pub struct AlertDispatcher {
    audio_queue: VecDeque<AudioCue>,
    flash_queue: VecDeque<FlashSpec>,
    audio: Arc<dyn AudioPlayer>,
    flash: Arc<dyn FlashPresenter>,
    pacing: Duration,
    volume: f32,
}

impl AlertDispatcher {
    pub fn new(audio: Arc<dyn AudioPlayer>, flash: Arc<dyn FlashPresenter>) -> Self {
        Self {
            audio_queue: VecDeque::new(),
            flash_queue: VecDeque::new(),
            audio,
            flash,
            pacing: Duration::from_secs(2),
            volume: 0.35,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// 이벤트 하나를 큐에 넣는다 (오디오 큐는 있을 때만).
    pub fn enqueue(&mut self, event: &AlertEvent) {
        if let Some(cue) = &event.audio {
            self.audio_queue.push_back(cue.clone());
        }
        self.flash_queue.push_back(event.flash.clone());
        debug!(kind = %event.kind, "알림 큐 추가");
    }

    /// 대기 중인 (오디오, 플래시) 수
    pub fn pending(&self) -> (usize, usize) {
        (self.audio_queue.len(), self.flash_queue.len())
    }

    /// 두 큐가 모두 빌 때까지 출력
    pub async fn drain(&mut self, settings: AlertSettings) -> DrainReport {
        let mut report = DrainReport::default();

        while !self.audio_queue.is_empty() || !self.flash_queue.is_empty() {
            if let Some(cue) = self.audio_queue.pop_front() {
                self.play(&cue, settings, &mut report);
            }
            if let Some(flash) = self.flash_queue.pop_front() {
                self.present(&flash, settings, &mut report);
            }
            report.ticks += 1;
            tokio::time::sleep(self.pacing).await;
        }

        report
    }

    fn play(&self, cue: &AudioCue, settings: AlertSettings, report: &mut DrainReport) {
        let allowed = settings.audio_enabled
            && (!cue.is_idle_villager_cue() || settings.idle_villager_audio_enabled);
        if !allowed {
            report.audio_skipped += 1;
            return;
        }
        match self.audio.play(cue, self.volume) {
            Ok(()) => report.audio_played += 1,
            Err(e) => {
                warn!(cue = %cue, "경고음 재생 실패: {e}");
                report.audio_failed += 1;
            }
        }
    }

    fn present(&self, flash: &FlashSpec, settings: AlertSettings, report: &mut DrainReport) {
        if !settings.flash_enabled {
            report.flash_skipped += 1;
            return;
        }
        match self.flash.present(flash) {
            Ok(()) => report.flash_presented += 1,
            Err(e) => {
                warn!(text = %flash.text, "플래시 표시 실패: {e}");
                report.flash_failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::time::Instant;
    use wololo_core::error::CoreError;
    use wololo_core::models::alert::{AlertKind, FlashColor};

    #[derive(Default)]
    struct RecordingAudio {
        played: Mutex<Vec<String>>,
        fail: bool,
    }

    impl AudioPlayer for RecordingAudio {
        fn play(&self, cue: &AudioCue, _volume: f32) -> Result<(), CoreError> {
            if self.fail {
                return Err(CoreError::Dispatch("no device".into()));
            }
            self.played.lock().push(cue.file_name().to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingFlash {
        shown: Mutex<Vec<String>>,
    }

    impl FlashPresenter for RecordingFlash {
        fn present(&self, flash: &FlashSpec) -> Result<(), CoreError> {
            self.shown.lock().push(flash.text.clone());
            Ok(())
        }
    }

    fn event(file: &str, text: &str) -> AlertEvent {
        AlertEvent {
            kind: AlertKind::HouseLimit,
            audio: Some(AudioCue::new(file)),
            flash: FlashSpec::banner(FlashColor::Yellow, 100, text),
            description: String::new(),
        }
    }

    fn dispatcher(
        audio: Arc<RecordingAudio>,
        flash: Arc<RecordingFlash>,
    ) -> AlertDispatcher {
        AlertDispatcher::new(audio, flash)
    }

    #[tokio::test(start_paused = true)]
    async fn drains_in_order_with_pacing() {
        let audio = Arc::new(RecordingAudio::default());
        let flash = Arc::new(RecordingFlash::default());
        let mut d = dispatcher(audio.clone(), flash.clone());
        d.enqueue(&event("a.mp3", "A"));
        d.enqueue(&event("b.mp3", "B"));

        let start = Instant::now();
        let report = d.drain(AlertSettings::default()).await;

        assert_eq!(report.ticks, 2);
        assert_eq!(report.audio_played, 2);
        assert_eq!(report.flash_presented, 2);
        assert_eq!(*audio.played.lock(), vec!["a.mp3", "b.mp3"]);
        assert_eq!(*flash.shown.lock(), vec!["A", "B"]);
        assert!(start.elapsed() >= Duration::from_secs(4));
        assert_eq!(d.pending(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_flash_is_discarded_not_stalled() {
        let audio = Arc::new(RecordingAudio::default());
        let flash = Arc::new(RecordingFlash::default());
        let mut d = dispatcher(audio.clone(), flash.clone());
        d.enqueue(&event("a.mp3", "A"));

        let settings = AlertSettings {
            flash_enabled: false,
            ..AlertSettings::default()
        };
        let report = d.drain(settings).await;

        assert_eq!(report.flash_skipped, 1);
        assert!(flash.shown.lock().is_empty());
        assert_eq!(d.pending(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_villager_cue_has_own_toggle() {
        let audio = Arc::new(RecordingAudio::default());
        let flash = Arc::new(RecordingFlash::default());
        let mut d = dispatcher(audio.clone(), flash.clone());
        d.enqueue(&event(AudioCue::IDLE_VILLAGERS, "2 Idle Villagers!"));
        d.enqueue(&event("maison.mp3", "Build Houses!"));

        let settings = AlertSettings {
            idle_villager_audio_enabled: false,
            ..AlertSettings::default()
        };
        let report = d.drain(settings).await;

        assert_eq!(report.audio_skipped, 1);
        assert_eq!(*audio.played.lock(), vec!["maison.mp3"]);
        assert_eq!(report.flash_presented, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn audio_failure_does_not_stop_drain() {
        let audio = Arc::new(RecordingAudio {
            fail: true,
            ..RecordingAudio::default()
        });
        let flash = Arc::new(RecordingFlash::default());
        let mut d = dispatcher(audio, flash.clone());
        d.enqueue(&event("a.mp3", "A"));
        d.enqueue(&event("b.mp3", "B"));

        let report = d.drain(AlertSettings::default()).await;
        assert_eq!(report.audio_failed, 2);
        assert_eq!(report.flash_presented, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn event_without_audio_only_queues_flash() {
        let audio = Arc::new(RecordingAudio::default());
        let flash = Arc::new(RecordingFlash::default());
        let mut d = dispatcher(audio, flash);
        let mut silent = event("x.mp3", "X");
        silent.audio = None;
        d.enqueue(&silent);
        assert_eq!(d.pending(), (0, 1));
    }

    #[tokio::test]
    async fn empty_drain_returns_immediately() {
        let mut d = dispatcher(
            Arc::new(RecordingAudio::default()),
            Arc::new(RecordingFlash::default()),
        );
        assert_eq!(d.drain(AlertSettings::default()).await, DrainReport::default());
    }
}
