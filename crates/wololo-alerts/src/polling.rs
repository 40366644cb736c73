//! 알림 폴링 루프.
//!
//! 전용 tokio 태스크에서 사이클을 반복한다. 진행 중인 사이클은 끝까지
//! 실행하고, 사이클 사이의 대기만 종료 신호로 끊는다.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use wololo_core::error::CoreError;

use crate::pipeline::{AlertPipeline, CycleOutcome};

/// 루프 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    /// 종료 요청됨, 진행 중인 사이클이 끝나기를 기다리는 중
    Stopping,
}

/// 알림 루프: start/stop은 호스트가 호출한다.
pub struct AlertLoop {
    pipeline: Arc<Mutex<AlertPipeline>>,
    interval: Duration,
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl AlertLoop {
    pub fn new(pipeline: AlertPipeline, interval: Duration) -> Self {
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            interval,
            shutdown_tx: None,
            handle: None,
        }
    }

    pub fn state(&self) -> LoopState {
        match (&self.handle, &self.shutdown_tx) {
            (Some(handle), _) if handle.is_finished() => LoopState::Stopped,
            (Some(_), Some(_)) => LoopState::Running,
            (Some(_), None) => LoopState::Stopping,
            (None, _) => LoopState::Stopped,
        }
    }

    /// 루프 시작. 이미 실행 중이면 `Ok(false)`.
    ///
    /// 종료 중인 이전 태스크는 분리한다. 파이프라인 잠금 때문에 새 루프의
    /// 첫 사이클은 이전 사이클이 끝난 뒤에 시작된다.
    /// tokio 런타임 안에서 호출해야 한다.
    pub fn start(&mut self) -> Result<bool, CoreError> {
        match self.state() {
            LoopState::Running => {
                debug!("알림 루프 이미 실행 중");
                return Ok(false);
            }
            LoopState::Stopping => {
                debug!("종료 중인 이전 루프 태스크 분리");
                self.handle = None;
            }
            LoopState::Stopped => {}
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Internal(format!("tokio 런타임 없음: {e}")))?;

        let (tx, rx) = watch::channel(false);
        let pipeline = self.pipeline.clone();
        let interval = self.interval;
        self.handle = Some(runtime.spawn(run_loop(pipeline, interval, rx)));
        self.shutdown_tx = Some(tx);

        info!(interval_secs = interval.as_secs(), "알림 루프 시작");
        Ok(true)
    }

    /// 종료 신호만 보내고 바로 반환 (호스트 스레드용)
    pub fn request_stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
    }

    /// 종료 신호를 보내고 루프 태스크가 끝날 때까지 대기
    pub async fn stop(&mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("알림 루프 태스크 비정상 종료: {e}");
            }
        }
        info!("알림 루프 정지");
    }
}

async fn run_loop(
    pipeline: Arc<Mutex<AlertPipeline>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut cycles: u64 = 0;
    loop {
        if *shutdown.borrow() {
            break;
        }

        let outcome = pipeline.lock().await.run_cycle().await;
        cycles += 1;
        match &outcome {
            CycleOutcome::Completed { alerts, .. } => {
                debug!(cycle = cycles, alerts = alerts.len(), "사이클 완료")
            }
            CycleOutcome::ParseFailed { reason, .. } => {
                debug!(cycle = cycles, "사이클 건너뜀 (파싱 실패): {reason}")
            }
            CycleOutcome::Skipped { stage, error } => {
                debug!(cycle = cycles, ?stage, "사이클 건너뜀: {error}")
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => {
                break;
            }
        }
    }
    info!(cycles, "알림 루프 종료");
}
