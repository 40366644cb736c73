//! 종료 제어.
//!
//! OS 시그널과 활동 확인 실패를 하나의 종료 사유로 모아 구독자에게 알린다.

use std::future::Future;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::activity::ActivityCheck;

/// 알림 루프 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Ctrl+C / SIGTERM
    Signal,
    /// 활동 확인에 응답하지 않았거나 거절함
    Inactive,
}

/// 종료 제어기
pub struct ShutdownController {
    tx: watch::Sender<Option<StopReason>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<StopReason>> {
        self.tx.subscribe()
    }

    pub fn trigger(&self, reason: StopReason) {
        info!(?reason, "종료 신호 발송");
        self.tx.send_replace(Some(reason));
    }

    /// 시그널이나 비활성 판정 중 먼저 오는 쪽까지 대기한 뒤 종료 신호를 보낸다.
    pub async fn wait(
        &self,
        activity: ActivityCheck,
        answers: &mut mpsc::UnboundedReceiver<String>,
    ) -> StopReason {
        let reason = supervise(os_signal(), activity, answers).await;
        self.trigger(reason);
        reason
    }
}

/// 활동 확인을 반복하면서 `signal`을 기다린다. 확인 중에도 시그널이 우선한다.
pub async fn supervise<F>(
    signal: F,
    activity: ActivityCheck,
    answers: &mut mpsc::UnboundedReceiver<String>,
) -> StopReason
where
    F: Future<Output = ()>,
{
    tokio::pin!(signal);
    loop {
        tokio::select! {
            _ = &mut signal => return StopReason::Signal,
            _ = activity.wait_due() => {}
        }
        tokio::select! {
            _ = &mut signal => return StopReason::Signal,
            confirmed = activity.confirm(answers) => {
                if !confirmed {
                    return StopReason::Inactive;
                }
            }
        }
    }
}

/// OS 종료 시그널 대기. 핸들러 등록에 실패하면 기본 동작에 맡기고 끝나지 않는다.
async fn os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => info!("SIGINT 수신"),
                    _ = sigterm.recv() => info!("SIGTERM 수신"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => warn!("시그널 핸들러 등록 실패: {e}"),
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C 수신");
                return;
            }
            Err(e) => warn!("Ctrl+C 핸들러 등록 실패: {e}"),
        }
    }

    std::future::pending::<()>().await
}
