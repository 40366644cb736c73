//! 활동 확인.
//!
//! 일정 주기마다 사용자가 아직 자리에 있는지 묻고, 답이 없거나 거절하면
//! 알림 루프를 멈춘다. 표준 입력은 전용 스레드에서 줄 단위로 읽는다.

use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wololo_core::config::AlertConfig;

pub const ACTIVITY_PROMPT: &str = "Are you still active? [Y/n]\n\
     (This check prevents excessive LLM API calls and reduces costs.)";

/// 표준 입력 줄 수신기. 리더 스레드는 프로세스 종료와 함께 사라진다.
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("wololo-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("표준 입력 읽기 실패: {e}");
                        break;
                    }
                }
            }
            debug!("표준 입력 종료");
        });
    if let Err(e) = spawned {
        warn!("표준 입력 스레드 생성 실패: {e}");
    }
    rx
}

/// 응답 해석: 빈 줄은 기본값 Yes
fn is_confirmation(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    )
}

/// 활동 확인 타이머
#[derive(Debug, Clone, Copy)]
pub struct ActivityCheck {
    interval: Option<Duration>,
    answer_timeout: Duration,
}

impl ActivityCheck {
    pub fn new(interval: Option<Duration>, answer_timeout: Duration) -> Self {
        Self {
            interval,
            answer_timeout,
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(
            config.activity_check_interval(),
            config.activity_answer_timeout(),
        )
    }

    /// 다음 확인 시점까지 대기. 비활성이면 끝나지 않는다.
    pub async fn wait_due(&self) {
        match self.interval {
            Some(interval) => tokio::time::sleep(interval).await,
            None => std::future::pending().await,
        }
    }

    /// 질문을 출력하고 응답을 기다린다. 거절, 무응답, 입력 종료는 모두 `false`.
    pub async fn confirm(&self, answers: &mut mpsc::UnboundedReceiver<String>) -> bool {
        // 이전에 입력된 줄은 이번 질문의 답이 아니다
        while answers.try_recv().is_ok() {}

        println!("{ACTIVITY_PROMPT}");
        match tokio::time::timeout(self.answer_timeout, answers.recv()).await {
            Ok(Some(answer)) => {
                let confirmed = is_confirmation(&answer);
                info!(confirmed, "활동 확인 응답");
                confirmed
            }
            Ok(None) => {
                warn!("표준 입력이 닫혀 활동 확인 불가");
                false
            }
            Err(_) => {
                info!(
                    timeout_secs = self.answer_timeout.as_secs(),
                    "활동 확인 응답 없음"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check() -> ActivityCheck {
        ActivityCheck::new(Some(Duration::from_secs(7200)), Duration::from_secs(60))
    }

    #[test]
    fn answers() {
        assert!(is_confirmation(""));
        assert!(is_confirmation(" Y "));
        assert!(is_confirmation("yes"));
        assert!(!is_confirmation("n"));
        assert!(!is_confirmation("No"));
        assert!(!is_confirmation("later"));
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_interval() {
        let started = tokio::time::Instant::now();
        check().wait_due().await;
        assert!(started.elapsed() >= Duration::from_secs(7200));
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_check_never_fires() {
        let disabled = ActivityCheck::new(None, Duration::from_secs(60));
        let fired = tokio::time::timeout(Duration::from_secs(86_400), disabled.wait_due()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_answer_keeps_running() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let confirm = tokio::spawn(async move { check().confirm(&mut rx).await });
        tokio::time::sleep(Duration::from_secs(5)).await;
        tx.send("y".to_string()).unwrap();
        assert!(confirm.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn no_answer_times_out() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<String>();
        let started = tokio::time::Instant::now();
        assert!(!check().confirm(&mut rx).await);
        assert!(started.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_input_is_not_an_answer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send("yes".to_string()).unwrap();
        assert!(!check().confirm(&mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn refusal_and_closed_input_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pending = tokio::spawn(async move {
            let confirmed = check().confirm(&mut rx).await;
            (confirmed, rx)
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send("n".to_string()).unwrap();
        let (confirmed, mut rx) = pending.await.unwrap();
        assert!(!confirmed);

        drop(tx);
        assert!(!check().confirm(&mut rx).await);
    }
}
