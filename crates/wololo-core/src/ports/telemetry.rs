//! 텔레메트리 포트.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// 사용 이벤트 기록기: fire-and-forget. 전송 실패는 파이프라인에 영향을 주지 않는다.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    fn record_action(&self, action_type: &str, description: &str);

    /// 전송 중인 액션을 최대 `timeout`까지 기다린다. 종료 직전에 호출한다.
    async fn flush(&self, _timeout: Duration) {}
}

/// 텔레메트리 비활성 시 사용하는 No-Op 구현
pub struct NoOpTelemetry;

impl TelemetrySink for NoOpTelemetry {
    fn record_action(&self, action_type: &str, _description: &str) {
        trace!(action_type, "[NoOp] 텔레메트리 생략");
    }
}
