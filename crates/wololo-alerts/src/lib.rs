//! # wololo-alerts
//!
//! 게임 상태 → 알림 파이프라인.
//!
//! - [`rules`]: 규칙 평가기와 쿨다운 상태
//! - [`dispatcher`]: 오디오/플래시 큐 디스패처
//! - [`settings`]: 런타임 출력 토글
//! - [`audio`]: rodio 경고음 재생기
//! - [`flash`]: 호스트로 플래시를 넘기는 채널
//! - [`pipeline`]: 캡처부터 드레인까지 사이클 한 번
//! - [`polling`]: 주기 실행 루프

pub mod audio;
pub mod dispatcher;
pub mod flash;
pub mod pipeline;
pub mod polling;
pub mod rules;
pub mod settings;
