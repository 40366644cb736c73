//! WOLOLO 핵심 에러 타입.
//!
//! 모든 어댑터 crate가 공유한다. 알림 파이프라인은 이 분류에 따라
//! 사이클 중단 / 재시도 / 로그 후 진행을 결정한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 화면 캡처 실패 (OS 레벨, 영역 범위 밖 등)
    #[error("캡처 실패: {0}")]
    Capture(String),

    /// 비전 백엔드 도달 불가 또는 재시도 소진
    #[error("비전 백엔드 사용 불가: {0}")]
    BackendUnavailable(String),

    /// 일시적 추출 실패 (전송 오류, 백엔드 오류 응답): 재시도 대상
    #[error("일시적 추출 실패: {0}")]
    TransientExtraction(String),

    /// 모델 응답이 JSON 객체가 아님
    #[error("잘못된 응답 형식: {reason}")]
    MalformedResponse {
        /// 원본 응답 텍스트
        raw: String,
        /// 디코딩 실패 사유
        reason: String,
    },

    /// 숫자 필드 변환 실패
    #[error("필드 값 오류 ({field}): {value:?}")]
    InvalidFieldValue {
        /// 필드 경로 (예: "Units.Current House limit")
        field: String,
        /// 변환에 실패한 원본 값
        value: String,
    },

    /// 오디오/플래시 출력 실패
    #[error("알림 출력 실패: {0}")]
    Dispatch(String),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 네트워크 에러 (텔레메트리 등 비핵심 경로)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 이미지 디코딩/인코딩 실패
    #[error("이미지 처리 에러: {0}")]
    Image(String),

    /// 키보드 입력 시뮬레이션 실패
    #[error("입력 에러: {0}")]
    Input(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 이번 사이클을 건너뛰어야 하는 에러인지 (캡처/백엔드 불가)
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::Capture(_) | CoreError::BackendUnavailable(_)
        )
    }
}
