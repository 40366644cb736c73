//! # wololo-network
//!
//! 네트워크 어댑터.
//!
//! - [`gemini_client`]: 원격 Gemini 비전 백엔드 (API 키)
//! - [`ollama_client`]: 로컬 Ollama 비전 백엔드 (루프백)
//! - [`retry`]: 도달 확인 + 정규화 + 고정 간격 재시도 추출기
//! - [`telemetry_client`]: 사용 이벤트 fire-and-forget 전송

pub mod gemini_client;
pub mod ollama_client;
pub mod retry;
pub mod telemetry_client;
