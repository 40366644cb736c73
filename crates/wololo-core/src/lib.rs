//! # wololo-core
//!
//! WOLOLO 도메인 모델, 포트(trait) 정의, 에러 타입, 상태 파서.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 게임 상태, 알림 이벤트, 캡처 영역, 카운터 데이터
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`parser`]: 모델 응답 텍스트 → 게임 상태
//! - [`prompts`]: 비전 모델 지시문
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod parser;
pub mod ports;
pub mod prompts;
