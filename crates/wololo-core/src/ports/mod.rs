//! Hexagonal Architecture 포트 정의.
//!
//! 어댑터 crate가 구현하고 앱 crate가 `Arc<dyn Trait>`로 주입한다.

pub mod alert_output;
pub mod capture;
pub mod extractor;
pub mod input_driver;
pub mod telemetry;
