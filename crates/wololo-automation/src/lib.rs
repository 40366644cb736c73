//! # wololo-automation
//!
//! 게임 매크로와 키보드 입력 드라이버.
//!
//! - [`input_driver`]: `InputDriver` 구현 (NoOp, enigo)
//! - [`macros`]: 주민/고유 유닛 생산 매크로

pub mod input_driver;
pub mod macros;
