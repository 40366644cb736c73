//! 도메인 모델.

pub mod alert;
pub mod counter;
pub mod game_state;
pub mod region;
