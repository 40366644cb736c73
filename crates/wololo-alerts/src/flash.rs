//! 화면 플래시 전달 채널.
//!
//! 오버레이 창은 호스트가 소유하므로 여기서는 `FlashSpec`을 채널로만 넘긴다.

use tokio::sync::mpsc;
use tracing::debug;

use wololo_core::error::CoreError;
use wololo_core::models::alert::FlashSpec;
use wololo_core::ports::alert_output::FlashPresenter;

/// 채널 기반 플래시 표시기
#[derive(Clone)]
pub struct ChannelFlashPresenter {
    tx: mpsc::UnboundedSender<FlashSpec>,
}

impl ChannelFlashPresenter {
    /// 표시기와 호스트 쪽 수신기 생성
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FlashSpec>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FlashPresenter for ChannelFlashPresenter {
    fn present(&self, flash: &FlashSpec) -> Result<(), CoreError> {
        self.tx
            .send(flash.clone())
            .map_err(|_| CoreError::Dispatch("플래시 수신 측이 닫힘".into()))?;
        debug!(text = %flash.text, color = ?flash.color, "플래시 전달");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wololo_core::models::alert::FlashColor;

    #[test]
    fn delivers_to_host() {
        let (presenter, mut rx) = ChannelFlashPresenter::channel();
        let flash = FlashSpec::banner(FlashColor::Orange, 100, "Create Villagers!");
        presenter.present(&flash).unwrap();
        assert_eq!(rx.try_recv().unwrap(), flash);
    }

    #[test]
    fn closed_host_is_dispatch_error() {
        let (presenter, rx) = ChannelFlashPresenter::channel();
        drop(rx);
        let flash = FlashSpec::banner(FlashColor::Grey, 400, "1 Idle Villager!");
        assert!(matches!(
            presenter.present(&flash),
            Err(CoreError::Dispatch(_))
        ));
    }
}
