use crate::services::coalescer::ResizeSettings;
use crate::services::host_window::HostWindow;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, warn};

use super::resize_stop::ResizeStop;
use super::r#trait::ResizeAdapter;

static GLOBAL: OnceCell<Arc<ResizeStop>> = OnceCell::new();

/// Установить глобальный ResizeStop и подписать его на окно.
///
/// Подписка не снимается автоматически. Повторная установка возвращает уже
/// существующий экземпляр.
pub fn install_global(
    window: Arc<dyn HostWindow>,
    settings: ResizeSettings,
) -> &'static Arc<ResizeStop> {
    if let Some(existing) = GLOBAL.get() {
        warn!("Глобальный ResizeStop уже установлен, окно '{}' проигнорировано", window.name());
        return existing;
    }

    GLOBAL.get_or_init(|| {
        let resize_stop = ResizeStop::new("global", window, settings);
        resize_stop.subscribe_raw();
        info!("Глобальный ResizeStop установлен");
        resize_stop
    })
}

/// Глобальный экземпляр, если он установлен
pub fn global() -> Option<&'static Arc<ResizeStop>> {
    GLOBAL.get()
}
