use crate::{debug_if_enabled, trace_if_enabled};
use crate::events::ResizeNotification;
use crate::services::coalescer::Coalescer;
use crate::services::host_window::HostWindow;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Единственная задача, пересылающая сырые события окна в Coalescer
#[derive(Default)]
pub struct RawSubscription {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RawSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запустить пересылку; повторный запуск ничего не делает.
    ///
    /// Подписка на канал берётся до spawn, так что события сразу после
    /// вызова не теряются.
    pub fn start(&self, window: &Arc<dyn HostWindow>, coalescer: &Coalescer) -> bool {
        let mut task = self.task.lock();
        if task.is_some() {
            return false;
        }

        let rx = window.subscribe_resize();
        debug!("Подписка на сырые события окна '{}'", window.name());
        *task = Some(tokio::spawn(Self::forward(
            rx,
            Arc::clone(window),
            coalescer.clone(),
        )));
        true
    }

    pub fn stop(&self) -> bool {
        match self.task.lock().take() {
            Some(handle) => {
                handle.abort();
                debug!("Подписка на сырые события снята");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.lock().is_some()
    }

    async fn forward(
        mut rx: broadcast::Receiver<ResizeNotification>,
        window: Arc<dyn HostWindow>,
        coalescer: Coalescer,
    ) {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    trace_if_enabled!("Сырое событие: {}", notification);
                    // Размер перечитываем у хоста, а не берём из уведомления
                    coalescer.on_raw_event_with_size(window.inner_size());
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Пропущенные события склеиваются в одно
                    debug_if_enabled!("Пропущено {} сырых событий", skipped);
                    coalescer.on_raw_event_with_size(window.inner_size());
                }
                Err(RecvError::Closed) => {
                    warn!("Окно '{}' закрыло поток событий", window.name());
                    break;
                }
            }
        }
    }
}

impl Drop for RawSubscription {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
