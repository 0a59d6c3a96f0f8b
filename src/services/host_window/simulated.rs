use crate::config::SimulationConfig;
use crate::error::Result;
use crate::events::{ResizeNotification, WindowSize};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, sleep, Duration};
use tracing::info;

use super::r#trait::{HostWindow, ResizeDriver, RESIZE_CHANNEL_CAPACITY};

/// Окно в памяти: размер меняется вызовом `resize`
pub struct SimulatedWindow {
    name: String,
    size: RwLock<WindowSize>,
    sender: broadcast::Sender<ResizeNotification>,
}

impl SimulatedWindow {
    pub fn new(name: &str, size: WindowSize) -> Self {
        let (sender, _) = broadcast::channel(RESIZE_CHANNEL_CAPACITY);
        Self {
            name: name.to_string(),
            size: RwLock::new(size),
            sender,
        }
    }

    /// Изменить размер и разослать уведомление; возвращает число подписчиков
    pub fn resize(&self, width: u32, height: u32) -> usize {
        let size = WindowSize::new(width, height);
        *self.size.write() = size;
        // Без подписчиков send возвращает ошибку, это нормально
        self.sender.send(ResizeNotification::new(size)).unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl HostWindow for SimulatedWindow {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe_resize(&self) -> broadcast::Receiver<ResizeNotification> {
        self.sender.subscribe()
    }

    fn inner_size(&self) -> WindowSize {
        *self.size.read()
    }
}

/// Эмуляция жестов: раз в `pause_ms` серия из `burst_len` событий
pub struct SimulatedResizeDriver {
    window: Arc<SimulatedWindow>,
    config: SimulationConfig,
}

impl SimulatedResizeDriver {
    pub fn new(window: Arc<SimulatedWindow>, config: SimulationConfig) -> Self {
        Self { window, config }
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - окно '{}' работает в режиме эмуляции", self.window.name());

        let spacing = Duration::from_millis(self.config.event_spacing_ms);
        let mut pause = interval(Duration::from_millis(self.config.pause_ms));
        let mut gesture = 0u32;

        loop {
            pause.tick().await;
            gesture += 1;

            let start = self.window.inner_size();
            info!(
                "Dry-run: жест #{} - {} событий resize от {}",
                gesture, self.config.burst_len, start
            );

            for step in 1..=self.config.burst_len {
                // Чётные жесты растягивают окно, нечётные сжимают
                let (width, height) = if gesture % 2 == 0 {
                    (start.width + step * 8, start.height + step * 4)
                } else {
                    (
                        start.width.saturating_sub(step * 8).max(320),
                        start.height.saturating_sub(step * 4).max(240),
                    )
                };
                self.window.resize(width, height);
                sleep(spacing).await;
            }
        }
    }
}

#[async_trait::async_trait]
impl ResizeDriver for SimulatedResizeDriver {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
