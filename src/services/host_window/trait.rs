use crate::config::Config;
use crate::error::Result;
use crate::events::{ResizeNotification, WindowSize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Ёмкость канала сырых уведомлений
pub(super) const RESIZE_CHANNEL_CAPACITY: usize = 64;

/// Источник сырых событий изменения размера
pub trait HostWindow: Send + Sync {
    fn name(&self) -> &str;

    /// Новая подписка на поток уведомлений
    fn subscribe_resize(&self) -> broadcast::Receiver<ResizeNotification>;

    /// Текущий размер, перечитанный у хоста
    fn inner_size(&self) -> WindowSize;
}

/// Trait for drivers that pump host notifications into the stream
#[async_trait::async_trait]
pub trait ResizeDriver {
    /// Run the driver until the host goes away
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create the host window and its driver based on the dry_run flag
pub fn create_host_window(
    config: Arc<Config>,
    dry_run: bool,
) -> Result<(Arc<dyn HostWindow>, Box<dyn ResizeDriver + Send>)> {
    if dry_run || config.window.source == "simulated" {
        let window = Arc::new(super::SimulatedWindow::new("simulated", WindowSize::new(1280, 720)));
        let driver: Box<dyn ResizeDriver + Send> = Box::new(
            super::simulated::SimulatedResizeDriver::new(Arc::clone(&window), config.simulation.clone()),
        );
        let window: Arc<dyn HostWindow> = window;
        Ok((window, driver))
    } else {
        let window = Arc::new(super::terminal::TerminalWindow::new()?);
        let driver: Box<dyn ResizeDriver + Send> =
            Box::new(super::terminal::TerminalResizeDriver::new(Arc::clone(&window)));
        let window: Arc<dyn HostWindow> = window;
        Ok((window, driver))
    }
}
