use crate::debug_if_enabled;
use crate::error::{ResizeStopError, Result};
use crate::events::{ResizeNotification, WindowSize};
use parking_lot::RwLock;
use std::fs::File;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::r#trait::{HostWindow, ResizeDriver, RESIZE_CHANNEL_CAPACITY};

const TTY_PATH: &str = "/dev/tty";

/// Управляющий терминал как окно: SIGWINCH - сырой поток, `stty size` - размер
pub struct TerminalWindow {
    size: RwLock<WindowSize>,
    sender: broadcast::Sender<ResizeNotification>,
}

impl TerminalWindow {
    pub fn new() -> Result<Self> {
        info!("Инициализация TerminalWindow");

        let size = query_size()?;
        info!("Текущий размер терминала: {}", size);

        let (sender, _) = broadcast::channel(RESIZE_CHANNEL_CAPACITY);
        Ok(Self {
            size: RwLock::new(size),
            sender,
        })
    }

    /// Перечитать размер и разослать уведомление
    fn refresh(&self) {
        let size = match query_size() {
            Ok(size) => size,
            Err(e) => {
                warn!("Не удалось перечитать размер терминала: {}", e);
                *self.size.read()
            }
        };

        *self.size.write() = size;
        debug_if_enabled!("SIGWINCH: терминал {}", size);
        let _ = self.sender.send(ResizeNotification::new(size));
    }
}

impl HostWindow for TerminalWindow {
    fn name(&self) -> &str {
        "terminal"
    }

    fn subscribe_resize(&self) -> broadcast::Receiver<ResizeNotification> {
        self.sender.subscribe()
    }

    fn inner_size(&self) -> WindowSize {
        *self.size.read()
    }
}

/// Размер терминала через `stty size` с stdin на /dev/tty
fn query_size() -> Result<WindowSize> {
    let tty = File::open(TTY_PATH).map_err(|e| {
        ResizeStopError::ServiceUnavailable(format!("Нет управляющего терминала {}: {}", TTY_PATH, e))
    })?;

    let output = Command::new("stty")
        .arg("size")
        .stdin(Stdio::from(tty))
        .output()
        .map_err(|e| ResizeStopError::ServiceUnavailable(format!("stty не найден: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ResizeStopError::Internal(format!("stty вернул ошибку: {}", stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_stty_size(&stdout)
        .ok_or_else(|| ResizeStopError::Internal(format!("Неожиданный вывод stty: '{}'", stdout.trim())))
}

/// `stty size` печатает "строки столбцы"
fn parse_stty_size(output: &str) -> Option<WindowSize> {
    let mut parts = output.split_whitespace();
    let rows = parts.next()?.parse::<u32>().ok()?;
    let cols = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(WindowSize::new(cols, rows))
}

pub struct TerminalResizeDriver {
    window: Arc<TerminalWindow>,
}

impl TerminalResizeDriver {
    pub fn new(window: Arc<TerminalWindow>) -> Self {
        Self { window }
    }

    async fn run_impl(self) -> Result<()> {
        let mut winch = signal(SignalKind::window_change())?;
        info!("TerminalResizeDriver запущен, ожидаем SIGWINCH");

        while winch.recv().await.is_some() {
            self.window.refresh();
        }

        debug!("Поток SIGWINCH закрыт");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResizeDriver for TerminalResizeDriver {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
