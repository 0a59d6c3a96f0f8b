use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

/// Размер окна хоста (LatestSize)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Сырое уведомление хоста об изменении размера.
///
/// Коалесцер не доверяет полезной нагрузке: размер и время он перечитывает сам.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeNotification {
    pub size: WindowSize,
    pub timestamp: Instant,
}

impl ResizeNotification {
    pub fn new(size: WindowSize) -> Self {
        Self {
            size,
            timestamp: Instant::now(),
        }
    }
}

impl fmt::Display for ResizeNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resize -> {} ({}ms ago)",
            self.size,
            self.timestamp.elapsed().as_millis()
        )
    }
}

/// Результат обнаруженной паузы: одно событие на один жест изменения размера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settled {
    /// Последний размер, снятый в момент сырого события (если адаптер его снимает)
    pub size: Option<WindowSize>,
}

impl fmt::Display for Settled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size {
            Some(size) => write!(f, "resizestop {}", size),
            None => write!(f, "resizestop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_display() {
        let size = WindowSize::new(1280, 720);
        assert_eq!(size.to_string(), "1280x720");
        assert_eq!(WindowSize::default(), WindowSize::new(0, 0));
    }

    #[test]
    fn test_settled_display() {
        let settled = Settled {
            size: Some(WindowSize::new(80, 24)),
        };
        assert_eq!(settled.to_string(), "resizestop 80x24");
        assert_eq!(Settled::default().to_string(), "resizestop");
    }

    #[test]
    fn test_notification_keeps_size() {
        let notification = ResizeNotification::new(WindowSize::new(640, 480));
        assert_eq!(notification.size, WindowSize::new(640, 480));
        assert!(notification.to_string().starts_with("resize -> 640x480"));
    }
}
