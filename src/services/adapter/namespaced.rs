use crate::services::coalescer::ResizeSettings;
use crate::services::host_window::HostWindow;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::resize_stop::ResizeStop;
use super::r#trait::ResizeAdapter;

/// Пространство имён, в котором живут независимые экземпляры ResizeStop
#[derive(Default)]
pub struct Namespace {
    entries: DashMap<String, Arc<ResizeStop>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Создать экземпляр под ключом `key` и подписать его на окно.
    ///
    /// Прежний экземпляр под тем же ключом отписывается и заменяется.
    pub fn attach(
        &self,
        key: &str,
        window: Arc<dyn HostWindow>,
        settings: ResizeSettings,
    ) -> Arc<ResizeStop> {
        let resize_stop = ResizeStop::new(key, window, settings);
        resize_stop.subscribe_raw();

        if let Some(previous) = self.entries.insert(key.to_string(), Arc::clone(&resize_stop)) {
            warn!("Ключ '{}' уже занят, прежний ResizeStop заменён", key);
            previous.unsubscribe_raw();
        }

        info!("ResizeStop присоединён к пространству имён под ключом '{}'", key);
        resize_stop
    }

    pub fn get(&self, key: &str) -> Option<Arc<ResizeStop>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Отписать и убрать экземпляр
    pub fn detach(&self, key: &str) -> Option<Arc<ResizeStop>> {
        let (_, resize_stop) = self.entries.remove(key)?;
        resize_stop.unsubscribe_raw();
        info!("ResizeStop '{}' отсоединён", key);
        Some(resize_stop)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowSize;
    use crate::services::host_window::SimulatedWindow;
    use parking_lot::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    fn settings(threshold_ms: u64) -> ResizeSettings {
        ResizeSettings {
            threshold: Duration::from_millis(threshold_ms),
            poll_interval: Duration::from_millis(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn instances_are_independent() {
        let window = Arc::new(SimulatedWindow::new("test", WindowSize::new(800, 600)));
        let namespace = Namespace::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let fast = namespace.attach("fast", window.clone(), settings(100));
        let slow = namespace.attach("slow", window.clone(), settings(400));
        assert_eq!(namespace.keys(), vec!["fast".to_string(), "slow".to_string()]);
        assert_eq!(window.subscriber_count(), 2);

        let fast_log = Arc::clone(&log);
        fast.bind(Arc::new(move || fast_log.lock().push("fast")));
        let slow_log = Arc::clone(&log);
        slow.bind(Arc::new(move || slow_log.lock().push("slow")));

        window.resize(900, 600);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(*log.lock(), vec!["fast"]);

        sleep(Duration::from_millis(300)).await;
        assert_eq!(*log.lock(), vec!["fast", "slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn attach_replaces_and_detach_unsubscribes() {
        let window = Arc::new(SimulatedWindow::new("test", WindowSize::new(800, 600)));
        let namespace = Namespace::new();

        let first = namespace.attach("layout", window.clone(), settings(100));
        let second = namespace.attach("layout", window.clone(), settings(100));
        assert!(!first.is_subscribed());
        assert!(second.is_subscribed());
        assert_eq!(namespace.len(), 1);
        assert!(Arc::ptr_eq(&namespace.get("layout").unwrap(), &second));

        let detached = namespace.detach("layout").unwrap();
        assert!(!detached.is_subscribed());
        assert!(namespace.is_empty());
        assert!(namespace.detach("layout").is_none());
    }
}
