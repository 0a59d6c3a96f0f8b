use crate::error::Result;
use crate::events::Settled;
use crate::services::callback_registry::{Callback, CallbackRegistry, Unbind};
use crate::services::coalescer::{Coalescer, ResizeSettings};
use crate::services::host_window::HostWindow;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info};

use super::raw_subscription::RawSubscription;
use super::r#trait::ResizeAdapter;

/// Прямая форма: явный реестр обработчиков без аргументов
pub struct ResizeStop {
    name: String,
    window: Arc<dyn HostWindow>,
    coalescer: Coalescer,
    registry: CallbackRegistry,
    raw: RawSubscription,
}

impl ResizeStop {
    /// Новый экземпляр; сырые события не слушаются до `subscribe_raw`
    pub fn new(name: &str, window: Arc<dyn HostWindow>, settings: ResizeSettings) -> Arc<Self> {
        info!("Инициализация ResizeStop '{}' для окна '{}'", name, window.name());

        Arc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let coalescer = Coalescer::new(
                settings,
                Arc::new(move |settled| {
                    if let Some(this) = this.upgrade() {
                        this.deliver_settled(settled);
                    }
                }),
            );

            Self {
                name: name.to_string(),
                window,
                coalescer,
                registry: CallbackRegistry::new(),
                raw: RawSubscription::new(),
            }
        })
    }

    /// Зарегистрировать обработчик; возвращает его позицию
    pub fn bind(&self, callback: Callback) -> usize {
        self.registry.bind(callback)
    }

    /// Удалить обработчик по позиции или по идентичности
    pub fn unbind(&self, what: impl Into<Unbind>) -> bool {
        self.registry.unbind(what)
    }

    /// Новый порог в мс; при ошибке прежний порог сохраняется
    pub fn set_threshold(&self, ms: f64) -> Result<f64> {
        let result = self.coalescer.set_threshold(ms);
        match &result {
            Ok(_) => info!("ResizeStop '{}': порог {} мс", self.name, ms),
            Err(e) => debug!("ResizeStop '{}': {}", self.name, e),
        }
        result
    }

    pub fn threshold(&self) -> Duration {
        self.coalescer.threshold()
    }

    pub fn is_pending(&self) -> bool {
        self.coalescer.is_pending()
    }

    pub fn is_subscribed(&self) -> bool {
        self.raw.is_active()
    }

    pub fn callback_count(&self) -> usize {
        self.registry.len()
    }

    /// Ручное сырое событие, в обход подписки на окно
    #[allow(dead_code)]
    pub fn on_raw_event(&self) {
        self.coalescer.on_raw_event();
    }
}

impl ResizeAdapter for ResizeStop {
    fn subscribe_raw(&self) -> bool {
        self.raw.start(&self.window, &self.coalescer)
    }

    fn unsubscribe_raw(&self) -> bool {
        self.raw.stop()
    }

    fn deliver_settled(&self, settled: Settled) {
        let notified = self.registry.notify();
        debug!("ResizeStop '{}': {} доставлено {} обработчикам", self.name, settled, notified);
    }
}
