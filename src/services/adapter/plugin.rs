use crate::error::Result;
use crate::events::{Settled, WindowSize};
use crate::services::coalescer::{Coalescer, ResizeSettings};
use crate::services::event_bus::{Event, EventBus, Handler, SpecialEvent};
use crate::services::host_window::HostWindow;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info};

use super::raw_subscription::RawSubscription;
use super::r#trait::ResizeAdapter;

/// Имя специального события на шине
pub const RESIZE_STOP_EVENT: &str = "resizestop";

/// Форма-плагин: "resizestop" как специальное событие EventBus.
///
/// Подписка на окно живёт, пока на шине есть хотя бы один обработчик
/// "resizestop"; каждый обработчик получает размер в `event.data.size`.
pub struct ResizeStopPlugin {
    window: Arc<dyn HostWindow>,
    coalescer: Coalescer,
    bus: Weak<EventBus>,
    latest_size: Arc<RwLock<Option<WindowSize>>>,
    raw: RawSubscription,
}

impl ResizeStopPlugin {
    pub fn install(
        bus: &Arc<EventBus>,
        window: Arc<dyn HostWindow>,
        settings: ResizeSettings,
    ) -> Arc<Self> {
        info!("Установка плагина '{}' для окна '{}'", RESIZE_STOP_EVENT, window.name());

        let plugin = Arc::new_cyclic(|this: &Weak<Self>| {
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
                window,
                coalescer,
                bus: Arc::downgrade(bus),
                latest_size: Arc::new(RwLock::new(None)),
                raw: RawSubscription::new(),
            }
        });

        bus.register_special(RESIZE_STOP_EVENT, plugin.clone());
        plugin
    }

    pub fn set_threshold(&self, ms: f64) -> Result<f64> {
        self.coalescer.set_threshold(ms)
    }

    pub fn threshold(&self) -> Duration {
        self.coalescer.threshold()
    }

    pub fn is_subscribed(&self) -> bool {
        self.raw.is_active()
    }

    pub fn is_pending(&self) -> bool {
        self.coalescer.is_pending()
    }
}

impl ResizeAdapter for ResizeStopPlugin {
    fn subscribe_raw(&self) -> bool {
        self.raw.start(&self.window, &self.coalescer)
    }

    fn unsubscribe_raw(&self) -> bool {
        self.raw.stop()
    }

    fn deliver_settled(&self, settled: Settled) {
        *self.latest_size.write() = settled.size.or_else(|| Some(self.window.inner_size()));

        match self.bus.upgrade() {
            Some(bus) => {
                let notified = bus.trigger(RESIZE_STOP_EVENT);
                debug!("{} доставлено {} обработчикам шины", settled, notified);
            }
            None => debug!("Шина событий уже удалена, {} некому доставить", settled),
        }
    }
}

impl SpecialEvent for ResizeStopPlugin {
    fn setup(&self) -> Result<()> {
        self.subscribe_raw();
        Ok(())
    }

    fn teardown(&self) {
        self.unsubscribe_raw();
    }

    fn add(&self, handler: Handler) -> Handler {
        let latest_size = Arc::clone(&self.latest_size);
        Arc::new(move |event: &mut Event| {
            event.data.size = *latest_size.read();
            handler(event)
        })
    }
}
