//! EventBus: a small generic pub/sub with special-event hooks.
//!
//! A special event gets three extension points: `setup` runs when the first
//! listener for its name is bound, `teardown` after the last one is unbound,
//! and `add` may wrap every handler before it is stored.

use crate::error::Result;
use crate::events::WindowSize;
use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

pub type Handler = Arc<dyn Fn(&mut Event) + Send + Sync>;
pub type HandlerId = u64;

type HandlerList = SmallVec<[(HandlerId, Handler); 4]>;

/// Данные события, которые обработчики могут дополнять
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventData {
    pub size: Option<WindowSize>,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub data: EventData,
}

impl Event {
    pub fn new(name: &str, data: EventData) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }
}

/// Точки расширения специального события
pub trait SpecialEvent: Send + Sync {
    /// Первый обработчик для имени события
    fn setup(&self) -> Result<()> {
        Ok(())
    }

    /// Удалён последний обработчик
    fn teardown(&self) {}

    /// Обёртка над каждым добавляемым обработчиком
    fn add(&self, handler: Handler) -> Handler {
        handler
    }
}

#[derive(Default)]
pub struct EventBus {
    handlers: DashMap<String, HandlerList>,
    specials: DashMap<String, Arc<dyn SpecialEvent>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Зарегистрировать специальное событие; возвращает прежнее, если было
    pub fn register_special(
        &self,
        name: &str,
        special: Arc<dyn SpecialEvent>,
    ) -> Option<Arc<dyn SpecialEvent>> {
        debug!("Регистрация специального события '{}'", name);
        self.specials.insert(name.to_string(), special)
    }

    fn special(&self, name: &str) -> Option<Arc<dyn SpecialEvent>> {
        self.specials.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn bind(&self, name: &str, handler: Handler) -> Result<HandlerId> {
        let special = self.special(name);

        if self.listener_count(name) == 0 {
            if let Some(special) = &special {
                debug!("Первый обработчик '{}', вызываем setup", name);
                special.setup()?;
            }
        }

        let handler = match &special {
            Some(special) => special.add(handler),
            None => handler,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push((id, handler));
        Ok(id)
    }

    pub fn unbind(&self, name: &str, id: HandlerId) -> bool {
        let removed = match self.handlers.get_mut(name) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|(handler_id, _)| *handler_id != id);
                list.len() != before
            }
            None => false,
        };

        if removed && self.handlers.remove_if(name, |_, list| list.is_empty()).is_some() {
            if let Some(special) = self.special(name) {
                debug!("Последний обработчик '{}' удалён, вызываем teardown", name);
                special.teardown();
            }
        }

        removed
    }

    /// Вызвать обработчики по порядку с общим объектом события
    pub fn trigger(&self, name: &str) -> usize {
        self.trigger_with(name, EventData::default())
    }

    pub fn trigger_with(&self, name: &str, data: EventData) -> usize {
        // Снимок, чтобы обработчик мог трогать шину
        let snapshot: SmallVec<[Handler; 4]> = self
            .handlers
            .get(name)
            .map(|list| list.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default();

        let mut event = Event::new(name, data);
        for handler in &snapshot {
            handler(&mut event);
        }
        snapshot.len()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, |list| list.len())
    }
}
