use crate::events::Settled;

/// Общий контракт всех форм интеграции поверх одного Coalescer
pub trait ResizeAdapter: Send + Sync {
    /// Подписаться на сырые события окна; `false`, если подписка уже есть
    fn subscribe_raw(&self) -> bool;

    /// Отписаться от сырых событий; `false`, если подписки не было
    fn unsubscribe_raw(&self) -> bool;

    /// Доставить "resizestop" потребителям
    fn deliver_settled(&self, settled: Settled);
}
