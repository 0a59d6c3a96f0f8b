//! Coalescer: the debounce core.
//!
//! Owns the activity clock, the single pending poll timer, the quiet-period
//! threshold and the latest observed size. It knows nothing about callbacks or
//! hosts: on settle it hands a [`Settled`] to the delivery function supplied by
//! its adapter.

use crate::debug_if_enabled;
use crate::error::{ResizeStopError, Result};
use crate::events::{Settled, WindowSize};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Порог по умолчанию, мс
pub const DEFAULT_THRESHOLD_MS: f64 = 500.0;
/// Шаг опроса по умолчанию, мс
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Доставка события "resizestop" адаптеру
pub type SettleFn = Arc<dyn Fn(Settled) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSettings {
    pub threshold: Duration,
    pub poll_interval: Duration,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs_f64(DEFAULT_THRESHOLD_MS / 1000.0),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// Проверка кандидата в пороги: конечное неотрицательное число миллисекунд
pub fn validate_threshold_ms(ms: f64) -> Result<Duration> {
    // NaN не проходит is_finite
    if !ms.is_finite() || ms < 0.0 {
        return Err(ResizeStopError::InvalidThreshold(ms));
    }
    // Всё, что не влезает в Duration, насыщается до Duration::MAX
    Ok(Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX))
}

struct CoalescerState {
    /// ActivityClock: None, пока жеста нет
    last_activity: Option<Instant>,
    /// PendingTimer: не более одной цепочки опроса
    pending: Option<JoinHandle<()>>,
    threshold: Duration,
    latest_size: Option<WindowSize>,
}

#[derive(Clone)]
pub struct Coalescer {
    state: Arc<Mutex<CoalescerState>>,
    poll_interval: Duration,
    on_settle: SettleFn,
}

impl Coalescer {
    pub fn new(settings: ResizeSettings, on_settle: SettleFn) -> Self {
        debug!(
            "Инициализация Coalescer (порог: {:?}, шаг опроса: {:?})",
            settings.threshold, settings.poll_interval
        );

        Self {
            state: Arc::new(Mutex::new(CoalescerState {
                last_activity: None,
                pending: None,
                threshold: settings.threshold,
                latest_size: None,
            })),
            poll_interval: settings.poll_interval,
            on_settle,
        }
    }

    /// Сырое событие без снимка размера.
    ///
    /// Должно вызываться внутри tokio runtime: первая активность после простоя
    /// запускает цепочку опроса.
    pub fn on_raw_event(&self) {
        self.touch(None);
    }

    /// Сырое событие со снимком размера окна на момент события
    pub fn on_raw_event_with_size(&self, size: WindowSize) {
        self.touch(Some(size));
    }

    fn touch(&self, size: Option<WindowSize>) {
        let mut state = self.state.lock();
        state.last_activity = Some(Instant::now());
        if size.is_some() {
            state.latest_size = size;
        }

        // Последующие события только сдвигают часы активности
        if state.pending.is_none() {
            debug_if_enabled!("Первое событие после простоя, запускаем опрос");
            let handle = tokio::spawn(Self::poll_chain(
                Arc::clone(&self.state),
                self.poll_interval,
                Arc::clone(&self.on_settle),
            ));
            state.pending = Some(handle);
        }
    }

    /// Цепочка опроса: проверяет паузу каждые `poll_interval`, пока она не наберётся
    async fn poll_chain(
        state: Arc<Mutex<CoalescerState>>,
        poll_interval: Duration,
        on_settle: SettleFn,
    ) {
        loop {
            sleep(poll_interval).await;

            let settled = {
                let mut state = state.lock();
                let elapsed = state
                    .last_activity
                    .map(|last| last.elapsed())
                    .unwrap_or(Duration::MAX);

                if elapsed < state.threshold {
                    // Жест ещё идёт
                    continue;
                }

                // Сброс в простой под тем же замком, что и проверка в touch()
                state.pending = None;
                state.last_activity = None;
                Settled {
                    size: state.latest_size,
                }
            };

            debug_if_enabled!("Пауза подтверждена: {}", settled);
            on_settle(settled);
            break;
        }
    }

    /// Новый порог; применяется со следующей проверки опроса
    pub fn set_threshold(&self, ms: f64) -> Result<f64> {
        let threshold = validate_threshold_ms(ms)?;
        self.state.lock().threshold = threshold;
        Ok(ms)
    }

    pub fn threshold(&self) -> Duration {
        self.state.lock().threshold
    }

    /// Есть ли активная цепочка опроса
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    #[allow(dead_code)]
    pub fn last_activity(&self) -> Option<Instant> {
        self.state.lock().last_activity
    }
}
