use crate::debug_if_enabled;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Обработчик "resizestop" для прямых адаптеров: вызывается без аргументов
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Что удалить из реестра: позицию или сам обработчик
#[derive(Clone)]
pub enum Unbind {
    Index(usize),
    Callback(Callback),
}

impl From<usize> for Unbind {
    fn from(index: usize) -> Self {
        Unbind::Index(index)
    }
}

impl From<Callback> for Unbind {
    fn from(callback: Callback) -> Self {
        Unbind::Callback(callback)
    }
}

impl From<&Callback> for Unbind {
    fn from(callback: &Callback) -> Self {
        Unbind::Callback(Arc::clone(callback))
    }
}

impl fmt::Debug for Unbind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unbind::Index(index) => write!(f, "Index({})", index),
            Unbind::Callback(callback) => write!(f, "Callback({:p})", Arc::as_ptr(callback)),
        }
    }
}

/// Упорядоченный реестр обработчиков; дубликаты разрешены
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: RwLock<Vec<Callback>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить обработчик в конец; возвращает его позицию на момент вставки
    pub fn bind(&self, callback: Callback) -> usize {
        let mut callbacks = self.callbacks.write();
        callbacks.push(callback);
        callbacks.len() - 1
    }

    /// Удалить обработчик по позиции или по идентичности (первое вхождение).
    ///
    /// Позиция за пределами реестра не удаляет ничего и возвращает `false`.
    pub fn unbind(&self, what: impl Into<Unbind>) -> bool {
        let what = what.into();
        let mut callbacks = self.callbacks.write();

        let index = match &what {
            Unbind::Index(index) => Some(*index).filter(|i| *i < callbacks.len()),
            Unbind::Callback(target) => callbacks.iter().position(|cb| Arc::ptr_eq(cb, target)),
        };

        match index {
            Some(index) => {
                callbacks.remove(index);
                debug_if_enabled!("Обработчик {:?} удалён, осталось {}", what, callbacks.len());
                true
            }
            None => {
                debug_if_enabled!("Обработчик {:?} не найден", what);
                false
            }
        }
    }

    /// Вызвать все обработчики в порядке регистрации.
    ///
    /// Список снимается до вызова, так что обработчик может менять реестр.
    pub fn notify(&self) -> usize {
        let snapshot: Vec<Callback> = self.callbacks.read().clone();
        for callback in &snapshot {
            callback();
        }
        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Callback {
        let log = Arc::clone(log);
        Arc::new(move || log.lock().push(name))
    }

    #[test]
    fn bind_returns_insertion_index() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        assert_eq!(registry.bind(recorder(&log, "a")), 0);
        assert_eq!(registry.bind(recorder(&log, "b")), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn notify_runs_in_registration_order() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.bind(recorder(&log, "a"));
        registry.bind(recorder(&log, "b"));
        assert_eq!(registry.notify(), 2);

        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[test]
    fn duplicates_are_invoked_twice() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder(&log, "a");

        registry.bind(Arc::clone(&a));
        registry.bind(Arc::clone(&a));
        registry.notify();

        assert_eq!(*log.lock(), vec!["a", "a"]);
    }

    #[test]
    fn unbind_by_index_shifts_later_entries() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.bind(recorder(&log, "a"));
        registry.bind(recorder(&log, "b"));
        registry.bind(recorder(&log, "c"));

        assert!(registry.unbind(1usize));
        registry.notify();
        assert_eq!(*log.lock(), vec!["a", "c"]);

        // "c" теперь на позиции 1
        log.lock().clear();
        assert!(registry.unbind(1usize));
        registry.notify();
        assert_eq!(*log.lock(), vec!["a"]);
    }

    #[test]
    fn unbind_out_of_range_index_is_not_found() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.bind(recorder(&log, "a"));

        assert!(!registry.unbind(1usize));
        assert!(!registry.unbind(usize::MAX));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unbind_by_identity_removes_first_occurrence_only() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder(&log, "a");
        let b = recorder(&log, "b");

        registry.bind(Arc::clone(&a));
        registry.bind(Arc::clone(&b));
        registry.bind(Arc::clone(&a));

        assert!(registry.unbind(&a));
        registry.notify();
        assert_eq!(*log.lock(), vec!["b", "a"]);
    }

    #[test]
    fn unbind_unknown_identity_is_not_found() {
        let registry = CallbackRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.bind(recorder(&log, "a"));

        // Такой же по поведению, но другой обработчик
        let other = recorder(&log, "a");
        assert!(!registry.unbind(other));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn callback_may_unbind_itself_during_notify() {
        let registry = Arc::new(CallbackRegistry::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&registry);
        let log_once = Arc::clone(&log);
        registry.bind(Arc::new(move || {
            log_once.lock().push("once");
            if let Some(registry) = weak.upgrade() {
                registry.unbind(0usize);
            }
        }));
        registry.bind(recorder(&log, "always"));

        registry.notify();
        registry.notify();
        assert_eq!(*log.lock(), vec!["once", "always", "always"]);
    }

    #[test]
    fn notify_on_empty_registry() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.notify(), 0);
    }
}
