use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeStopError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    /// Порог должен быть конечным неотрицательным числом миллисекунд
    #[error("Недопустимый порог: {0} мс")]
    InvalidThreshold(f64),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ResizeStopError>;
