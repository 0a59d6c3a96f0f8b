use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::callback_registry::Callback;
use services::{
    create_host_window, global, install_global, Event, EventBus, Namespace, ResizeAdapter,
    ResizeStopPlugin, RESIZE_STOP_EVENT,
};

#[derive(Parser, Debug)]
#[command(name = "resizestop")]
#[command(about = "Склейка частых событий изменения размера окна в одно событие resizestop")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "resizestop.toml")]
    config: String,

    /// Режим сухого запуска (эмулированное окно вместо терминала)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Порог паузы в мс поверх значения из конфигурации
    #[arg(long, allow_hyphen_values = true)]
    threshold_ms: Option<f64>,
}

// Один поток исполнения: сырые события и опрос таймера никогда не идут параллельно
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);

    // Инициализация системы логирования
    init_tracing(&config, args.log_level.as_deref())?;

    info!("Запуск resizestop v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - события окна эмулируются");
    }

    let settings = config.resize.settings();
    let (window, driver) = create_host_window(config.clone(), args.dry_run)?;

    // Глобальная форма
    let global_stop = install_global(window.clone(), settings);
    let global_callback: Callback = Arc::new(|| info!("resizestop (global)"));
    global_stop.bind(Arc::clone(&global_callback));

    // Форма с пространством имён
    let namespace = Namespace::new();
    let namespace_key = config.resize.namespace.clone();
    let scoped = namespace.attach(&namespace_key, window.clone(), settings);
    let scoped_name = namespace_key.clone();
    let scoped_index = scoped.bind(Arc::new(move || info!("resizestop ({})", scoped_name)));

    // Форма-плагин на шине событий
    let bus = Arc::new(EventBus::new());
    let plugin = ResizeStopPlugin::install(&bus, window.clone(), settings);
    let listener = bus.bind(
        RESIZE_STOP_EVENT,
        Arc::new(|event: &mut Event| match event.data.size {
            Some(size) => info!("{} (bus): окно {}", event.name, size),
            None => info!("{} (bus)", event.name),
        }),
    )?;

    // Порог из командной строки проходит ту же проверку, что и setter
    if let Some(ms) = args.threshold_ms {
        let results = [
            ("global", global_stop.set_threshold(ms)),
            (namespace_key.as_str(), scoped.set_threshold(ms)),
            (RESIZE_STOP_EVENT, plugin.set_threshold(ms)),
        ];
        for (form, result) in results {
            if let Err(e) = result {
                warn!("Порог для '{}' не изменён: {}", form, e);
            }
        }
    }

    info!(
        "Все формы подключены к окну '{}' (порог {:?}, шаг опроса {:?})",
        window.name(),
        plugin.threshold(),
        settings.poll_interval
    );
    info!(
        "Пространство имён: {} экземпляр(ов) {:?}, глобальных обработчиков: {}, порог global {:?}, порог '{}' {:?}",
        namespace.len(),
        namespace.keys(),
        global_stop.callback_count(),
        global_stop.threshold(),
        namespace_key,
        scoped.threshold()
    );

    let driver_handle = tokio::spawn(async move {
        if let Err(e) = driver.run().await {
            error!("Ошибка в ResizeDriver: {}", e);
        }
    });

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Последний обработчик снимает подписку плагина через teardown
    bus.unbind(RESIZE_STOP_EVENT, listener);
    if plugin.is_subscribed() || plugin.is_pending() {
        warn!("Плагин '{}' остался активен после удаления обработчиков", RESIZE_STOP_EVENT);
    }

    if let Some(scoped) = namespace.get(&namespace_key) {
        if !scoped.unbind(scoped_index) {
            warn!("Обработчик #{} для '{}' уже удалён", scoped_index, namespace_key);
        }
    }
    namespace.detach(&namespace_key);
    if !namespace.is_empty() {
        warn!("В пространстве имён остались экземпляры: {:?}", namespace.keys());
    }

    if let Some(global) = global() {
        global.unbind(&global_callback);
        if global.is_pending() {
            info!("Незавершённый жест global отброшен");
        }
        global.unsubscribe_raw();
        if global.is_subscribed() {
            warn!("Глобальный ResizeStop не отписался от окна");
        }
    }

    driver_handle.abort();
    let _ = driver_handle.await;

    info!("resizestop завершил работу");
    Ok(())
}

fn init_tracing(config: &Config, cli_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let directives = match cli_level {
        Some(level) => level.to_string(),
        None if config.logging.filter.is_empty() => config.logging.level.clone(),
        None => format!("{},{}", config.logging.level, config.logging.filter),
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&directives))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
