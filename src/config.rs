use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::services::coalescer::{validate_threshold_ms, ResizeSettings};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub resize: ResizeConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Пауза после последнего события resize, мс
    pub threshold_ms: f64,
    /// Шаг опроса, не зависит от порога
    pub poll_interval_ms: u64,
    /// Ключ экземпляра в пространстве имён
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// "terminal" или "simulated"
    pub source: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub burst_len: u32,
    pub event_spacing_ms: u64,
    pub pause_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            filter: "resizestop=info".to_string(),
        }
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 500.0,
            poll_interval_ms: 10,
            namespace: "layout".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            source: "terminal".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            burst_len: 12,
            event_spacing_ms: 16,
            pause_ms: 3000,
        }
    }
}

impl ResizeConfig {
    /// Настройки коалесцера; невалидный порог заменяется значением по умолчанию
    pub fn settings(&self) -> ResizeSettings {
        let defaults = ResizeSettings::default();
        ResizeSettings {
            threshold: validate_threshold_ms(self.threshold_ms).unwrap_or(defaults.threshold),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("RESIZESTOP_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Те же правила, что и у ResizeStop::set_threshold
        if validate_threshold_ms(self.resize.threshold_ms).is_err() {
            anyhow::bail!(
                "threshold_ms должно быть конечным неотрицательным числом, получено {}",
                self.resize.threshold_ms
            );
        }

        if self.resize.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms должно быть больше 0");
        }

        if self.resize.namespace.trim().is_empty() {
            anyhow::bail!("Пустой ключ пространства имён");
        }

        match self.window.source.as_str() {
            "terminal" | "simulated" => {}
            _ => anyhow::bail!("Неверный источник событий окна: {}", self.window.source),
        }

        if self.simulation.burst_len == 0 {
            anyhow::bail!("burst_len должно быть больше 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resize.threshold_ms, 500.0);
        assert_eq!(config.resize.poll_interval_ms, 10);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();

        config.resize.threshold_ms = -1.0;
        assert!(config.validate().is_err());

        config.resize.threshold_ms = f64::NAN;
        assert!(config.validate().is_err());

        config.resize.threshold_ms = f64::INFINITY;
        assert!(config.validate().is_err());

        config.resize.threshold_ms = 0.0;
        assert!(config.validate().is_ok());

        // Огромный порог допустим и насыщается
        config.resize.threshold_ms = 1e300;
        assert!(config.validate().is_ok());
        assert_eq!(config.resize.settings().threshold, Duration::MAX);
    }

    #[test]
    fn test_invalid_source_and_poll_interval() {
        let mut config = Config::default();
        config.window.source = "x11".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.resize.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_settings_conversion() {
        let mut config = Config::default();
        config.resize.threshold_ms = 200.0;
        config.resize.poll_interval_ms = 50;

        let settings = config.resize.settings();
        assert_eq!(settings.threshold, Duration::from_millis(200));
        assert_eq!(settings.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_load_merges_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "resizestop.toml",
                r#"
                [resize]
                threshold_ms = 250.0
                poll_interval_ms = 10
                namespace = "assets"

                [window]
                source = "simulated"
                "#,
            )?;
            jail.set_env("RESIZESTOP_RESIZE__POLL_INTERVAL_MS", "50");

            let config = Config::load("resizestop.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.resize.threshold_ms, 250.0);
            assert_eq!(config.resize.poll_interval_ms, 50);
            assert_eq!(config.resize.namespace, "assets");
            assert_eq!(config.window.source, "simulated");
            // Отсутствующие секции берутся из значений по умолчанию
            assert_eq!(config.logging.level, "info");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_negative_threshold() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "resizestop.toml",
                r#"
                [resize]
                threshold_ms = -5.0
                poll_interval_ms = 10
                namespace = "layout"
                "#,
            )?;

            assert!(Config::load("resizestop.toml").is_err());
            Ok(())
        });
    }
}
