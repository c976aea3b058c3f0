//! Converter configuration.

use std::time::Duration;

use purchase_fx::RateSourceConfig;

/// Main converter configuration.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Maximum ids per storage lookup.
    pub batch_size: usize,
    /// Maximum concurrent match/convert tasks.
    pub max_concurrency: usize,
    /// Deadline for a whole conversion request.
    pub deadline: Option<Duration>,
    /// Rate source configuration.
    pub rate_source: RateSourceConfig,
    /// Log level.
    pub log_level: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrency: 10,
            deadline: None,
            rate_source: RateSourceConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            rate_source: RateSourceConfig::from_env(),
            ..Self::default()
        };

        if let Ok(size) = std::env::var("CONVERTER_BATCH_SIZE") {
            if let Ok(size) = size.parse() {
                config.batch_size = size;
            }
        }

        if let Ok(workers) = std::env::var("CONVERTER_MAX_CONCURRENCY") {
            if let Ok(workers) = workers.parse() {
                config.max_concurrency = workers;
            }
        }

        if let Ok(secs) = std::env::var("CONVERTER_DEADLINE_SECS") {
            if let Ok(secs) = secs.parse() {
                config.deadline = Some(Duration::from_secs(secs));
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("Batch size cannot be 0".to_string());
        }

        if self.max_concurrency == 0 {
            return Err("Max concurrency cannot be 0".to_string());
        }

        if self.deadline.is_some_and(|d| d.is_zero()) {
            return Err("Deadline cannot be 0".to_string());
        }

        self.rate_source.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_concurrency, 10);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ConverterConfig::default();
        config.max_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = ConverterConfig::default();
        config.rate_source.default_page_size = 0;
        assert!(config.validate().is_err());

        let mut config = ConverterConfig::default();
        config.deadline = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
