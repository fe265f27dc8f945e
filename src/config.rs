use std::env;

use crate::engine::DEFAULT_MAX_CAPACITY_KG;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub event_buffer_size: usize,
    pub max_capacity_kg: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let max_capacity_kg: f64 = parse_or_default("MAX_CAPACITY_KG", DEFAULT_MAX_CAPACITY_KG)?;
        if !max_capacity_kg.is_finite() || max_capacity_kg <= 0.0 {
            return Err(AppError::Internal(format!(
                "invalid MAX_CAPACITY_KG: {max_capacity_kg} must be > 0"
            )));
        }

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") | Err(_) => LogFormat::Compact,
            Ok(other) => {
                return Err(AppError::Internal(format!("invalid LOG_FORMAT: {other}")));
            }
        };

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            max_capacity_kg,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
