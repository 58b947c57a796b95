//! Configuration for the exception handler
//!
//! Two user-facing messages can be overridden: the one returned when a request
//! body can't be read, and the one returned for any uncaught error. Values are
//! looked up in a [`ConfigService`], which is seeded from the process
//! environment.

use crate::error::{Result, SimpleExceptionsError};
use dashmap::DashMap;
use serde::Deserialize;
use std::env;
use std::sync::Arc;

pub const GLOBAL_HANDLER_MESSAGE_KEY: &str = "simple.exceptions.messages.global-handler";
pub const NOT_READABLE_MESSAGE_KEY: &str = "simple.exceptions.messages.not-readable";

pub const DEFAULT_GLOBAL_HANDLER_MESSAGE: &str = "An error has occurred";
pub const DEFAULT_NOT_READABLE_MESSAGE: &str = "Can't read request message";

/// Configuration service
///
/// Keys are matched exactly first, then in their environment-variable form,
/// so `simple.exceptions.messages.not-readable` also finds
/// `SIMPLE_EXCEPTIONS_MESSAGES_NOT_READABLE`.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Create a service preloaded with every environment variable
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config
            .get(key)
            .or_else(|| self.config.get(&env_key(key)))
            .map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

fn env_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Default messages substituted for errors whose detail must not be exposed
///
/// Deserializes with per-field fallbacks so it can be embedded in a larger
/// application config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExceptionMessages {
    /// Returned with 500 for any uncaught error
    #[serde(default = "default_global_handler")]
    pub global_handler: String,

    /// Returned with 400 when the request body can't be parsed
    #[serde(default = "default_not_readable")]
    pub not_readable: String,
}

fn default_global_handler() -> String {
    DEFAULT_GLOBAL_HANDLER_MESSAGE.to_string()
}

fn default_not_readable() -> String {
    DEFAULT_NOT_READABLE_MESSAGE.to_string()
}

impl Default for ExceptionMessages {
    fn default() -> Self {
        Self {
            global_handler: default_global_handler(),
            not_readable: default_not_readable(),
        }
    }
}

impl ExceptionMessages {
    /// Read both messages from the config service
    ///
    /// Unset keys fall back to the built-in defaults. A key that is set but
    /// blank is rejected.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        Ok(Self {
            global_handler: lookup(config, GLOBAL_HANDLER_MESSAGE_KEY)?
                .unwrap_or_else(default_global_handler),
            not_readable: lookup(config, NOT_READABLE_MESSAGE_KEY)?
                .unwrap_or_else(default_not_readable),
        })
    }

    /// Read both messages from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ConfigService::new())
    }

    pub fn with_global_handler(mut self, message: impl Into<String>) -> Self {
        self.global_handler = message.into();
        self
    }

    pub fn with_not_readable(mut self, message: impl Into<String>) -> Self {
        self.not_readable = message.into();
        self
    }
}

fn lookup(config: &ConfigService, key: &str) -> Result<Option<String>> {
    match config.get(key) {
        Some(value) if value.trim().is_empty() => Err(SimpleExceptionsError::invalid_config(
            key,
            "message must not be blank",
        )),
        other => Ok(other),
    }
}
