//! Environment-driven server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chronicle_completion::{DEFAULT_ENDPOINT, DEFAULT_MODEL, OpenAiConfig};

use crate::error::AppError;

const DEFAULT_ENVIRONMENT: &str = "Development";
const DEFAULT_STATIC_RESPONSE: &str = "{}";

/// Where version chains are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process-local; lost on restart.
    Memory,
    /// One file per blob under the given root.
    Filesystem(PathBuf),
}

/// Which completion engine proposals go to.
#[derive(Debug, Clone)]
pub enum CompletionConfig {
    /// An OpenAI-compatible chat completions endpoint.
    OpenAi(OpenAiConfig),
    /// A fixed response, for local development.
    Static(String),
}

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Provenance label written into every committed version.
    pub environment: String,
    /// Blob storage backend.
    pub storage: StorageConfig,
    /// Completion engine backend.
    pub completion: CompletionConfig,
    /// Directory whose `<template_id>.txt` files override the bundled
    /// templates.
    pub template_dir: Option<PathBuf>,
    /// OTLP collector endpoint; trace export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first invalid variable.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first invalid variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let environment =
            var("CHRONICLE_ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned());

        let storage = match var("CHRONICLE_STORAGE").as_deref().map(str::trim) {
            None | Some("memory") => StorageConfig::Memory,
            Some("filesystem") => {
                let root = var("CHRONICLE_STORAGE_ROOT").ok_or_else(|| {
                    AppError::Config(
                        "CHRONICLE_STORAGE_ROOT must be set when CHRONICLE_STORAGE=filesystem"
                            .into(),
                    )
                })?;
                StorageConfig::Filesystem(PathBuf::from(root))
            }
            Some(other) => {
                return Err(AppError::Config(format!(
                    "CHRONICLE_STORAGE must be `memory` or `filesystem`, got `{other}`"
                )));
            }
        };

        let completion_mode = var("CHRONICLE_COMPLETION").unwrap_or_else(|| {
            if is_local_environment(&environment) {
                "static".to_owned()
            } else {
                "openai".to_owned()
            }
        });
        let completion = match completion_mode.trim() {
            "static" => CompletionConfig::Static(
                var("CHRONICLE_STATIC_COMPLETION")
                    .unwrap_or_else(|| DEFAULT_STATIC_RESPONSE.to_owned()),
            ),
            "openai" => CompletionConfig::OpenAi(openai_config(&var)?),
            other => {
                return Err(AppError::Config(format!(
                    "CHRONICLE_COMPLETION must be `openai` or `static`, got `{other}`"
                )));
            }
        };

        Ok(Self {
            host,
            port,
            environment,
            storage,
            completion,
            template_dir: var("CHRONICLE_TEMPLATE_DIR").map(PathBuf::from),
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn is_local_environment(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("development") || environment.eq_ignore_ascii_case("testing")
}

fn openai_config(var: &impl Fn(&str) -> Option<String>) -> Result<OpenAiConfig, AppError> {
    let api_key = var("OPENAI_API_KEY").ok_or_else(|| {
        AppError::Config("OPENAI_API_KEY must be set when CHRONICLE_COMPLETION=openai".into())
    })?;
    let timeout = var("OPENAI_TIMEOUT_SECS")
        .map(|raw| {
            raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                AppError::Config(format!("OPENAI_TIMEOUT_SECS must be a whole number: {e}"))
            })
        })
        .transpose()?;

    Ok(OpenAiConfig {
        api_key,
        endpoint: var("OPENAI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
        model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        timeout,
    })
}
