//! OCR engine implementations
//!
//! This module contains implementations of the TextRecognizer trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
mod models;

use crate::config::Config;
use crate::engine::{Serialized, TextRecognizer};
use crate::error::PlateError;
use serde::Serialize;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supported_languages: Vec<String>,
}

/// Registry of available OCR engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn TextRecognizer>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a new engine registry with all available engines initialized
    #[allow(unused_variables, unused_mut)]
    pub fn new(config: &Config) -> Result<Self, PlateError> {
        let mut engines: Vec<Arc<dyn TextRecognizer>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        {
            tracing::info!("Initializing ocrs engine...");
            engines.push(Arc::new(ocrs::OcrsEngine::new(config)?));
        }

        #[cfg(feature = "engine-leptess")]
        {
            tracing::info!("Initializing leptess engine...");
            engines.push(Arc::new(leptess::LeptessEngine::new(config)?));
        }

        if engines.is_empty() {
            return Err(PlateError::InitializationError(
                "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string()
            ));
        }

        Self::from_engines(engines)
    }

    /// Build a registry from already constructed engines; the first one is the default
    pub fn from_engines(engines: Vec<Arc<dyn TextRecognizer>>) -> Result<Self, PlateError> {
        let default_engine = engines
            .first()
            .map(|e| e.name().to_string())
            .ok_or_else(|| PlateError::InitializationError("Engine list is empty".to_string()))?;

        Ok(Self {
            engines,
            default_engine,
        })
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn TextRecognizer>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Get the default engine
    pub fn default(&self) -> Option<Arc<dyn TextRecognizer>> {
        self.get(&self.default_engine)
    }

    /// Get the default engine name
    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// List all available engine names
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Pick the engine handed to the pipeline, optionally behind a lock
    pub fn select(
        &self,
        name: Option<&str>,
        serialize: bool,
    ) -> Result<Arc<dyn TextRecognizer>, PlateError> {
        let engine = match name {
            Some(name) => self
                .get(name)
                .ok_or_else(|| PlateError::UnknownEngine(name.to_string()))?,
            None => self
                .default()
                .ok_or_else(|| PlateError::UnknownEngine(self.default_engine.clone()))?,
        };

        tracing::info!(
            "Using OCR engine '{}'{}",
            engine.name(),
            if serialize { " (serialized)" } else { "" }
        );

        if serialize {
            Ok(Arc::new(Serialized::new(engine)))
        } else {
            Ok(engine)
        }
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name(),
                description: e.description(),
                supported_languages: e.supported_languages(),
            })
            .collect()
    }
}
