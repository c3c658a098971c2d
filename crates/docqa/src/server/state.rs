//! Application state for the question-answering server

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::QaConfig;
use crate::error::Result;
use crate::pipeline::QaPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: QaConfig,
    /// Orchestrator for submit actions
    pipeline: QaPipeline,
    /// Held for the duration of one run
    run_lock: Mutex<()>,
}

impl AppState {
    /// Create state with the production pipeline
    pub fn new(config: QaConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");
        let pipeline = QaPipeline::from_config(&config)?;
        tracing::info!(
            "Pipeline ready (chat model {}, embedding model {})",
            config.openai.chat_model,
            config.embeddings.model
        );
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create state around an already wired pipeline
    pub fn with_pipeline(config: QaConfig, pipeline: QaPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                run_lock: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &QaConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &QaPipeline {
        &self.inner.pipeline
    }

    /// Wait until no other run is in progress
    pub async fn acquire_run(&self) -> MutexGuard<'_, ()> {
        self.inner.run_lock.lock().await
    }

    /// Whether a run is in progress right now
    pub fn is_busy(&self) -> bool {
        self.inner.run_lock.try_lock().is_err()
    }
}
