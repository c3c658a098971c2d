//! End-to-end orchestration of one submit action
//!
//! Each submit walks an explicit phase machine:
//!
//! ```text
//! Idle -> CollectingInputs -> ValidatingKey -> RunningPipeline -> DisplayingResult -> Idle
//!               |                   |                 |
//!               v                   +-----------------+--> DisplayingError -> Idle
//!              Idle (incomplete form)
//! ```
//!
//! The key is checked with a one-string embedding request before anything touches
//! the upload. Every stage returns a tagged `Result`; the first failure ends the
//! run with that stage's message and nothing is retried.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Locale, QaConfig, RetrievalConfig};
use crate::error::{Error, ErrorKind, Result};
use crate::generation::{Answer, AnswerGenerator};
use crate::ingestion::{
    stage_upload, CharacterSplitter, DocumentLoader, FileLoader, TesseractOcr, TextSplitter,
};
use crate::providers::{EmbeddingProvider, LlmProvider, OpenAiClient};
use crate::retrieval::{Retriever, VectorIndex};
use crate::types::{ApiKey, QuerySession, SubmitForm};

/// Text embedded to check that a key is accepted
const KEY_CHECK_TEXT: &str = "test";

/// Phases of one submit action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    CollectingInputs,
    ValidatingKey,
    RunningPipeline,
    DisplayingResult,
    DisplayingError,
}

impl Phase {
    /// Whether `next` may directly follow `self`
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, CollectingInputs)
                | (CollectingInputs, Idle)
                | (CollectingInputs, ValidatingKey)
                | (ValidatingKey, RunningPipeline)
                | (ValidatingKey, DisplayingError)
                | (RunningPipeline, DisplayingResult)
                | (RunningPipeline, DisplayingError)
                | (DisplayingResult, Idle)
                | (DisplayingError, Idle)
        )
    }
}

/// Tracks the current phase and every phase visited
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    current: Phase,
    history: Vec<Phase>,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            current: Phase::Idle,
            history: vec![Phase::Idle],
        }
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Move to `next`, rejecting transitions outside the diagram
    pub fn advance(&mut self, next: Phase) -> Result<()> {
        if !self.current.can_transition_to(next) {
            return Err(Error::internal(format!(
                "illegal phase transition {:?} -> {:?}",
                self.current, next
            )));
        }
        tracing::debug!("Phase {:?} -> {:?}", self.current, next);
        self.current = next;
        self.history.push(next);
        Ok(())
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline step a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Inputs,
    ValidateKey,
    Staging,
    Load,
    Split,
    Embed,
    Index,
    Answer,
}

/// Why a run ended without an answer
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub detail: String,
    /// Translated message for display
    pub message: String,
}

impl Failure {
    pub fn new(stage: Stage, error: &Error, locale: Locale) -> Self {
        Self {
            stage,
            kind: error.kind(),
            detail: error.detail(),
            message: error.user_message(locale),
        }
    }
}

/// Outcome of one submit action
#[derive(Debug)]
pub struct RunReport {
    pub outcome: std::result::Result<Answer, Failure>,
    /// Phases visited, starting and ending at `Idle`
    pub phases: Vec<Phase>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Orchestrator wiring loader, splitter, embeddings, index and generator
pub struct QaPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    loader: Arc<dyn DocumentLoader>,
    splitter: Arc<dyn TextSplitter>,
    generator: AnswerGenerator,
    bounds: RetrievalConfig,
    locale: Locale,
}

impl QaPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        loader: Arc<dyn DocumentLoader>,
        splitter: Arc<dyn TextSplitter>,
    ) -> Self {
        Self {
            embedder,
            loader,
            splitter,
            generator: AnswerGenerator::new(llm),
            bounds: RetrievalConfig::default(),
            locale: Locale::default(),
        }
    }

    /// Production wiring: OpenAI-compatible client, file loader with tesseract, character splitter
    pub fn from_config(config: &QaConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(config)?);
        let ocr = Arc::new(TesseractOcr::new(&config.ocr));
        if !ocr.is_available() {
            tracing::warn!(
                "{} not found; image uploads will fail until it is installed",
                config.ocr.command
            );
        }

        Ok(Self::new(
            client.clone(),
            client,
            Arc::new(FileLoader::new(ocr)),
            Arc::new(CharacterSplitter::from_config(&config.chunking)?),
        )
        .with_bounds(config.retrieval.clone())
        .with_locale(config.ui.locale))
    }

    pub fn with_bounds(mut self, bounds: RetrievalConfig) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn bounds(&self) -> &RetrievalConfig {
        &self.bounds
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Handle one submit action from raw form inputs
    pub async fn submit(&self, form: SubmitForm) -> RunReport {
        let start = Instant::now();
        let mut machine = PhaseMachine::new();
        self.step(&mut machine, Phase::CollectingInputs);

        let session = match form.into_session(&self.bounds) {
            Ok(session) => session,
            Err(e) => {
                tracing::info!("Submit rejected: {}", e);
                self.step(&mut machine, Phase::Idle);
                return RunReport {
                    outcome: Err(Failure::new(Stage::Inputs, &e, self.locale)),
                    phases: machine.history().to_vec(),
                    elapsed: start.elapsed(),
                };
            }
        };

        let outcome = self.execute(&mut machine, &session).await;
        let terminal = if outcome.is_ok() {
            Phase::DisplayingResult
        } else {
            Phase::DisplayingError
        };
        self.step(&mut machine, terminal);
        self.step(&mut machine, Phase::Idle);

        let elapsed = start.elapsed();
        match &outcome {
            Ok(answer) => tracing::info!(
                "Answered in {:?} from {} sources",
                elapsed,
                answer.sources.len()
            ),
            Err(failure) => tracing::warn!(
                "Run failed at {:?} ({}): {}",
                failure.stage,
                failure.kind.as_str(),
                failure.detail
            ),
        }

        RunReport {
            outcome,
            phases: machine.history().to_vec(),
            elapsed,
        }
    }

    /// Run a complete session
    pub async fn run(&self, session: QuerySession) -> RunReport {
        let form = SubmitForm {
            api_key: Some(session.api_key.expose().to_string()),
            question: Some(session.question),
            k: Some(session.k),
            strategy: Some(session.strategy),
            file: Some(session.file),
        };
        self.submit(form).await
    }

    fn step(&self, machine: &mut PhaseMachine, next: Phase) {
        if let Err(e) = machine.advance(next) {
            tracing::error!("{}", e);
        }
    }

    async fn execute(
        &self,
        machine: &mut PhaseMachine,
        session: &QuerySession,
    ) -> std::result::Result<Answer, Failure> {
        let fail = |stage: Stage| move |e: Error| Failure::new(stage, &e, self.locale);

        self.step(machine, Phase::ValidatingKey);
        self.validate_key(&session.api_key)
            .await
            .map_err(fail(Stage::ValidateKey))?;

        self.step(machine, Phase::RunningPipeline);
        tracing::info!(
            "Running pipeline for {} ({}), k={}, strategy={}",
            session.file.name,
            session.file.content_type,
            session.k,
            session.strategy
        );

        let staged = stage_upload(&session.file).map_err(fail(Stage::Staging))?;

        let loader = self.loader.clone();
        let path = staged.path().to_path_buf();
        let declared = session.file.content_type.clone();
        let source = session.file.name.clone();
        let documents = tokio::task::spawn_blocking(move || {
            loader.load_document(&path, &declared, &source)
        })
        .await
        .map_err(|e| Error::internal(format!("Task join error: {}", e)))
        .and_then(|r| r)
        .map_err(fail(Stage::Load))?;
        drop(staged);

        let chunks = self.splitter.split_documents(&documents);
        tracing::info!("Split {} documents into {} chunks", documents.len(), chunks.len());
        if chunks.is_empty() {
            return Err(fail(Stage::Split)(Error::document_read(
                &session.file.name,
                "no text could be extracted",
            )));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed_batch(&session.api_key, &texts)
            .await
            .map_err(fail(Stage::Embed))?;

        let index = VectorIndex::build(chunks, vectors).map_err(fail(Stage::Index))?;
        let retriever = Retriever::new(
            self.embedder.clone(),
            session.api_key.clone(),
            index,
            session.k,
        );

        self.generator
            .answer(&session.api_key, &session.question, &retriever, session.strategy)
            .await
            .map_err(fail(Stage::Answer))
    }

    async fn validate_key(&self, key: &ApiKey) -> Result<()> {
        if key.is_blank() {
            return Err(Error::Authentication("no API key provided".into()));
        }
        self.embedder
            .embed_batch(key, &[KEY_CHECK_TEXT.to_string()])
            .await
            .map(|_| ())
    }
}
