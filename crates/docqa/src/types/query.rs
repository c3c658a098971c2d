//! Form inputs and the per-submit query session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::types::UploadedFile;

/// How retrieved chunks are combined into an answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// All chunks concatenated into one prompt
    #[default]
    Stuff,
    /// Extract per chunk, then combine
    MapReduce,
    /// Answer from the first chunk, refine with each following one
    Refine,
    /// Scored answer per chunk, best score wins
    MapRerank,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [Self::Stuff, Self::MapReduce, Self::Refine, Self::MapRerank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stuff => "stuff",
            Self::MapReduce => "map_reduce",
            Self::Refine => "refine",
            Self::MapRerank => "map_rerank",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "stuff" => Ok(Self::Stuff),
            "map_reduce" => Ok(Self::MapReduce),
            "refine" => Ok(Self::Refine),
            "map_rerank" => Ok(Self::MapRerank),
            other => Err(Error::InvalidParameter(format!("unknown strategy '{}'", other))),
        }
    }
}

/// Credential for the hosted service, passed explicitly to every call
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Raw inputs of one submit action; any field may be missing
#[derive(Debug, Clone, Default)]
pub struct SubmitForm {
    pub file: Option<UploadedFile>,
    pub api_key: Option<String>,
    pub question: Option<String>,
    pub k: Option<usize>,
    pub strategy: Option<Strategy>,
}

impl SubmitForm {
    /// Whether file, key and question are all present and non-blank
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    fn missing_field(&self) -> Option<&'static str> {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());

        if self.file.is_none() {
            Some("file")
        } else if blank(&self.api_key) {
            Some("API key")
        } else if blank(&self.question) {
            Some("question")
        } else {
            None
        }
    }

    /// Turn the form into a session, applying defaults and bounds for k
    pub fn into_session(self, bounds: &RetrievalConfig) -> Result<QuerySession> {
        if let Some(field) = self.missing_field() {
            return Err(Error::MissingInput(field));
        }

        let k = self.k.unwrap_or(bounds.default_k);
        if !(bounds.min_k..=bounds.max_k).contains(&k) {
            return Err(Error::InvalidParameter(format!(
                "k must be between {} and {}, got {}",
                bounds.min_k, bounds.max_k, k
            )));
        }

        match (self.file, self.api_key, self.question) {
            (Some(file), Some(api_key), Some(question)) => Ok(QuerySession {
                api_key: ApiKey::new(api_key),
                file,
                question: question.trim().to_string(),
                k,
                strategy: self.strategy.unwrap_or_default(),
            }),
            _ => Err(Error::internal("form completeness check out of sync")),
        }
    }
}

/// Everything one end-to-end run needs
#[derive(Debug, Clone)]
pub struct QuerySession {
    pub api_key: ApiKey,
    pub file: UploadedFile,
    pub question: String,
    pub k: usize,
    pub strategy: Strategy,
}
