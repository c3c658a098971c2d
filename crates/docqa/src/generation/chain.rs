//! Retrieval-augmented answering with the four combination strategies

use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::retrieval::{RetrievalHit, Retriever};
use crate::types::{ApiKey, Strategy};

use super::prompt::PromptBuilder;

/// Final answer plus the chunks it was produced from
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<RetrievalHit>,
}

/// Answer text and self-reported score from one map-rerank call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub answer: String,
    pub score: u32,
}

/// Parse `<answer>\nScore: <n>` output; `None` when the format is not followed
pub fn parse_scored_answer(output: &str) -> Option<ScoredAnswer> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"(?s)^(.*?)\n\s*Score:\s*(\d+)").ok())
        .as_ref()?;

    let caps = pattern.captures(output.trim())?;
    let answer = caps[1].trim();
    let answer = answer
        .strip_prefix("Helpful Answer:")
        .map(str::trim)
        .unwrap_or(answer);
    let score = caps[2].parse().ok()?;

    Some(ScoredAnswer {
        answer: answer.to_string(),
        score,
    })
}

/// Drives the chat model over retrieved chunks
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Retrieve up to k chunks for the question and combine them per `strategy`
    pub async fn answer(
        &self,
        key: &ApiKey,
        question: &str,
        retriever: &Retriever,
        strategy: Strategy,
    ) -> Result<Answer> {
        let hits = retriever.retrieve(question).await?;

        tracing::info!(
            "Answering with strategy {} over {} chunks using {}",
            strategy,
            hits.len(),
            self.llm.model()
        );

        let text = match strategy {
            Strategy::Stuff => self.stuff(key, question, &hits).await?,
            Strategy::MapReduce => self.map_reduce(key, question, &hits).await?,
            Strategy::Refine => self.refine(key, question, &hits).await?,
            Strategy::MapRerank => self.map_rerank(key, question, &hits).await?,
        };

        Ok(Answer {
            text: text.trim().to_string(),
            sources: hits,
        })
    }

    async fn stuff(&self, key: &ApiKey, question: &str, hits: &[RetrievalHit]) -> Result<String> {
        let context = PromptBuilder::build_context(hits);
        self.llm.chat(key, &PromptBuilder::stuff(question, &context)).await
    }

    async fn map_reduce(&self, key: &ApiKey, question: &str, hits: &[RetrievalHit]) -> Result<String> {
        let mut extracts = Vec::with_capacity(hits.len());
        for hit in hits {
            let messages = PromptBuilder::map_extract(question, &hit.chunk.text);
            extracts.push(self.llm.chat(key, &messages).await?);
        }
        self.llm
            .chat(key, &PromptBuilder::reduce_combine(question, &extracts))
            .await
    }

    async fn refine(&self, key: &ApiKey, question: &str, hits: &[RetrievalHit]) -> Result<String> {
        let Some((first, rest)) = hits.split_first() else {
            return self.llm.chat(key, &PromptBuilder::refine_initial(question, "")).await;
        };

        let mut answer = self
            .llm
            .chat(key, &PromptBuilder::refine_initial(question, &first.chunk.text))
            .await?;
        for hit in rest {
            let messages = PromptBuilder::refine_step(question, &answer, &hit.chunk.text);
            answer = self.llm.chat(key, &messages).await?;
        }
        Ok(answer)
    }

    async fn map_rerank(&self, key: &ApiKey, question: &str, hits: &[RetrievalHit]) -> Result<String> {
        let mut best: Option<ScoredAnswer> = None;
        for hit in hits {
            let output = self
                .llm
                .chat(key, &PromptBuilder::rerank_scored(question, &hit.chunk.text))
                .await?;

            match parse_scored_answer(&output) {
                Some(scored) => {
                    if best.as_ref().map_or(true, |b| scored.score > b.score) {
                        best = Some(scored);
                    }
                }
                None => tracing::warn!("Discarding unscored map_rerank output"),
            }
        }

        best.map(|b| b.answer)
            .ok_or_else(|| Error::service(self.llm.name(), "no chunk produced a scored answer"))
    }
}
