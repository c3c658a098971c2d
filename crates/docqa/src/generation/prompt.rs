//! Prompt templates for the combination strategies

use crate::providers::ChatMessage;
use crate::retrieval::RetrievalHit;

/// Prompt builder for document question answering
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join chunk texts with blank lines
    pub fn build_context(hits: &[RetrievalHit]) -> String {
        hits.iter()
            .map(|h| h.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Single prompt carrying every retrieved chunk
    pub fn stuff(question: &str, context: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "Use the following pieces of context to answer the user's question. \n\
                 If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
                 ----------------\n\
                 {context}"
            )),
            ChatMessage::user(question),
        ]
    }

    /// Per-chunk extraction step of map-reduce
    pub fn map_extract(question: &str, chunk: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "Use the following portion of a long document to see if any of the text is relevant to answer the question. \n\
                 Return any relevant text verbatim.\n\
                 ______________________\n\
                 {chunk}"
            )),
            ChatMessage::user(question),
        ]
    }

    /// Final step of map-reduce over the extracted passages
    pub fn reduce_combine(question: &str, summaries: &[String]) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(format!(
                "Given the following extracted parts of a long document and a question, create a final answer. \n\
                 If you don't know the answer, just say that you don't know. Don't try to make up an answer.\n\
                 ______________________\n\
                 {}",
                summaries.join("\n\n")
            )),
            ChatMessage::user(question),
        ]
    }

    /// First answer of the refine strategy
    pub fn refine_initial(question: &str, chunk: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(format!(
            "Context information is below. \n\
             ------------\n\
             {chunk}\n\
             ------------\n\
             Given the context information and not prior knowledge, answer any questions\n\
             {question}"
        ))]
    }

    /// Refinement of an existing answer with one more chunk
    pub fn refine_step(question: &str, existing_answer: &str, chunk: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::user(question),
            ChatMessage::assistant(existing_answer),
            ChatMessage::user(format!(
                "We have the opportunity to refine the existing answer (only if needed) with some more context below.\n\
                 ------------\n\
                 {chunk}\n\
                 ------------\n\
                 Given the new context, refine the original answer to better answer the question. \
                 If the context isn't useful, return the original answer."
            )),
        ]
    }

    /// Per-chunk scored answer of map-rerank
    pub fn rerank_scored(question: &str, chunk: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(format!(
            "Use the following pieces of context to answer the question at the end. \
             If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
             In addition to giving an answer, also return a score of how fully it answered the user's question. \
             This should be in the following format:\n\n\
             Question: [question here]\n\
             Helpful Answer: [answer here]\n\
             Score: [score between 0 and 100]\n\n\
             How to determine the score:\n\
             - Higher is a better answer\n\
             - Better responds fully to the asked question, with sufficient level of detail\n\
             - If you do not know the answer based on the context, that should be a score of 0\n\
             - Don't be overconfident!\n\n\
             Begin!\n\n\
             Context:\n\
             ---------\n\
             {chunk}\n\
             ---------\n\
             Question: {question}\n\
             Helpful Answer:"
        ))]
    }
}
