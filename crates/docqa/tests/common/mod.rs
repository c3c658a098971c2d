//! Shared fixtures and recording fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use docqa::error::{Error, Result};
use docqa::ingestion::{CharacterSplitter, DocumentLoader, FileLoader, OcrEngine, TextSplitter};
use docqa::providers::{ChatMessage, EmbeddingProvider, LlmProvider};
use docqa::types::{ApiKey, Chunk, Document};
use docqa::QaPipeline;

pub const VALID_KEY: &str = "sk-valid-test-key";

/// Letter-frequency embedding so similar texts land close together
pub fn letter_histogram(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 26];
    for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
        v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
    }
    v
}

/// Embedder that accepts one key and records every batch it is asked for
#[derive(Default)]
pub struct FakeEmbedder {
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl FakeEmbedder {
    pub fn calls(&self) -> usize {
        self.batches.lock().len()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed_batch(&self, key: &ApiKey, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.lock().push(texts.to_vec());
        if key.expose() != VALID_KEY {
            return Err(Error::Authentication(
                "Incorrect API key provided".to_string(),
            ));
        }
        Ok(texts.iter().map(|t| letter_histogram(t)).collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

type Reply = Box<dyn Fn(&[ChatMessage]) -> String + Send + Sync>;

/// Chat model with a prompt size limit and a scripted reply
pub struct FakeLlm {
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
    max_prompt_chars: usize,
    reject_key: bool,
    reply: Reply,
}

impl FakeLlm {
    pub fn new() -> Self {
        Self::with_reply(|messages| format!("Answer built from {} messages", messages.len()))
    }

    pub fn with_reply(reply: impl Fn(&[ChatMessage]) -> String + Send + Sync + 'static) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            max_prompt_chars: usize::MAX,
            reject_key: false,
            reply: Box::new(reply),
        }
    }

    /// Chat endpoint that refuses every key, even one the embedder accepted
    pub fn rejecting_key() -> Self {
        let mut llm = Self::new();
        llm.reject_key = true;
        llm
    }

    pub fn with_limit(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn chat(&self, _key: &ApiKey, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().push(messages.to_vec());
        if self.reject_key {
            return Err(Error::Authentication(
                "Incorrect API key provided".to_string(),
            ));
        }
        let size: usize = messages.iter().map(|m| m.content.chars().count()).sum();
        if size > self.max_prompt_chars {
            return Err(Error::BadRequest(format!(
                "This model's maximum context length is {} characters, got {}",
                self.max_prompt_chars, size
            )));
        }
        Ok((self.reply)(messages))
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-chat"
    }
}

pub struct FixedOcr(pub &'static str);

impl OcrEngine for FixedOcr {
    fn recognize(&self, _path: &Path) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Real file loader that counts invocations
pub struct RecordingLoader {
    inner: FileLoader,
    pub calls: Mutex<usize>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self {
            inner: FileLoader::new(Arc::new(FixedOcr("Text recognized in the picture"))),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl DocumentLoader for RecordingLoader {
    fn load_document(
        &self,
        path: &Path,
        declared_media_type: &str,
        source: &str,
    ) -> Result<Vec<Document>> {
        *self.calls.lock() += 1;
        self.inner.load_document(path, declared_media_type, source)
    }
}

/// Real splitter that counts invocations
pub struct RecordingSplitter {
    inner: CharacterSplitter,
    pub calls: Mutex<usize>,
}

impl RecordingSplitter {
    pub fn new() -> Self {
        Self {
            inner: CharacterSplitter::default(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl TextSplitter for RecordingSplitter {
    fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        *self.calls.lock() += 1;
        self.inner.split_documents(documents)
    }
}

/// Pipeline over fakes, with handles kept for inspection
pub struct Harness {
    pub pipeline: QaPipeline,
    pub embedder: Arc<FakeEmbedder>,
    pub llm: Arc<FakeLlm>,
    pub loader: Arc<RecordingLoader>,
    pub splitter: Arc<RecordingSplitter>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_llm(FakeLlm::new())
    }

    pub fn with_llm(llm: FakeLlm) -> Self {
        let embedder = Arc::new(FakeEmbedder::default());
        let llm = Arc::new(llm);
        let loader = Arc::new(RecordingLoader::new());
        let splitter = Arc::new(RecordingSplitter::new());
        let pipeline = QaPipeline::new(
            embedder.clone(),
            llm.clone(),
            loader.clone(),
            splitter.clone(),
        );
        Self {
            pipeline,
            embedder,
            llm,
            loader,
            splitter,
        }
    }
}

/// PDF with one text line per page
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// DOCX with one paragraph per entry
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}
