//! Test doubles for the model and embedding seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::rag::embeddings::{ensure_text, normalize, Embedder, Embedding};
use crate::utilities::errors::{CrewError, Result};

/// LLM that replays queued responses, then falls back to a default.
#[derive(Debug)]
pub struct ScriptedLLM {
    queued: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<Vec<LLMMessage>>>,
}

impl ScriptedLLM {
    /// Always answer `response`.
    pub fn always(response: impl Into<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Some(response.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer each response once, in order; fail afterwards.
    pub fn sequence<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queued: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with `message`.
    pub fn failing(message: &str) -> Self {
        let llm = Self::sequence(Vec::<String>::new());
        llm.queued
            .lock()
            .push_back(Err(CrewError::Llm(message.to_string())));
        llm
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Messages sent on the `n`th call.
    pub fn sent(&self, n: usize) -> Vec<LLMMessage> {
        self.calls.lock()[n].clone()
    }
}

#[async_trait]
impl BaseLLM for ScriptedLLM {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn call(&self, messages: Vec<LLMMessage>) -> Result<String> {
        self.calls.lock().push(messages);
        if let Some(next) = self.queued.lock().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(response) => Ok(response.clone()),
            None => Err(CrewError::Llm("script exhausted".to_string())),
        }
    }
}

/// Bag-of-words embedder: identical prompts embed identically, prompts
/// sharing no words are orthogonal.
#[derive(Debug, Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub const DIMENSIONS: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = ensure_text(text)?;
        let mut vector = vec![0.0f32; Self::DIMENSIONS];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let bucket = word
                .bytes()
                .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
                % Self::DIMENSIONS;
            vector[bucket] += 1.0;
        }
        normalize(vector)
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// YAML reply a synthesizer model would give for a two-agent crew.
pub const TWO_AGENT_REPLY: &str = "```yaml
agents:
  - role: Poet
    goal: Write evocative verse
    backstory: A lifelong lover of the sea.
  - role: Editor
    goal: Tighten the wording
    backstory: Has edited a hundred anthologies.
```";
