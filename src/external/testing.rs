//! Scripted backends for tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::backend::{BackendError, BackendRequest, Evaluator, Generator, Result};
use super::speech::{Speaker, SpeechError};

/// `{"vocabulary": [...]}` payload from `(meaning_en, language, word, vocab_types)` tuples
pub fn vocab_reply(items: &[(&str, &str, &str, &[&str])]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(meaning, language, word, types)| {
            json!({
                "meaning_en": meaning,
                "language": language,
                "word": word,
                "categories": [],
                "vocab_types": types,
            })
        })
        .collect();
    json!({ "vocabulary": items })
}

/// Replies from a queue; `Err` entries become malformed-reply failures.
/// An exhausted queue answers with an empty vocabulary list.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<std::result::Result<Value, String>>>,
    requests: Mutex<Vec<BackendRequest>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Value>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    pub fn with_results(replies: Vec<std::result::Result<Value, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: BackendRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(BackendError::MalformedReply(message)),
            None => Ok(json!({ "vocabulary": [] })),
        }
    }
}

/// Always answers with the same rating payload and counts calls
pub struct CountingEvaluator {
    reply: Value,
    calls: AtomicUsize,
    requests: Mutex<Vec<BackendRequest>>,
}

impl CountingEvaluator {
    pub fn new(reply: Value) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn scoring(score: i64, hints: &str) -> Self {
        Self::new(json!({ "score": score, "hints": hints }))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Evaluator for CountingEvaluator {
    async fn evaluate(&self, request: BackendRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }
}

/// Remembers every utterance
#[derive(Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<(String, String)>>,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().unwrap().clone()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, text: &str, language: &str) -> std::result::Result<(), SpeechError> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), language.to_string()));
        Ok(())
    }
}
