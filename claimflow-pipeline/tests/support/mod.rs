#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use claimflow_core::{ClaimflowError, GenerationRequest, ModelInvoker};

/// Answers by model id and records every request it sees.
#[derive(Default)]
pub struct ScriptedInvoker {
    replies: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, model_id: &str, text: &str) -> Self {
        self.replies
            .insert(model_id.to_string(), Ok(text.to_string()));
        self
    }

    pub fn fail(mut self, model_id: &str, message: &str) -> Self {
        self.replies
            .insert(model_id.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(&self, request: GenerationRequest) -> Result<String, ClaimflowError> {
        self.calls.lock().unwrap().push(request.clone());
        match self.replies.get(&request.model_id) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(ClaimflowError::provider(&request.model_id, message)),
            None => Err(ClaimflowError::provider(&request.model_id, "no scripted reply")),
        }
    }
}

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Installs a formatter writing into this sink for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// First line mentioning `needle`, if any.
    pub fn line_containing(&self, needle: &str) -> Option<String> {
        self.contents()
            .lines()
            .find(|line| line.contains(needle))
            .map(str::to_string)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
