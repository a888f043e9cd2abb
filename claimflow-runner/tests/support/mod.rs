#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

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
