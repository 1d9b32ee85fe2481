use async_trait::async_trait;
use fv_core::{ChatRequest, ChatResponse, FvError, Llm, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted backend: replies are consumed in order, one per call.
///
/// Once the script runs out every call fails with a model error, which lets tests drive
/// the fallback path by simply scripting fewer replies than there are calls.
pub struct MockLlm {
    name: String,
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(FvError::Model(message.into())));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, reply: Result<String>) {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).push_back(reply);
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let model = request.model.clone().unwrap_or_else(|| self.name.clone());
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request);

        let reply = self.replies.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        match reply {
            Some(Ok(content)) => Ok(ChatResponse::new(model, content)),
            Some(Err(err)) => Err(err),
            None => Err(FvError::Model(format!("{}: no scripted reply left", self.name))),
        }
    }
}
