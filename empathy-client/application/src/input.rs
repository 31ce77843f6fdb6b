use std::sync::Arc;

use empathy_domain::{AnalysisRequest, DomainError};

use crate::{RequestOrchestrator, SubmitOutcome};

/// Operator text buffer in front of a [`RequestOrchestrator`].
pub struct InputController {
    buffer: String,
    orchestrator: Arc<RequestOrchestrator>,
}

impl InputController {
    pub fn new(orchestrator: Arc<RequestOrchestrator>) -> Self {
        Self {
            buffer: String::new(),
            orchestrator,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replaces the buffer as-is; trimming only happens on submit.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn orchestrator(&self) -> &Arc<RequestOrchestrator> {
        &self.orchestrator
    }

    pub fn request(&self) -> Result<AnalysisRequest, DomainError> {
        AnalysisRequest::new(&self.buffer)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        match self.request() {
            Ok(request) => self.orchestrator.submit(request).await,
            Err(error) => self.orchestrator.reject_invalid(error),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.orchestrator.clear();
    }
}
