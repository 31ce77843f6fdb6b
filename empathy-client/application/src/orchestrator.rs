use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use uuid::Uuid;

use empathy_domain::{AnalysisRequest, AnalysisResult, AnalysisServicePort, DomainError, InteractionState};

/// What happened to a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The attempt moved the interaction into this state.
    Applied(InteractionState),
    /// Another request was already in flight; nothing changed.
    Rejected,
    /// The response arrived after a clear or newer submission and was dropped.
    Superseded,
}

/// Proof that a request was admitted. Only the current generation may complete.
#[derive(Debug)]
pub struct SubmissionTicket {
    interaction_id: Uuid,
    generation: u64,
    request: AnalysisRequest,
}

impl SubmissionTicket {
    pub fn interaction_id(&self) -> Uuid {
        self.interaction_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }
}

struct Inner {
    state: InteractionState,
    generation: u64,
}

/// Sole owner and writer of the [`InteractionState`].
///
/// Admission and completion happen under one lock, and each transition is published on a
/// watch channel before the lock is released, so subscribers observe transitions in
/// the order they were applied.
pub struct RequestOrchestrator {
    service: Arc<dyn AnalysisServicePort>,
    inner: Mutex<Inner>,
    publisher: watch::Sender<InteractionState>,
}

impl RequestOrchestrator {
    pub fn new(service: Arc<dyn AnalysisServicePort>) -> Self {
        let (publisher, _) = watch::channel(InteractionState::Idle);
        Self {
            service,
            inner: Mutex::new(Inner {
                state: InteractionState::Idle,
                generation: 0,
            }),
            publisher,
        }
    }

    pub fn base_url(&self) -> &str {
        self.service.base_url()
    }

    pub fn state(&self) -> InteractionState {
        self.lock().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn subscribe(&self) -> watch::Receiver<InteractionState> {
        self.publisher.subscribe()
    }

    /// Moves to `Submitting` unless a request is already in flight.
    pub fn begin(&self, request: AnalysisRequest) -> Option<SubmissionTicket> {
        let mut inner = self.lock();
        if inner.state.is_submitting() {
            tracing::debug!(generation = inner.generation, "submit ignored, request in flight");
            return None;
        }

        inner.generation += 1;
        let ticket = SubmissionTicket {
            interaction_id: Uuid::new_v4(),
            generation: inner.generation,
            request,
        };
        tracing::info!(
            interaction_id = %ticket.interaction_id,
            generation = ticket.generation,
            text_len = ticket.request.text().len(),
            "submitting narrative for analysis"
        );
        self.transition(&mut inner, InteractionState::Submitting);
        Some(ticket)
    }

    /// Calls the service for an admitted ticket and applies the outcome.
    pub async fn execute(&self, ticket: SubmissionTicket) -> SubmitOutcome {
        let outcome = self
            .service
            .analyze(ticket.request())
            .await
            .and_then(AnalysisResult::try_from);
        self.complete(ticket, outcome)
    }

    pub async fn submit(&self, request: AnalysisRequest) -> SubmitOutcome {
        match self.begin(request) {
            Some(ticket) => self.execute(ticket).await,
            None => SubmitOutcome::Rejected,
        }
    }

    /// Applies a response, unless the ticket belongs to a superseded generation.
    pub fn complete(
        &self,
        ticket: SubmissionTicket,
        outcome: Result<AnalysisResult, DomainError>,
    ) -> SubmitOutcome {
        let mut inner = self.lock();
        if ticket.generation != inner.generation || !inner.state.is_submitting() {
            tracing::debug!(
                interaction_id = %ticket.interaction_id,
                generation = ticket.generation,
                current_generation = inner.generation,
                "discarding stale analysis response"
            );
            return SubmitOutcome::Superseded;
        }

        let next = match outcome {
            Ok(result) => {
                tracing::info!(
                    interaction_id = %ticket.interaction_id,
                    emotion = %result.emotion,
                    confidence = result.confidence.value(),
                    "analysis succeeded"
                );
                InteractionState::Succeeded(result)
            }
            Err(error) => {
                log_failure(ticket.interaction_id, &error);
                InteractionState::Failed(error.to_string())
            }
        };
        self.transition(&mut inner, next.clone());
        SubmitOutcome::Applied(next)
    }

    /// Records a locally detected failure (empty input) without contacting the service.
    pub fn reject_invalid(&self, error: DomainError) -> SubmitOutcome {
        let mut inner = self.lock();
        if inner.state.is_submitting() {
            return SubmitOutcome::Rejected;
        }

        inner.generation += 1;
        tracing::debug!(error.kind = error.kind(), "submission rejected locally");
        let next = InteractionState::Failed(error.to_string());
        self.transition(&mut inner, next.clone());
        SubmitOutcome::Applied(next)
    }

    /// Returns to `Idle`; any response still in flight becomes stale.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        if inner.state != InteractionState::Idle {
            tracing::debug!(generation = inner.generation, "interaction cleared");
            self.transition(&mut inner, InteractionState::Idle);
        }
    }

    fn transition(&self, inner: &mut Inner, next: InteractionState) {
        inner.state = next.clone();
        self.publisher.send_replace(next);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_failure(interaction_id: Uuid, error: &DomainError) {
    match error {
        DomainError::Transport { base_url, reason } => tracing::warn!(
            %interaction_id,
            error.kind = error.kind(),
            base_url = %base_url,
            reason = %reason,
            "analysis service unreachable"
        ),
        error if error.is_contract_mismatch() => tracing::error!(
            %interaction_id,
            error.kind = error.kind(),
            error = %error,
            "analysis response violates the service contract"
        ),
        error => tracing::warn!(
            %interaction_id,
            error.kind = error.kind(),
            error = %error,
            "analysis failed"
        ),
    }
}
