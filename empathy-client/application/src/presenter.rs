use chrono::{DateTime, Utc};

use empathy_domain::{
    format_confidence, format_confidence_gauge, AnalysisResult, AudioResourceResolver,
    EmotionPresentationMapper, InteractionState,
};

use crate::AnalysisView;

/// Derives display data from the stored result on demand; holds no result itself.
#[derive(Debug, Clone)]
pub struct ResultPresenter {
    resolver: AudioResourceResolver,
}

impl ResultPresenter {
    pub fn new(base_address: impl Into<String>) -> Self {
        Self {
            resolver: AudioResourceResolver::new(base_address),
        }
    }

    pub fn present(&self, result: &AnalysisResult) -> AnalysisView {
        self.present_at(result, Utc::now())
    }

    pub fn present_at(&self, result: &AnalysisResult, now: DateTime<Utc>) -> AnalysisView {
        AnalysisView {
            descriptor: EmotionPresentationMapper::describe(result.emotion),
            confidence: result.confidence.value(),
            confidence_label: format_confidence(result.confidence),
            confidence_gauge: format_confidence_gauge(result.confidence),
            text: result.text.clone(),
            audio: self.resolver.resolve_at(result, now),
        }
    }

    pub fn present_state(&self, state: &InteractionState) -> Option<AnalysisView> {
        state.result().map(|result| self.present(result))
    }
}
