use serde::Serialize;

use empathy_domain::{AudioResource, EmotionDescriptor};

/// Everything the operator sees for a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub descriptor: EmotionDescriptor,
    pub confidence: f64,
    pub confidence_label: String,
    pub confidence_gauge: String,
    pub text: String,
    pub audio: AudioResource,
}
