use chrono::{DateTime, Utc};

use crate::{AnalysisResult, AudioResource, Confidence, DomainError, EmotionCategory, EmotionDescriptor};

pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

pub struct EmotionPresentationMapper;

impl EmotionPresentationMapper {
    pub fn describe(emotion: EmotionCategory) -> EmotionDescriptor {
        let (color, icon, label, style_class) = match emotion {
            EmotionCategory::Joy => ("#f59e0b", "✨", "JOY", "border-glow-joy"),
            EmotionCategory::Sadness => ("#6366f1", "💙", "SADNESS", "border-glow-sadness"),
            EmotionCategory::Anger => ("#ef4444", "🔥", "ANGER", "border-glow-anger"),
            EmotionCategory::Neutral => ("#94a3b8", "◆", "NEUTRAL", "border-glow-neutral"),
            EmotionCategory::Fear => ("#a78bfa", "⚡", "FEAR", "border-glow-fear"),
            EmotionCategory::Disgust => ("#10b981", "🌿", "DISGUST", "border-glow-disgust"),
            EmotionCategory::Surprise => ("#ec4899", "✦", "SURPRISE", "border-glow-surprise"),
        };
        EmotionDescriptor {
            emotion,
            color,
            icon,
            label,
            style_class,
        }
    }

    /// Descriptor for an emotion name that has not been typed yet.
    pub fn lookup(raw: &str) -> Result<EmotionDescriptor, DomainError> {
        raw.parse::<EmotionCategory>().map(Self::describe)
    }

    pub fn legend() -> Vec<EmotionDescriptor> {
        EmotionCategory::ALL.into_iter().map(Self::describe).collect()
    }
}

/// `confidence × 100` with one decimal, e.g. `87.0%`.
pub fn format_confidence(confidence: Confidence) -> String {
    format!("{:.1}%", confidence.value() * 100.0)
}

/// Whole-percent form used by the confidence gauge.
pub fn format_confidence_gauge(confidence: Confidence) -> String {
    format!("{:.0}%", confidence.value() * 100.0)
}

#[derive(Debug, Clone)]
pub struct AudioResourceResolver {
    base_address: String,
}

impl AudioResourceResolver {
    pub fn new(base_address: impl Into<String>) -> Self {
        Self {
            base_address: base_address.into(),
        }
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    pub fn resolve(&self, result: &AnalysisResult) -> AudioResource {
        self.resolve_at(result, Utc::now())
    }

    pub fn resolve_at(&self, result: &AnalysisResult, now: DateTime<Utc>) -> AudioResource {
        AudioResource {
            url: format!("{}{}", self.base_address, result.audio_path),
            suggested_filename: format!(
                "emotion_{}_{}.mp3",
                result.emotion,
                now.format(EXPORT_TIMESTAMP_FORMAT)
            ),
        }
    }
}
