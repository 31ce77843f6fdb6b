use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Joy,
    Sadness,
    Anger,
    Neutral,
    Fear,
    Disgust,
    Surprise,
}

impl EmotionCategory {
    pub const ALL: [EmotionCategory; 7] = [
        EmotionCategory::Joy,
        EmotionCategory::Sadness,
        EmotionCategory::Anger,
        EmotionCategory::Neutral,
        EmotionCategory::Fear,
        EmotionCategory::Disgust,
        EmotionCategory::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Joy => "joy",
            EmotionCategory::Sadness => "sadness",
            EmotionCategory::Anger => "anger",
            EmotionCategory::Neutral => "neutral",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Disgust => "disgust",
            EmotionCategory::Surprise => "surprise",
        }
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EmotionCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| DomainError::lookup(value))
    }
}

/// Classifier certainty, guaranteed finite and within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(DomainError::schema(&format!(
                "confidence {value} is outside [0, 1]"
            )));
        }
        // `-0.0` would otherwise render as `-0.0%`.
        Ok(Self(value + 0.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    text: String,
}

impl AnalysisRequest {
    /// Trims the raw input; whitespace-only text is a validation failure.
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(DomainError::empty_text());
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Success body exactly as the service sent it, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAnalysis {
    pub emotion: Option<String>,
    pub confidence: Option<f64>,
    pub text: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub emotion: EmotionCategory,
    pub confidence: Confidence,
    pub text: String,
    pub audio_path: String,
}

impl TryFrom<RawAnalysis> for AnalysisResult {
    type Error = DomainError;

    fn try_from(raw: RawAnalysis) -> Result<Self, Self::Error> {
        let emotion = raw.emotion.ok_or_else(|| missing_field("emotion"))?;
        let emotion = emotion
            .parse::<EmotionCategory>()
            .map_err(|_| DomainError::schema(&format!("unknown emotion `{emotion}`")))?;
        let confidence = Confidence::new(raw.confidence.ok_or_else(|| missing_field("confidence"))?)?;
        let text = raw.text.ok_or_else(|| missing_field("text"))?;
        let audio_path = raw.audio_url.ok_or_else(|| missing_field("audio_url"))?;
        if audio_path.trim().is_empty() {
            return Err(DomainError::schema("audio_url is empty"));
        }

        Ok(Self {
            emotion,
            confidence,
            text,
            audio_path,
        })
    }
}

fn missing_field(name: &str) -> DomainError {
    DomainError::schema(&format!("missing field `{name}`"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionDescriptor {
    pub emotion: EmotionCategory,
    pub color: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub style_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioResource {
    pub url: String,
    pub suggested_filename: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(AnalysisResult),
    Failed(String),
}

impl InteractionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, InteractionState::Submitting)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            InteractionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            InteractionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Submitting => "submitting",
            InteractionState::Succeeded(_) => "succeeded",
            InteractionState::Failed(_) => "failed",
        }
    }
}
