use async_trait::async_trait;

use crate::{AnalysisRequest, DomainError, RawAnalysis};

/// Remote emotion classification and speech synthesis.
#[async_trait]
pub trait AnalysisServicePort: Send + Sync {
    /// Base address every service-relative locator is resolved against.
    fn base_url(&self) -> &str;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, DomainError>;
}

/// Retrieves synthesized audio bytes for export.
#[async_trait]
pub trait AudioSourcePort: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DomainError>;
}
