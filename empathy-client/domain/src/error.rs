use thiserror::Error;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter narrative text for analysis";

/// Failures an interaction can end in. The `Display` output is what the operator sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Backend connection failed. Verify service is running at {base_url}")]
    Transport { base_url: String, reason: String },

    #[error("{message}")]
    ServiceRejected { message: String },

    #[error("Malformed analysis response: {message}")]
    Schema { message: String },

    #[error("No presentation descriptor for emotion `{value}`")]
    Lookup { value: String },
}

impl DomainError {
    pub fn empty_text() -> Self {
        Self::Validation {
            message: EMPTY_TEXT_MESSAGE.to_string(),
        }
    }

    pub fn transport(base_url: &str, reason: &str) -> Self {
        Self::Transport {
            base_url: base_url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn service_rejected(message: &str) -> Self {
        Self::ServiceRejected {
            message: message.to_string(),
        }
    }

    pub fn schema(message: &str) -> Self {
        Self::Schema {
            message: message.to_string(),
        }
    }

    pub fn lookup(value: &str) -> Self {
        Self::Lookup {
            value: value.to_string(),
        }
    }

    /// Stable tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Transport { .. } => "transport",
            Self::ServiceRejected { .. } => "service",
            Self::Schema { .. } => "schema",
            Self::Lookup { .. } => "lookup",
        }
    }

    /// Schema and lookup failures mean client and service disagree on the contract.
    pub fn is_contract_mismatch(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::Lookup { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_names_base_address() {
        let error = DomainError::transport("http://localhost:5000", "connection refused");
        assert_eq!(
            error.to_string(),
            "Backend connection failed. Verify service is running at http://localhost:5000"
        );
        assert_eq!(error.kind(), "transport");
    }

    #[test]
    fn service_message_is_verbatim() {
        let error = DomainError::service_rejected("Text field cannot be empty");
        assert_eq!(error.to_string(), "Text field cannot be empty");
        assert!(!error.is_contract_mismatch());
    }

    #[test]
    fn schema_and_lookup_are_contract_mismatches() {
        assert!(DomainError::schema("bad").is_contract_mismatch());
        assert!(DomainError::lookup("curiosity").is_contract_mismatch());
        assert_eq!(DomainError::empty_text().to_string(), EMPTY_TEXT_MESSAGE);
    }
}
