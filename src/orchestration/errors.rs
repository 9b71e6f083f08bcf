//! # Orchestration Error Types
//!
//! Structured error handling for the dispatch pipeline using thiserror,
//! plus the business error-code taxonomy the fallback flows branch on.
//!
//! Expected business outcomes (no fares found, no combinable fares) travel
//! as classified [`ErrorCode`]s so the flows can branch on them directly;
//! only truly unexpected failures stay opaque.

use thiserror::Error;
use uuid::Uuid;

use crate::constants::DiagnosticNumber;

/// Machine-readable business error codes raised by services and classified
/// by the orchestration flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No fare found for the booked class of service.
    NoFareForClassUsed,
    /// No corporate negotiated fares exist for the account.
    NoCorporateNegFaresExist,
    /// No published fares cover the itinerary.
    NoFaresFound,
    /// No combinable fares for the requested class (WPA).
    NoCombinableFaresForClass,
    /// Pricing could not match a fare during reissue processing.
    UnableToMatchFare,
    /// Reissue rule matching failed for every fare component.
    UnableToMatchReissueRules,
    /// The requested diagnostic cannot be produced by any service subset.
    NoDiagnosticToDisplay,
    /// The transaction-wide abort flag or deadline tripped.
    TransactionAborted,
    /// A configured service name could not be resolved.
    ServiceResolutionFailure,
    /// Unclassified failure.
    UnknownException,
}

impl ErrorCode {
    /// Codes that permit the WP no-match retry as an alternate-pricing
    /// transaction.
    pub fn is_no_fares_class(&self) -> bool {
        matches!(
            self,
            ErrorCode::NoFareForClassUsed
                | ErrorCode::NoCorporateNegFaresExist
                | ErrorCode::NoFaresFound
        )
    }

    /// Codes that permit the WPA no-match reprocess pass.
    pub fn is_no_combinable_fares_class(&self) -> bool {
        matches!(self, ErrorCode::NoCombinableFaresForClass)
    }

    /// Codes that redirect a reissue transaction into exchange processing
    /// when a secondary request exists.
    pub fn triggers_redirect(&self) -> bool {
        matches!(
            self,
            ErrorCode::UnableToMatchFare | ErrorCode::UnableToMatchReissueRules
        )
    }
}

/// Errors raised by the orchestration pipeline.
#[derive(Error, Debug, Clone)]
pub enum OrchestrationError {
    #[error("business rule failure [{code:?}]: {message}")]
    BusinessRule { code: ErrorCode, message: String },

    #[error("no diagnostic to display for diagnostic {diagnostic}")]
    NoDiagnosticToDisplay { diagnostic: DiagnosticNumber },

    #[error("service '{service}' could not be resolved")]
    ServiceResolution { service: String },

    #[error("transaction {trx_id} aborted: {reason}")]
    TransactionAborted { trx_id: Uuid, reason: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("background task failure: {message}")]
    TaskJoin { message: String },
}

impl OrchestrationError {
    /// Create a business rule error
    pub fn business_rule(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::BusinessRule {
            code,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The business code carried by this error, for classification.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            OrchestrationError::BusinessRule { code, .. } => *code,
            OrchestrationError::NoDiagnosticToDisplay { .. } => ErrorCode::NoDiagnosticToDisplay,
            OrchestrationError::ServiceResolution { .. } => ErrorCode::ServiceResolutionFailure,
            OrchestrationError::TransactionAborted { .. } => ErrorCode::TransactionAborted,
            OrchestrationError::Configuration { .. } | OrchestrationError::TaskJoin { .. } => {
                ErrorCode::UnknownException
            }
        }
    }

    /// Human-readable message without the code prefix.
    pub fn message(&self) -> String {
        match self {
            OrchestrationError::BusinessRule { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type OrchestrationResult<T> = std::result::Result<T, OrchestrationError>;
