//! # Exchange/Reissue Transaction Kinds
//!
//! The voluntary reissue/exchange (REX) transaction family and the
//! cancel-and-start-over (CSO) state merged back into it after the
//! background pricing attempt joins.

use crate::constants::{action_codes, diag_params, itin_type_values};
use crate::orchestration::errors::ErrorCode;

use super::context::TrxContext;
use super::itinerary::{FarePath, Itinerary};

/// Processing phase of a reissue transaction. The phase drives which
/// itinerary data the downstream pricing and fare-selection services operate
/// on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RexPhase {
    /// Not yet entered the reissue pipeline.
    Idle,
    /// Repricing the existing (exchange) itinerary.
    RepriceExcItin,
    /// Matching the priced exchange itinerary against reissue rules.
    MatchExcRule,
    /// Pricing the new itinerary.
    PriceNewItin,
}

/// Diagnostic qualifier derived from the `ITIN_TYPE` diagnostic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagQualifier {
    /// No diagnostic scoping; run the full reissue main process.
    None,
    /// Diagnostics about the exchange itinerary only.
    ItExc,
    /// Diagnostics covering both itinerary phases.
    ItAll,
    /// Diagnostics about the new itinerary.
    ItNew,
    /// Cancel-and-start-over diagnostic.
    ItUfl,
    /// Fast-track redirect diagnostic.
    ItEft,
}

/// Secondary (redirect) request attached to an exchange transaction.
#[derive(Debug, Clone)]
pub struct SecondaryRequest {
    pub action_code: String,
}

impl SecondaryRequest {
    pub fn new(action_code: impl Into<String>) -> Self {
        Self {
            action_code: action_code.into(),
        }
    }

    /// Whether this secondary request routes into port-exchange processing.
    pub fn is_exchange_redirect(&self) -> bool {
        self.action_code == action_codes::EXCHANGE_WITH_REDIRECT
    }

    /// Whether this secondary request still allows the CSO attempt.
    pub fn permits_cso(&self) -> bool {
        matches!(
            self.action_code.as_str(),
            action_codes::EXCHANGE_WITH_REDIRECT | action_codes::MIP_EXCHANGE_AMEND
        )
    }
}

/// Terminal/pending state of the cancel-and-start-over attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsoStatus {
    /// No CSO attempt was applicable for this transaction.
    NotApplicable,
    /// The background task is running; fields must not be read yet.
    Pending,
    Succeeded,
    Failed,
}

impl CsoStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CsoStatus::Pending)
    }
}

/// CSO results merged into the primary transaction after the join.
#[derive(Debug, Clone)]
pub struct CsoState {
    pub status: CsoStatus,
    pub lowest_fare_path: Option<FarePath>,
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
}

impl Default for CsoState {
    fn default() -> Self {
        Self {
            status: CsoStatus::NotApplicable,
            lowest_fare_path: None,
            error_code: None,
            error_message: None,
        }
    }
}

impl CsoState {
    pub fn successful(&self) -> bool {
        self.status == CsoStatus::Succeeded
    }
}

/// Voluntary reissue/exchange pricing transaction. The exchange itinerary
/// lives in `context.itin`; the new itinerary is swapped in when the phase
/// advances to [`RexPhase::PriceNewItin`].
#[derive(Debug, Clone)]
pub struct RexPricingTrx {
    pub context: TrxContext,
    pub new_itin: Itinerary,
    pub phase: RexPhase,
    pub secondary_request: Option<SecondaryRequest>,
    /// The repriced, rebooked solution passed validation; a recorded reissue
    /// error is not rethrown when set.
    pub rebooked_solution_valid: bool,
    /// Business error recorded during the new-itinerary phase, rethrown at
    /// the end of the flow unless the rebooked solution validated.
    pub reissue_error: Option<(ErrorCode, String)>,
    pub cso: CsoState,
}

impl RexPricingTrx {
    pub fn new(context: TrxContext, new_itin: Itinerary) -> Self {
        Self {
            context,
            new_itin,
            phase: RexPhase::Idle,
            secondary_request: None,
            rebooked_solution_valid: false,
            reissue_error: None,
            cso: CsoState::default(),
        }
    }

    /// Classify the requested diagnostic scope from the `ITIN_TYPE`
    /// parameter. A diagnostic without a recognised scope defaults to the
    /// new-itinerary scope, matching the wire behavior.
    pub fn diag_qualifier(&self) -> DiagQualifier {
        if self.context.diagnostic.is_none() {
            return DiagQualifier::None;
        }
        match self.context.diagnostic.param(diag_params::ITIN_TYPE) {
            Some(itin_type_values::EXCHANGE) => DiagQualifier::ItExc,
            Some(itin_type_values::ALL) => DiagQualifier::ItAll,
            Some(itin_type_values::UFL) => DiagQualifier::ItUfl,
            Some(itin_type_values::REDIRECT) => DiagQualifier::ItEft,
            Some(_) | None => DiagQualifier::ItNew,
        }
    }

    pub fn record_reissue_error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.reissue_error = Some((code, message.into()));
    }

    pub fn take_reissue_error(&mut self) -> Option<(ErrorCode, String)> {
        self.reissue_error.take()
    }
}

/// Exchange pricing transaction used for the redirect sub-flow.
#[derive(Debug, Clone)]
pub struct ExchangePricingTrx {
    pub context: TrxContext,
    /// This transaction was produced by a REX redirect rather than arriving
    /// directly from the transform layer.
    pub redirected_from_rex: bool,
}

impl ExchangePricingTrx {
    pub fn new(context: TrxContext) -> Self {
        Self {
            context,
            redirected_from_rex: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Diagnostic;

    fn rex_with_itin_type(value: Option<&str>) -> RexPricingTrx {
        let mut diag = Diagnostic::new(233);
        if let Some(value) = value {
            diag = diag.with_param(diag_params::ITIN_TYPE, value);
        }
        let context = TrxContext::new(Itinerary::default()).with_diagnostic(diag);
        RexPricingTrx::new(context, Itinerary::default())
    }

    #[test]
    fn qualifier_maps_known_itin_types() {
        assert_eq!(
            rex_with_itin_type(Some("EXC")).diag_qualifier(),
            DiagQualifier::ItExc
        );
        assert_eq!(
            rex_with_itin_type(Some("ALL")).diag_qualifier(),
            DiagQualifier::ItAll
        );
        assert_eq!(
            rex_with_itin_type(Some("UFL")).diag_qualifier(),
            DiagQualifier::ItUfl
        );
        assert_eq!(
            rex_with_itin_type(Some("RED")).diag_qualifier(),
            DiagQualifier::ItEft
        );
    }

    #[test]
    fn qualifier_defaults_to_new_itin_for_unknown_or_absent_values() {
        assert_eq!(
            rex_with_itin_type(Some("XYZ")).diag_qualifier(),
            DiagQualifier::ItNew
        );
        assert_eq!(rex_with_itin_type(None).diag_qualifier(), DiagQualifier::ItNew);
    }

    #[test]
    fn qualifier_is_none_without_diagnostic() {
        let context = TrxContext::new(Itinerary::default());
        let trx = RexPricingTrx::new(context, Itinerary::default());
        assert_eq!(trx.diag_qualifier(), DiagQualifier::None);
    }

    #[test]
    fn cso_pending_is_not_terminal() {
        assert!(!CsoStatus::Pending.is_terminal());
        assert!(CsoStatus::NotApplicable.is_terminal());
        assert!(CsoStatus::Succeeded.is_terminal());
        assert!(CsoStatus::Failed.is_terminal());
    }
}
