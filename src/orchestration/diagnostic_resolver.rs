//! # Diagnostic-to-ServiceBits Resolver
//!
//! Pure function mapping a requested diagnostic number and transaction
//! context flags to the minimal service bitmask sufficient to produce that
//! diagnostic's output.
//!
//! Explicit exception cases are consulted first, then the priority-ordered
//! range table: the first matching range wins, and ranges may overlap, so
//! reordering the table is a functional change. An unmatched diagnostic is
//! an input-validation failure (`NoDiagnosticToDisplay`), never a silent
//! no-op.

use tracing::debug;

use crate::constants::diag_params::{ORC, RBD_ALL};
use crate::constants::diag_ranges::*;
use crate::constants::diagnostics::{
    DIAG_ALL_SERVICES, DIAG_ITIN_OVERVIEW, DIAG_NONE, DIAG_ORCHESTRATOR_METRICS,
    DIAG_RBD_BY_CABIN, DIAG_SERVICE_OVERRIDE, SHOPPING_QUIET_PREPASS,
};
use crate::constants::DiagnosticNumber;
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};
use crate::orchestration::service_bits::ServiceBits;
use crate::transaction::diagnostic::{fix_legacy_diagnostic, Diagnostic};

/// Context flags that influence resolution beyond the diagnostic number.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverFlags {
    /// Price-by-brand request; forces the branding service bit.
    pub pbb_request: bool,
    /// Booking-code-by-cabin feature activation.
    pub rbd_by_cabin_active: bool,
}

/// One diagnostic range record: half-open bounds and the service subset
/// sufficient for diagnostics in the range.
#[derive(Debug, Clone, Copy)]
struct DiagRange {
    lower: DiagnosticNumber,
    upper: DiagnosticNumber,
    bits: ServiceBits,
}

impl DiagRange {
    const fn new(lower: DiagnosticNumber, upper: DiagnosticNumber, bits: ServiceBits) -> Self {
        Self { lower, upper, bits }
    }

    fn contains(&self, number: DiagnosticNumber) -> bool {
        number >= self.lower && number < self.upper
    }
}

const FARES_PIPELINE: ServiceBits = ServiceBits::ITIN_ANALYZER.union(ServiceBits::FARE_COLLECTOR);
const VALIDATION_PIPELINE: ServiceBits = FARES_PIPELINE.union(ServiceBits::FARE_VALIDATOR);
const PRICING_PIPELINE: ServiceBits = VALIDATION_PIPELINE.union(ServiceBits::PRICING);
const TAXES_PIPELINE: ServiceBits = PRICING_PIPELINE.union(ServiceBits::TAXES);

/// Priority-ordered range table. The narrow rules/booking-code/routing
/// ranges sit inside the broad fares range and therefore must be checked
/// before it; alternate-pricing sits inside shopping likewise.
const RANGE_TABLE: &[DiagRange] = &[
    DiagRange::new(
        ROUTING_DIAG_RANGE_BEGIN,
        ROUTING_DIAG_RANGE_END,
        VALIDATION_PIPELINE,
    ),
    DiagRange::new(
        BOOKING_CODE_DIAG_RANGE_BEGIN,
        BOOKING_CODE_DIAG_RANGE_END,
        VALIDATION_PIPELINE,
    ),
    DiagRange::new(
        RULES_DIAG_RANGE_BEGIN,
        RULES_DIAG_RANGE_END,
        VALIDATION_PIPELINE,
    ),
    DiagRange::new(FARES_DIAG_RANGE_BEGIN, FARES_DIAG_RANGE_END, FARES_PIPELINE),
    DiagRange::new(
        PRICING_DIAG_RANGE_BEGIN,
        PRICING_DIAG_RANGE_END,
        PRICING_PIPELINE,
    ),
    DiagRange::new(
        MILEAGE_DIAG_RANGE_BEGIN,
        MILEAGE_DIAG_RANGE_END,
        ServiceBits::ITIN_ANALYZER.union(ServiceBits::MILEAGE),
    ),
    DiagRange::new(
        SERVICE_FEES_DIAG_RANGE_BEGIN,
        SERVICE_FEES_DIAG_RANGE_END,
        PRICING_PIPELINE.union(ServiceBits::SERVICE_FEES),
    ),
    DiagRange::new(
        BAGGAGE_DIAG_RANGE_BEGIN,
        BAGGAGE_DIAG_RANGE_END,
        PRICING_PIPELINE.union(ServiceBits::FREE_BAG),
    ),
    DiagRange::new(TAXES_DIAG_RANGE_BEGIN, TAXES_DIAG_RANGE_END, TAXES_PIPELINE),
    DiagRange::new(
        FARE_CALC_DIAG_RANGE_BEGIN,
        FARE_CALC_DIAG_RANGE_END,
        TAXES_PIPELINE.union(ServiceBits::FARE_CALC),
    ),
    DiagRange::new(
        CURRENCY_DIAG_RANGE_BEGIN,
        CURRENCY_DIAG_RANGE_END,
        ServiceBits::ITIN_ANALYZER.union(ServiceBits::CURRENCY),
    ),
    DiagRange::new(
        INTERNAL_DIAG_RANGE_BEGIN,
        INTERNAL_DIAG_RANGE_END,
        ServiceBits::ITIN_ANALYZER.union(ServiceBits::INTERNAL),
    ),
    DiagRange::new(
        ALT_PRICING_DIAG_RANGE_BEGIN,
        ALT_PRICING_DIAG_RANGE_END,
        PRICING_PIPELINE,
    ),
    DiagRange::new(
        SHOPPING_DIAG_RANGE_BEGIN,
        SHOPPING_DIAG_RANGE_END,
        ServiceBits::ITIN_ANALYZER.union(ServiceBits::SHOPPING),
    ),
];

/// Resolve the service bitmask for a transaction's diagnostic settings.
///
/// `default_bits` is the transaction-kind default used when no diagnostic is
/// requested and as the starting mask for the override diagnostics.
pub fn resolve_service_bits(
    diagnostic: &Diagnostic,
    flags: ResolverFlags,
    default_bits: ServiceBits,
) -> OrchestrationResult<ServiceBits> {
    let number = fix_legacy_diagnostic(diagnostic.diagnostic_type());

    let mut bits = if number == DIAG_NONE {
        default_bits
    } else if let Some(exception) = exception_bits(number, diagnostic, flags, default_bits) {
        exception
    } else if let Some(range) = RANGE_TABLE.iter().find(|range| range.contains(number)) {
        range.bits
    } else {
        return Err(OrchestrationError::NoDiagnosticToDisplay { diagnostic: number });
    };

    // A price-by-brand request needs the branding service no matter which
    // diagnostic branch matched.
    if flags.pbb_request {
        bits |= ServiceBits::S8_BRAND;
    }

    Ok(bits)
}

/// Explicit special cases with idiosyncratic service needs, evaluated before
/// any range membership test.
fn exception_bits(
    number: DiagnosticNumber,
    diagnostic: &Diagnostic,
    flags: ResolverFlags,
    default_bits: ServiceBits,
) -> Option<ServiceBits> {
    match number {
        DIAG_RBD_BY_CABIN if flags.rbd_by_cabin_active => {
            let mut bits = VALIDATION_PIPELINE;
            if diagnostic.param_is(RBD_ALL, "T") {
                bits |= ServiceBits::PRICING;
            }
            Some(bits)
        }
        DIAG_ITIN_OVERVIEW => Some(ServiceBits::ITIN_ANALYZER),
        DIAG_ORCHESTRATOR_METRICS => Some(default_bits | ServiceBits::CONTINUE_ON_FAILURE),
        DIAG_SERVICE_OVERRIDE => Some(apply_orc_override(diagnostic, default_bits)),
        DIAG_ALL_SERVICES => Some(ServiceBits::ALL_SERVICES | ServiceBits::CONTINUE_ON_FAILURE),
        _ => None,
    }
}

/// Service-bit override for the override diagnostic. An unrecognised `ORC`
/// value leaves the mask unmodified.
fn apply_orc_override(diagnostic: &Diagnostic, default_bits: ServiceBits) -> ServiceBits {
    match diagnostic.param(ORC) {
        Some("IAO") => ServiceBits::ITIN_ANALYZER,
        Some("FCO") => FARES_PIPELINE,
        Some("FVO") => VALIDATION_PIPELINE,
        Some("PO") => PRICING_PIPELINE,
        Some("TAX") => TAXES_PIPELINE,
        Some(other) => {
            debug!(orc = other, "Unrecognised ORC override value, mask left unmodified");
            default_bits
        }
        None => default_bits,
    }
}

/// Dedicated shopping diagnostic table. Returns the bitmask and whether the
/// itinerary-analysis pre-pass must run with the diagnostic collector
/// deactivated. Shopping diagnostics not in this table fall back to the
/// generic resolver.
pub fn shopping_bits(number: DiagnosticNumber) -> Option<(ServiceBits, bool)> {
    let quiet = SHOPPING_QUIET_PREPASS.contains(&number);
    match number {
        DIAG_NONE | 902 | 906 => Some((
            ServiceBits::ITIN_ANALYZER | ServiceBits::SHOPPING,
            false,
        )),
        904 => Some((ServiceBits::ITIN_ANALYZER | ServiceBits::SHOPPING, false)),
        910 | 912 | 914 | 930 | 959 | 985 => Some((
            ServiceBits::ITIN_ANALYZER | ServiceBits::SHOPPING,
            quiet,
        )),
        _ => None,
    }
}
