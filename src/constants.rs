//! # System Constants
//!
//! Diagnostic numbers, diagnostic ranges, parameter keys and action codes
//! that define the operational boundaries of the ATSE orchestration core.
//!
//! The numeric layout mirrors the reservation-system diagnostic space: fare
//! diagnostics in the 200s-500s, pricing in the 600s, taxes and fare calc in
//! the 800s, shopping in the 900s. Ranges are half-open (`lower..upper`) and
//! may overlap; the resolver consults them in a fixed priority order, so the
//! layout here is load-bearing and must not be reordered casually.

/// Numeric diagnostic type carried by a transaction.
pub type DiagnosticNumber = u16;

/// Well-known diagnostic numbers with idiosyncratic service needs.
pub mod diagnostics {
    use super::DiagnosticNumber;

    /// No diagnostic requested.
    pub const DIAG_NONE: DiagnosticNumber = 0;

    /// Booking-code-by-cabin (RBD) analysis diagnostic.
    pub const DIAG_RBD_BY_CABIN: DiagnosticNumber = 187;

    /// Itinerary analysis overview diagnostic.
    pub const DIAG_ITIN_OVERVIEW: DiagnosticNumber = 194;

    /// Orchestrator metrics diagnostic (per-service latency, active threads).
    pub const DIAG_ORCHESTRATOR_METRICS: DiagnosticNumber = 199;

    /// Service-selection override diagnostic, honours the `ORC` parameter.
    pub const DIAG_SERVICE_OVERRIDE: DiagnosticNumber = 975;

    /// Run every configured service, tolerating individual failures.
    pub const DIAG_ALL_SERVICES: DiagnosticNumber = 999;

    /// Legacy diagnostic numbers still accepted on the wire, remapped to
    /// their modern equivalents before range lookup.
    pub const LEGACY_REMAP: &[(DiagnosticNumber, DiagnosticNumber)] = &[
        (8, 854),
        (10, 855),
        (11, 856),
        (12, 857),
        (74, 874),
    ];

    /// Shopping diagnostics that must run their itinerary-analysis pre-pass
    /// with the diagnostic collector deactivated, so the collector only sees
    /// output from the shopping phase itself.
    pub const SHOPPING_QUIET_PREPASS: &[DiagnosticNumber] = &[910, 912, 914, 930, 959, 985];
}

/// Half-open diagnostic number ranges. Each range maps to the minimal
/// service subset sufficient to produce diagnostics in that range.
pub mod diag_ranges {
    use super::DiagnosticNumber;

    pub const FARES_DIAG_RANGE_BEGIN: DiagnosticNumber = 200;
    pub const FARES_DIAG_RANGE_END: DiagnosticNumber = 600;

    pub const RULES_DIAG_RANGE_BEGIN: DiagnosticNumber = 300;
    pub const RULES_DIAG_RANGE_END: DiagnosticNumber = 400;

    pub const BOOKING_CODE_DIAG_RANGE_BEGIN: DiagnosticNumber = 400;
    pub const BOOKING_CODE_DIAG_RANGE_END: DiagnosticNumber = 450;

    pub const ROUTING_DIAG_RANGE_BEGIN: DiagnosticNumber = 450;
    pub const ROUTING_DIAG_RANGE_END: DiagnosticNumber = 500;

    pub const PRICING_DIAG_RANGE_BEGIN: DiagnosticNumber = 600;
    pub const PRICING_DIAG_RANGE_END: DiagnosticNumber = 700;

    pub const MILEAGE_DIAG_RANGE_BEGIN: DiagnosticNumber = 700;
    pub const MILEAGE_DIAG_RANGE_END: DiagnosticNumber = 750;

    pub const SERVICE_FEES_DIAG_RANGE_BEGIN: DiagnosticNumber = 750;
    pub const SERVICE_FEES_DIAG_RANGE_END: DiagnosticNumber = 780;

    pub const BAGGAGE_DIAG_RANGE_BEGIN: DiagnosticNumber = 780;
    pub const BAGGAGE_DIAG_RANGE_END: DiagnosticNumber = 800;

    pub const TAXES_DIAG_RANGE_BEGIN: DiagnosticNumber = 800;
    pub const TAXES_DIAG_RANGE_END: DiagnosticNumber = 850;

    pub const FARE_CALC_DIAG_RANGE_BEGIN: DiagnosticNumber = 850;
    pub const FARE_CALC_DIAG_RANGE_END: DiagnosticNumber = 870;

    pub const CURRENCY_DIAG_RANGE_BEGIN: DiagnosticNumber = 870;
    pub const CURRENCY_DIAG_RANGE_END: DiagnosticNumber = 880;

    pub const INTERNAL_DIAG_RANGE_BEGIN: DiagnosticNumber = 880;
    pub const INTERNAL_DIAG_RANGE_END: DiagnosticNumber = 900;

    pub const SHOPPING_DIAG_RANGE_BEGIN: DiagnosticNumber = 900;
    pub const SHOPPING_DIAG_RANGE_END: DiagnosticNumber = 1000;

    pub const ALT_PRICING_DIAG_RANGE_BEGIN: DiagnosticNumber = 970;
    pub const ALT_PRICING_DIAG_RANGE_END: DiagnosticNumber = 990;

    /// Offset subtracted from an alternate-pricing diagnostic to obtain the
    /// pricing-range diagnostic it maps to on a reprocess pass.
    pub const ALT_PRICING_DIAG_OFFSET: DiagnosticNumber = 370;
}

/// Named diagnostic parameters consumed by the orchestrator.
pub mod diag_params {
    /// Exchange diagnostic scope: `EXC`, `ALL`, `UFL`, `RED`; default new-itin.
    pub const ITIN_TYPE: &str = "ITIN_TYPE";

    /// Requests the exchange-itinerary solution display on UFL diagnostics.
    pub const DISPLAY_SOLUTION: &str = "DISPLAY_SOLUTION";

    /// Explicit service-bit override for the override diagnostic:
    /// `IAO`, `FCO`, `FVO`, `PO`, `TAX`.
    pub const ORC: &str = "ORC";

    /// Extends the RBD-by-cabin diagnostic through pricing.
    pub const RBD_ALL: &str = "RBD_ALL";

    /// Enables dispatch-path trace logging in the diagnostic output.
    pub const TO_ROUTING: &str = "TO_ROUTING";

    /// Overrides the maximum number of no-PNR pricing options.
    pub const MAX_OPTIONS: &str = "MAX_OPTIONS";
}

/// `ITIN_TYPE` parameter values for exchange diagnostics.
pub mod itin_type_values {
    pub const EXCHANGE: &str = "EXC";
    pub const ALL: &str = "ALL";
    pub const UFL: &str = "UFL";
    pub const REDIRECT: &str = "RED";
}

/// Secondary-request action codes recognised by the exchange flows.
pub mod action_codes {
    /// Exchange amend that must redirect into port-exchange processing.
    pub const EXCHANGE_WITH_REDIRECT: &str = "WFR";

    /// Multi-itinerary exchange amend with redirect.
    pub const MIP_EXCHANGE_AMEND: &str = "WFRF";
}

/// System-wide constants.
pub mod system {
    /// Version compatibility marker.
    pub const ATSE_CORE_VERSION: &str = "0.1.0";

    /// Marker line printed between the exchange-itinerary and new-itinerary
    /// diagnostic phases.
    pub const NEW_ITIN_DIAG_MARKER: &str = "BEGIN NEW ITIN DIAGNOSTIC";

    /// At most this many governing carriers participate in a split
    /// itinerary; segments for additional carriers are dropped.
    pub const MAX_SNAP_CARRIERS: usize = 2;
}
