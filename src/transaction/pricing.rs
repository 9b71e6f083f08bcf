//! # Pricing Transaction Kinds
//!
//! The pricing request family: generic pricing (including MIP and
//! structured-fare-rule variants), alternate pricing (WPA), no-PNR pricing,
//! and the small direct-dispatch kinds (mileage, fare display, tax).

use super::context::TrxContext;

/// Request flags on a generic pricing transaction that influence service
/// selection.
#[derive(Debug, Clone, Default)]
pub struct PricingOptions {
    /// Multi-itinerary pricing request.
    pub mip: bool,
    /// The request explicitly asked for MIP baggage processing.
    pub mip_baggage_requested: bool,
    /// Structured-fare-rules request; gets a reduced default service set.
    pub structured_fare_rules: bool,
    /// Price-by-brand request; forces the branding service into the mask.
    pub pbb: bool,
    /// Low-fare (bargain-finder) data requested.
    pub low_fare_requested: bool,
    /// A specific fare basis was requested.
    pub requested_fare_basis: bool,
    /// Split-itinerary pricing by governing carrier.
    pub snap_request: bool,
}

/// Generic pricing transaction (WP and MIP families).
#[derive(Debug, Clone)]
pub struct PricingTrx {
    pub context: TrxContext,
    pub options: PricingOptions,
}

impl PricingTrx {
    pub fn new(context: TrxContext) -> Self {
        Self {
            context,
            options: PricingOptions::default(),
        }
    }

    pub fn with_options(context: TrxContext, options: PricingOptions) -> Self {
        Self { context, options }
    }

    /// Baggage policy: the free-bag service is skipped for structured-fare
    /// rule requests, and for MIP unless MIP baggage processing was
    /// explicitly requested.
    pub fn free_bag_service_needed(&self) -> bool {
        if self.options.structured_fare_rules {
            return false;
        }
        if self.options.mip {
            return self.options.mip_baggage_requested;
        }
        true
    }
}

/// Alternate pricing (WPA) transaction: combinable-fares pricing with a
/// no-match reprocess fallback.
#[derive(Debug, Clone)]
pub struct AltPricingTrx {
    pub context: TrxContext,
    /// Explicit no-match (XM) request; suppresses the reprocess fallback.
    pub xm_request: bool,
    /// This transaction was produced by a WP no-match retry.
    pub wp_no_match: bool,
    /// Set once the no-match reprocess pass has run.
    pub reprocessed: bool,
}

impl AltPricingTrx {
    pub fn new(context: TrxContext) -> Self {
        Self {
            context,
            xm_request: false,
            wp_no_match: false,
            reprocessed: false,
        }
    }
}

/// No-PNR pricing transaction (WQ family).
#[derive(Debug, Clone)]
pub struct NoPnrPricingTrx {
    pub context: TrxContext,
    /// Full fare-basis-code itinerary mode; suppresses the no-match
    /// reprocess.
    pub full_fbc_itin: bool,
    /// Maximum number of pricing options, overridable via diagnostic
    /// parameter.
    pub max_options: Option<u32>,
    /// Set once the no-match reprocess pass has run.
    pub reprocessed: bool,
}

impl NoPnrPricingTrx {
    pub fn new(context: TrxContext) -> Self {
        Self {
            context,
            full_fbc_itin: false,
            max_options: None,
            reprocessed: false,
        }
    }
}

/// Mileage validation transaction.
#[derive(Debug, Clone)]
pub struct MileageTrx {
    pub context: TrxContext,
}

impl MileageTrx {
    pub fn new(context: TrxContext) -> Self {
        Self { context }
    }
}

/// Fare display transaction; optionally a ticketing-carrier display request.
#[derive(Debug, Clone)]
pub struct FareDisplayTrx {
    pub context: TrxContext,
    pub ticketing_cxr_display: bool,
}

impl FareDisplayTrx {
    pub fn new(context: TrxContext) -> Self {
        Self {
            context,
            ticketing_cxr_display: false,
        }
    }
}

/// Variants of the tax transaction surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxRequestKind {
    /// Standard tax calculation.
    Standard,
    /// Tax breakdown display.
    Display,
    /// Passenger facility charge display.
    PfcDisplay,
    /// Tax rule information request.
    Info,
}

/// Tax calculation/display transaction.
#[derive(Debug, Clone)]
pub struct TaxTrx {
    pub context: TrxContext,
    pub request: TaxRequestKind,
}

impl TaxTrx {
    pub fn new(context: TrxContext, request: TaxRequestKind) -> Self {
        Self { context, request }
    }
}
