//! # Transaction Model
//!
//! The mutable context objects that flow through the orchestration pipeline.
//!
//! A transaction is created by the transform/parse layer before orchestration
//! and destroyed after response formatting; the orchestrator only ever
//! borrows it. Every request kind embeds a shared [`TrxContext`] carrying the
//! diagnostic settings, itinerary data, response buffer and the cooperative
//! abort state. The kinds themselves form a closed tagged union so services
//! dispatch by `match` instead of overload resolution.

pub mod context;
pub mod diagnostic;
pub mod itinerary;
pub mod pricing;
pub mod rex;
pub mod shopping;

pub use context::TrxContext;
pub use diagnostic::Diagnostic;
pub use itinerary::{Direction, FarePath, Itinerary, TravelSegment};
pub use pricing::{
    AltPricingTrx, FareDisplayTrx, MileageTrx, NoPnrPricingTrx, PricingOptions, PricingTrx,
    TaxRequestKind, TaxTrx,
};
pub use rex::{
    CsoState, CsoStatus, DiagQualifier, ExchangePricingTrx, RexPhase, RexPricingTrx,
    SecondaryRequest,
};
pub use shopping::{FlightFinderTrx, ShoppingTrx};

/// Discriminant of the transaction union, used for logging and dispatch
/// decisions that only need the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrxKind {
    Pricing,
    AltPricing,
    NoPnrPricing,
    RexPricing,
    RexExchange,
    ExchangePricing,
    Shopping,
    FlightFinder,
    Mileage,
    FareDisplay,
    Tax,
}

impl TrxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrxKind::Pricing => "pricing",
            TrxKind::AltPricing => "alt_pricing",
            TrxKind::NoPnrPricing => "no_pnr_pricing",
            TrxKind::RexPricing => "rex_pricing",
            TrxKind::RexExchange => "rex_exchange",
            TrxKind::ExchangePricing => "exchange_pricing",
            TrxKind::Shopping => "shopping",
            TrxKind::FlightFinder => "flight_finder",
            TrxKind::Mileage => "mileage",
            TrxKind::FareDisplay => "fare_display",
            TrxKind::Tax => "tax",
        }
    }
}

/// One in-flight request. The variants cover every transaction family the
/// orchestrator routes; services match on the variants they understand.
#[derive(Debug, Clone)]
pub enum Transaction {
    Pricing(PricingTrx),
    AltPricing(AltPricingTrx),
    NoPnrPricing(NoPnrPricingTrx),
    RexPricing(RexPricingTrx),
    RexExchange(RexPricingTrx),
    ExchangePricing(ExchangePricingTrx),
    Shopping(ShoppingTrx),
    FlightFinder(FlightFinderTrx),
    Mileage(MileageTrx),
    FareDisplay(FareDisplayTrx),
    Tax(TaxTrx),
}

impl Transaction {
    pub fn kind(&self) -> TrxKind {
        match self {
            Transaction::Pricing(_) => TrxKind::Pricing,
            Transaction::AltPricing(_) => TrxKind::AltPricing,
            Transaction::NoPnrPricing(_) => TrxKind::NoPnrPricing,
            Transaction::RexPricing(_) => TrxKind::RexPricing,
            Transaction::RexExchange(_) => TrxKind::RexExchange,
            Transaction::ExchangePricing(_) => TrxKind::ExchangePricing,
            Transaction::Shopping(_) => TrxKind::Shopping,
            Transaction::FlightFinder(_) => TrxKind::FlightFinder,
            Transaction::Mileage(_) => TrxKind::Mileage,
            Transaction::FareDisplay(_) => TrxKind::FareDisplay,
            Transaction::Tax(_) => TrxKind::Tax,
        }
    }

    pub fn context(&self) -> &TrxContext {
        match self {
            Transaction::Pricing(trx) => &trx.context,
            Transaction::AltPricing(trx) => &trx.context,
            Transaction::NoPnrPricing(trx) => &trx.context,
            Transaction::RexPricing(trx) => &trx.context,
            Transaction::RexExchange(trx) => &trx.context,
            Transaction::ExchangePricing(trx) => &trx.context,
            Transaction::Shopping(trx) => &trx.context,
            Transaction::FlightFinder(trx) => &trx.context,
            Transaction::Mileage(trx) => &trx.context,
            Transaction::FareDisplay(trx) => &trx.context,
            Transaction::Tax(trx) => &trx.context,
        }
    }

    pub fn as_pricing(&self) -> Option<&PricingTrx> {
        match self {
            Transaction::Pricing(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn as_pricing_mut(&mut self) -> Option<&mut PricingTrx> {
        match self {
            Transaction::Pricing(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn as_alt_pricing(&self) -> Option<&AltPricingTrx> {
        match self {
            Transaction::AltPricing(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn as_alt_pricing_mut(&mut self) -> Option<&mut AltPricingTrx> {
        match self {
            Transaction::AltPricing(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn as_no_pnr_mut(&mut self) -> Option<&mut NoPnrPricingTrx> {
        match self {
            Transaction::NoPnrPricing(trx) => Some(trx),
            _ => None,
        }
    }

    /// Reissue access across both the plain and exchange variants.
    pub fn as_rex(&self) -> Option<&RexPricingTrx> {
        match self {
            Transaction::RexPricing(trx) | Transaction::RexExchange(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn as_rex_mut(&mut self) -> Option<&mut RexPricingTrx> {
        match self {
            Transaction::RexPricing(trx) | Transaction::RexExchange(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn as_tax(&self) -> Option<&TaxTrx> {
        match self {
            Transaction::Tax(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn as_fare_display(&self) -> Option<&FareDisplayTrx> {
        match self {
            Transaction::FareDisplay(trx) => Some(trx),
            _ => None,
        }
    }

    pub fn context_mut(&mut self) -> &mut TrxContext {
        match self {
            Transaction::Pricing(trx) => &mut trx.context,
            Transaction::AltPricing(trx) => &mut trx.context,
            Transaction::NoPnrPricing(trx) => &mut trx.context,
            Transaction::RexPricing(trx) => &mut trx.context,
            Transaction::RexExchange(trx) => &mut trx.context,
            Transaction::ExchangePricing(trx) => &mut trx.context,
            Transaction::Shopping(trx) => &mut trx.context,
            Transaction::FlightFinder(trx) => &mut trx.context,
            Transaction::Mileage(trx) => &mut trx.context,
            Transaction::FareDisplay(trx) => &mut trx.context,
            Transaction::Tax(trx) => &mut trx.context,
        }
    }
}
