//! # Service Bitmask
//!
//! One bit per named service slot. A bitmask is built fresh for every
//! `process()` call and never persisted; bit presence means "invoke this
//! service for this transaction".
//!
//! The canonical invocation order is fixed and independent of the bitmask:
//! skipping a service never shifts the relative order of the remaining ones.

use bitflags::bitflags;

bitflags! {
    /// Set of services enabled for one orchestration call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ServiceBits: u64 {
        const ITIN_ANALYZER        = 1 << 0;
        const FARE_COLLECTOR       = 1 << 1;
        const FARE_SELECTOR        = 1 << 2;
        const FARE_VALIDATOR       = 1 << 3;
        const S8_BRAND             = 1 << 4;
        const REX_FARE_SELECTOR    = 1 << 5;
        const PRICING              = 1 << 6;
        const SERVICE_FEES         = 1 << 7;
        const FREE_BAG             = 1 << 8;
        const TAXES                = 1 << 9;
        const TICKETING_FEES       = 1 << 10;
        const FARE_CALC            = 1 << 11;
        const CURRENCY             = 1 << 12;
        const MILEAGE              = 1 << 13;
        const DECODE               = 1 << 14;
        const INTERNAL             = 1 << 15;
        const SHOPPING             = 1 << 16;
        const FARE_DISPLAY         = 1 << 17;
        const TICKETING_CXR        = 1 << 18;
        const TICKETING_CXR_DISPLAY = 1 << 19;
        const TAX_DISPLAY          = 1 << 20;
        const PFC_DISPLAY          = 1 << 21;
        const TAX_INFO             = 1 << 22;

        /// Modifier: tolerate individual service failures instead of
        /// aborting the invocation loop.
        const CONTINUE_ON_FAILURE  = 1 << 62;
    }
}

impl ServiceBits {
    /// Sentinel covering every dispatchable service.
    pub const ALL_SERVICES: ServiceBits = ServiceBits::all()
        .difference(ServiceBits::CONTINUE_ON_FAILURE);

    /// The fixed invocation order. Bits not listed here (the modifier bit)
    /// are never dispatched.
    pub const CANONICAL_ORDER: &'static [ServiceBits] = &[
        ServiceBits::ITIN_ANALYZER,
        ServiceBits::FARE_COLLECTOR,
        ServiceBits::FARE_SELECTOR,
        ServiceBits::FARE_VALIDATOR,
        ServiceBits::S8_BRAND,
        ServiceBits::REX_FARE_SELECTOR,
        ServiceBits::PRICING,
        ServiceBits::SERVICE_FEES,
        ServiceBits::FREE_BAG,
        ServiceBits::TAXES,
        ServiceBits::TICKETING_FEES,
        ServiceBits::FARE_CALC,
        ServiceBits::CURRENCY,
        ServiceBits::MILEAGE,
        ServiceBits::DECODE,
        ServiceBits::INTERNAL,
        ServiceBits::SHOPPING,
        ServiceBits::FARE_DISPLAY,
        ServiceBits::TICKETING_CXR,
        ServiceBits::TICKETING_CXR_DISPLAY,
        ServiceBits::TAX_DISPLAY,
        ServiceBits::PFC_DISPLAY,
        ServiceBits::TAX_INFO,
    ];

    /// Slot labels aligned index-for-index with [`Self::CANONICAL_ORDER`],
    /// used for logging, metrics and configuration lookup.
    const SLOT_NAMES: &'static [&'static str] = &[
        "itin_analyzer",
        "fare_collector",
        "fare_selector",
        "fare_validator",
        "s8_brand",
        "rex_fare_selector",
        "pricing",
        "service_fees",
        "free_bag",
        "taxes",
        "ticketing_fees",
        "fare_calc",
        "currency",
        "mileage",
        "decode",
        "internal",
        "shopping",
        "fare_display",
        "ticketing_cxr",
        "ticketing_cxr_display",
        "tax_display",
        "pfc_display",
        "tax_info",
    ];

    /// Slot label for a single service bit.
    pub fn slot_name(self) -> &'static str {
        Self::CANONICAL_ORDER
            .iter()
            .position(|bit| *bit == self)
            .map(|index| Self::SLOT_NAMES[index])
            .unwrap_or("unknown")
    }

    pub fn continue_on_failure(&self) -> bool {
        self.contains(ServiceBits::CONTINUE_ON_FAILURE)
    }
}
