//! # Shopping Transaction Kinds
//!
//! Shopping (including ESV) and flight-finder requests. These route through
//! the dedicated shopping diagnostic table rather than the generic resolver.

use super::context::TrxContext;

/// Shopping transaction; `esv` marks an expedia-style solution volume
/// request priced through the same pipeline.
#[derive(Debug, Clone)]
pub struct ShoppingTrx {
    pub context: TrxContext,
    pub esv: bool,
}

impl ShoppingTrx {
    pub fn new(context: TrxContext) -> Self {
        Self {
            context,
            esv: false,
        }
    }
}

/// Flight finder transaction.
#[derive(Debug, Clone)]
pub struct FlightFinderTrx {
    pub context: TrxContext,
}

impl FlightFinderTrx {
    pub fn new(context: TrxContext) -> Self {
        Self { context }
    }
}
