//! Split-itinerary pricing and shopping dispatch tests.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use atse_core::orchestration::ServiceBits;
use atse_core::transaction::{
    Diagnostic, Direction, Itinerary, PricingTrx, ShoppingTrx, Transaction, TravelSegment,
    TrxContext,
};

use common::{harness, ServiceBehavior};

fn two_carrier_itin() -> Itinerary {
    Itinerary::new(vec![
        TravelSegment::new(1, "DFW", "ORD", "AA", Direction::Outbound),
        TravelSegment::new(2, "ORD", "HOU", "WN", Direction::Outbound),
        TravelSegment::new(3, "HOU", "DFW", "AA", Direction::Inbound),
    ])
}

#[tokio::test]
async fn snap_request_prices_each_carrier_then_each_direction() {
    let h = harness(HashMap::new());

    let mut pricing = PricingTrx::new(TrxContext::new(two_carrier_itin()));
    pricing.options.mip = true;
    pricing.options.snap_request = true;
    let mut trx = Transaction::Pricing(pricing);

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);

    // Full chain once per governing carrier.
    assert_eq!(h.count("itin_analyzer"), 2);
    assert_eq!(h.count("pricing"), 2);
    // Fare calc runs in both carrier chains plus once per direction.
    assert_eq!(h.count("fare_calc"), 4);
    // MIP without an explicit baggage request skips the baggage service.
    assert_eq!(h.count("free_bag"), 0);

    // The full itinerary is restored after the sub-invocations.
    assert_eq!(trx.context().itin, two_carrier_itin());
}

#[tokio::test]
async fn snap_failure_in_one_sub_itinerary_stops_the_split() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("pricing", Arc::new(|_| Ok(false)));
    let h = harness(overrides);

    let mut pricing = PricingTrx::new(TrxContext::new(two_carrier_itin()));
    pricing.options.mip = true;
    pricing.options.snap_request = true;
    let mut trx = Transaction::Pricing(pricing);

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(!rc);
    // The first carrier chain failed at pricing; the second never started.
    assert_eq!(h.count("itin_analyzer"), 1);
    assert_eq!(h.count("fare_calc"), 0);
}

fn diag_writer(text: &'static str) -> ServiceBehavior {
    Arc::new(move |trx| {
        trx.context_mut().diagnostic.insert_diag_msg(text);
        Ok(true)
    })
}

#[tokio::test]
async fn quiet_prepass_shopping_diagnostic_suppresses_itinerary_output() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("itin_analyzer", diag_writer("ITIN PHASE OUTPUT"));
    overrides.insert("shopping", diag_writer("SHOPPING PHASE OUTPUT"));
    let h = harness(overrides);

    let context = TrxContext::new(two_carrier_itin()).with_diagnostic(Diagnostic::new(910));
    let mut trx = Transaction::Shopping(ShoppingTrx::new(context));

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);

    // Both services ran, but only the shopping phase reached the collector.
    assert_eq!(h.invocations(), vec!["itin_analyzer", "shopping"]);
    let buffer = trx.context().diagnostic.buffer();
    assert!(buffer.contains("SHOPPING PHASE OUTPUT"));
    assert!(!buffer.contains("ITIN PHASE OUTPUT"));
}

#[tokio::test]
async fn plain_shopping_diagnostic_collects_both_phases() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("itin_analyzer", diag_writer("ITIN PHASE OUTPUT"));
    overrides.insert("shopping", diag_writer("SHOPPING PHASE OUTPUT"));
    let h = harness(overrides);

    let context = TrxContext::new(two_carrier_itin()).with_diagnostic(Diagnostic::new(902));
    let mut trx = Transaction::Shopping(ShoppingTrx::new(context));

    h.orchestrator.process(&mut trx).await.unwrap();

    let buffer = trx.context().diagnostic.buffer();
    assert!(buffer.contains("ITIN PHASE OUTPUT"));
    assert!(buffer.contains("SHOPPING PHASE OUTPUT"));
}

#[tokio::test]
async fn shopping_without_diagnostic_runs_the_default_pair() {
    let h = harness(HashMap::new());
    let mut trx = Transaction::Shopping(ShoppingTrx::new(TrxContext::new(two_carrier_itin())));

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);
    assert_eq!(h.invocations(), vec!["itin_analyzer", "shopping"]);
}

#[tokio::test]
async fn shopping_falls_back_to_the_generic_resolver_for_other_ranges() {
    let h = harness(HashMap::new());

    // A taxes-range diagnostic on a shopping entry is not in the shopping
    // table and resolves through the generic range table.
    let context = TrxContext::new(two_carrier_itin()).with_diagnostic(Diagnostic::new(820));
    let mut trx = Transaction::Shopping(ShoppingTrx::new(context));

    h.orchestrator.process(&mut trx).await.unwrap();
    assert!(h.invocations().contains(&"taxes"));
    assert!(!h.invocations().contains(&"shopping"));
}

#[test]
fn canonical_order_is_stable() {
    // Guard against accidental reordering of the dispatch order table.
    let slots: Vec<&str> = ServiceBits::CANONICAL_ORDER
        .iter()
        .map(|bit| bit.slot_name())
        .collect();
    assert_eq!(slots[0], "itin_analyzer");
    assert_eq!(slots[slots.len() - 1], "tax_info");
    assert_eq!(slots.len(), 23);
}
