//! Invocation-loop contract tests: fixed ordering, fail-fast semantics,
//! continue-on-failure tolerance, upfront pointer validation, abort checks
//! and the dispatch trace.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use atse_core::constants::diag_params::TO_ROUTING;
use atse_core::orchestration::{ErrorCode, OrchestrationError, ServiceBits};
use atse_core::transaction::Diagnostic;

use common::{harness, harness_missing, pricing_trx, ServiceBehavior};

fn expected_sequence(bits: ServiceBits) -> Vec<&'static str> {
    ServiceBits::CANONICAL_ORDER
        .iter()
        .filter(|bit| bits.contains(**bit))
        .map(|bit| bit.slot_name())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// For any bitmask, the invoked sequence equals the canonical order
    /// filtered to the enabled bits.
    #[test]
    fn invocation_order_is_the_filtered_canonical_order(raw in 0u64..(1u64 << 23)) {
        let bits = ServiceBits::from_bits_truncate(raw);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let h = harness(HashMap::new());
        let mut trx = pricing_trx();
        let rc = runtime
            .block_on(h.orchestrator.invoke_services(&mut trx, bits))
            .unwrap();

        prop_assert!(rc);
        prop_assert_eq!(h.invocations(), expected_sequence(bits));
    }
}

#[tokio::test]
async fn failure_without_continue_on_failure_stops_the_loop() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("taxes", Arc::new(|_| Ok(false)));
    let h = harness(overrides);

    let bits = ServiceBits::ITIN_ANALYZER
        | ServiceBits::TAXES
        | ServiceBits::FARE_CALC
        | ServiceBits::CURRENCY;
    let mut trx = pricing_trx();
    let rc = h.orchestrator.invoke_services(&mut trx, bits).await.unwrap();

    assert!(!rc);
    assert_eq!(h.invocations(), vec!["itin_analyzer", "taxes"]);
}

#[tokio::test]
async fn continue_on_failure_attempts_every_enabled_service() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("taxes", Arc::new(|_| Ok(false)));
    let h = harness(overrides);

    let bits = ServiceBits::ITIN_ANALYZER
        | ServiceBits::TAXES
        | ServiceBits::FARE_CALC
        | ServiceBits::CURRENCY
        | ServiceBits::CONTINUE_ON_FAILURE;
    let mut trx = pricing_trx();
    let rc = h.orchestrator.invoke_services(&mut trx, bits).await.unwrap();

    assert!(rc);
    assert_eq!(
        h.invocations(),
        vec!["itin_analyzer", "taxes", "fare_calc", "currency"]
    );
}

#[tokio::test]
async fn unresolvable_service_fails_before_anything_runs() {
    let h = harness_missing(&["pricing"]);

    let bits = ServiceBits::ITIN_ANALYZER | ServiceBits::PRICING | ServiceBits::FARE_CALC;
    let mut trx = pricing_trx();
    let rc = h.orchestrator.invoke_services(&mut trx, bits).await.unwrap();

    // The upfront pointer validation fails the call before the first
    // service executes.
    assert!(!rc);
    assert!(h.invocations().is_empty());
}

#[tokio::test]
async fn unresolvable_service_is_tolerated_under_continue_on_failure() {
    let h = harness_missing(&["pricing"]);

    let bits = ServiceBits::ITIN_ANALYZER
        | ServiceBits::PRICING
        | ServiceBits::FARE_CALC
        | ServiceBits::CONTINUE_ON_FAILURE;
    let mut trx = pricing_trx();
    let rc = h.orchestrator.invoke_services(&mut trx, bits).await.unwrap();

    assert!(rc);
    assert_eq!(h.invocations(), vec!["itin_analyzer", "fare_calc"]);
}

#[tokio::test]
async fn cancelled_transaction_aborts_at_the_service_boundary() {
    let h = harness(HashMap::new());
    let mut trx = pricing_trx();
    trx.context()
        .cancel_handle()
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let err = h
        .orchestrator
        .invoke_services(&mut trx, ServiceBits::ITIN_ANALYZER | ServiceBits::PRICING)
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::TransactionAborted);
    assert!(h.invocations().is_empty());
}

#[tokio::test]
async fn service_errors_propagate_unchanged() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert(
        "pricing",
        Arc::new(|_| {
            Err(OrchestrationError::business_rule(
                ErrorCode::UnableToMatchFare,
                "no matching fare component",
            ))
        }),
    );
    let h = harness(overrides);

    let mut trx = pricing_trx();
    let err = h
        .orchestrator
        .invoke_services(&mut trx, ServiceBits::PRICING | ServiceBits::FARE_CALC)
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::UnableToMatchFare);
    assert_eq!(h.invocations(), vec!["pricing"]);
}

#[tokio::test]
async fn dispatch_trace_is_flushed_even_on_early_failure() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("taxes", Arc::new(|_| Ok(false)));
    let h = harness(overrides);

    let mut trx = pricing_trx();
    trx.context_mut().diagnostic = Diagnostic::new(460).with_param(TO_ROUTING, "T");

    let bits = ServiceBits::ITIN_ANALYZER | ServiceBits::TAXES | ServiceBits::FARE_CALC;
    let rc = h.orchestrator.invoke_services(&mut trx, bits).await.unwrap();
    assert!(!rc);

    let buffer = trx.context().diagnostic.buffer();
    assert!(buffer.contains("INVOKED  itin_analyzer"));
    assert!(buffer.contains("INVOKED  taxes"));
    assert!(buffer.contains("SKIPPED  fare_collector"));
    // The stage after the failure never ran and never reached the trace.
    assert!(!buffer.contains("fare_calc"));
}

#[tokio::test]
async fn metrics_record_each_invocation() {
    let h = harness(HashMap::new());
    let mut trx = pricing_trx();
    let bits = ServiceBits::ITIN_ANALYZER | ServiceBits::PRICING;
    h.orchestrator.invoke_services(&mut trx, bits).await.unwrap();
    h.orchestrator.invoke_services(&mut trx, bits).await.unwrap();

    let stat = h.orchestrator.metrics().stat("pricing").unwrap();
    assert_eq!(stat.invocations, 2);
    assert_eq!(stat.failures, 0);
}
