//! Pricing-family flow tests: default bitmask selection, diagnostic-driven
//! short paths, the WP no-match retry and the WPA/no-PNR reprocess passes.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use atse_core::constants::diag_params::MAX_OPTIONS;
use atse_core::orchestration::{
    resolve_service_bits, ErrorCode, OrchestrationError, ResolverFlags, ServiceBits,
};
use atse_core::transaction::{
    AltPricingTrx, Diagnostic, NoPnrPricingTrx, PricingTrx, TaxRequestKind, TaxTrx, Transaction,
    TrxContext, TrxKind,
};

use common::{harness, harness_with, pricing_trx, round_trip_itin, ServiceBehavior};

#[tokio::test]
async fn generic_pricing_runs_the_full_default_chain() {
    let h = harness(HashMap::new());
    let mut trx = pricing_trx();

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);

    // Full default set plus the baggage service for a plain pricing entry,
    // in canonical order.
    assert_eq!(
        h.invocations(),
        vec![
            "itin_analyzer",
            "fare_collector",
            "fare_validator",
            "s8_brand",
            "pricing",
            "service_fees",
            "free_bag",
            "taxes",
            "ticketing_fees",
            "fare_calc",
        ]
    );
}

#[tokio::test]
async fn routing_diagnostic_runs_only_the_validation_pipeline() {
    let h = harness(HashMap::new());
    let mut trx = pricing_trx();
    trx.context_mut().diagnostic = Diagnostic::new(460);

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);
    assert_eq!(
        h.invocations(),
        vec!["itin_analyzer", "fare_collector", "fare_validator"]
    );
}

#[test]
fn resolved_bitmask_is_deterministic_across_calls() {
    let diag = Diagnostic::new(820);
    let first =
        resolve_service_bits(&diag, ResolverFlags::default(), ServiceBits::ALL_SERVICES).unwrap();
    for _ in 0..5 {
        let again =
            resolve_service_bits(&diag, ResolverFlags::default(), ServiceBits::ALL_SERVICES)
                .unwrap();
        assert_eq!(first, again);
    }
}

#[tokio::test]
async fn mip_without_baggage_request_skips_the_free_bag_service() {
    let h = harness(HashMap::new());
    let mut pricing = PricingTrx::new(TrxContext::new(round_trip_itin()));
    pricing.options.mip = true;
    let mut trx = Transaction::Pricing(pricing);

    h.orchestrator.process(&mut trx).await.unwrap();
    assert_eq!(h.count("free_bag"), 0);
}

fn no_fares_on_wp_behavior() -> ServiceBehavior {
    Arc::new(|trx| {
        if trx.kind() == TrxKind::Pricing {
            Err(OrchestrationError::business_rule(
                ErrorCode::NoFareForClassUsed,
                "no fare for class used",
            ))
        } else {
            Ok(true)
        }
    })
}

#[tokio::test]
async fn wp_no_fares_retries_as_wpa_no_match() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("pricing", no_fares_on_wp_behavior());
    let h = harness(overrides);

    let mut trx = pricing_trx();
    let rc = h.orchestrator.process(&mut trx).await.unwrap();

    assert!(rc);
    // Once on the failed WP path, once on the alternate-pricing pass.
    assert_eq!(h.count("pricing"), 2);
}

#[tokio::test]
async fn wp_no_match_retry_is_suppressed_for_low_fare_requests() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("pricing", no_fares_on_wp_behavior());
    let h = harness(overrides);

    let mut pricing = PricingTrx::new(TrxContext::new(round_trip_itin()));
    pricing.options.low_fare_requested = true;
    let mut trx = Transaction::Pricing(pricing);

    let err = h.orchestrator.process(&mut trx).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NoFareForClassUsed);
    assert_eq!(h.count("pricing"), 1);
}

#[tokio::test]
async fn wp_no_match_retry_is_suppressed_by_configuration() {
    let mut config = atse_core::config::OrchestratorConfig::for_testing();
    config.policy.wp_no_match_retry = false;

    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("pricing", no_fares_on_wp_behavior());
    let h = harness_with(config, overrides);

    let mut trx = pricing_trx();
    let err = h.orchestrator.process(&mut trx).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NoFareForClassUsed);
}

#[tokio::test]
async fn wpa_surfaces_the_original_error_when_reprocess_is_not_permitted() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert(
        "pricing",
        Arc::new(|_| {
            Err(OrchestrationError::business_rule(
                ErrorCode::NoCombinableFaresForClass,
                "no combinable fares for class",
            ))
        }),
    );
    let h = harness(overrides);

    // An explicit no-match request forbids the reprocess pass.
    let mut alt = AltPricingTrx::new(TrxContext::new(round_trip_itin()));
    alt.xm_request = true;
    let mut trx = Transaction::AltPricing(alt);

    let err = h.orchestrator.process(&mut trx).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NoCombinableFaresForClass);
}

fn fail_once_behavior(code: ErrorCode) -> ServiceBehavior {
    let calls = AtomicUsize::new(0);
    Arc::new(move |_| {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(OrchestrationError::business_rule(code, "first pass failed"))
        } else {
            Ok(true)
        }
    })
}

#[tokio::test]
async fn wpa_reprocesses_after_no_combinable_fares_then_runs_the_final_pass() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert(
        "pricing",
        fail_once_behavior(ErrorCode::NoCombinableFaresForClass),
    );
    let h = harness(overrides);

    let alt = AltPricingTrx::new(TrxContext::new(round_trip_itin()));
    let mut trx = Transaction::AltPricing(alt);

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);
    assert!(trx.as_alt_pricing().unwrap().reprocessed);

    // Fare calc and free bag run only on the final pass; the first pass
    // stopped at pricing and the reprocess mask excludes them.
    assert_eq!(h.count("pricing"), 2);
    assert_eq!(h.count("fare_calc"), 1);
    assert_eq!(h.count("free_bag"), 1);
    // The reprocess pass does not re-analyse the itinerary.
    assert_eq!(h.count("itin_analyzer"), 1);
}

#[tokio::test]
async fn alt_range_diagnostic_without_reprocess_is_an_error() {
    let h = harness(HashMap::new());

    let alt = AltPricingTrx::new(
        TrxContext::new(round_trip_itin()).with_diagnostic(Diagnostic::new(972)),
    );
    let mut trx = Transaction::AltPricing(alt);

    let err = h.orchestrator.process(&mut trx).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NoDiagnosticToDisplay);
}

#[tokio::test]
async fn no_pnr_option_count_is_overridable_via_diagnostic_parameter() {
    let h = harness(HashMap::new());

    let context = TrxContext::new(round_trip_itin())
        .with_diagnostic(Diagnostic::none().with_param(MAX_OPTIONS, "50"));
    let mut trx = Transaction::NoPnrPricing(NoPnrPricingTrx::new(context));

    h.orchestrator.process(&mut trx).await.unwrap();
    match &trx {
        Transaction::NoPnrPricing(no_pnr) => assert_eq!(no_pnr.max_options, Some(50)),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn no_pnr_reprocesses_with_the_intersected_bitmask() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("pricing", fail_once_behavior(ErrorCode::NoFaresFound));
    let h = harness(overrides);

    let mut trx =
        Transaction::NoPnrPricing(NoPnrPricingTrx::new(TrxContext::new(round_trip_itin())));

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);
    match &trx {
        Transaction::NoPnrPricing(no_pnr) => assert!(no_pnr.reprocessed),
        _ => unreachable!(),
    }
    // Taxes are in the match mask but outside the reprocess intersection.
    assert_eq!(h.count("itin_analyzer"), 1);
    assert_eq!(h.count("taxes"), 0);
}

#[tokio::test]
async fn no_pnr_full_fbc_mode_suppresses_the_reprocess() {
    let mut overrides: HashMap<&'static str, ServiceBehavior> = HashMap::new();
    overrides.insert("pricing", fail_once_behavior(ErrorCode::NoFaresFound));
    let h = harness(overrides);

    let mut no_pnr = NoPnrPricingTrx::new(TrxContext::new(round_trip_itin()));
    no_pnr.full_fbc_itin = true;
    let mut trx = Transaction::NoPnrPricing(no_pnr);

    let err = h.orchestrator.process(&mut trx).await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NoFaresFound);
}

#[tokio::test]
async fn metrics_diagnostic_renders_latency_statistics() {
    let h = harness(HashMap::new());
    let mut trx = pricing_trx();
    trx.context_mut().diagnostic = Diagnostic::new(199);

    let rc = h.orchestrator.process(&mut trx).await.unwrap();
    assert!(rc);

    let buffer = trx.context().diagnostic.buffer();
    assert!(buffer.contains("service_latency"));
    assert!(buffer.contains("\"pricing\""));
}

#[tokio::test]
async fn tax_display_request_adds_the_display_service() {
    let h = harness(HashMap::new());
    let mut trx = Transaction::Tax(TaxTrx::new(
        TrxContext::new(round_trip_itin()),
        TaxRequestKind::Display,
    ));

    h.orchestrator.process(&mut trx).await.unwrap();
    assert_eq!(h.invocations(), vec!["itin_analyzer", "taxes", "tax_display"]);
}
