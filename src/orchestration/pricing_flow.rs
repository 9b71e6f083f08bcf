//! # Pricing Flows
//!
//! The pricing transaction family: generic pricing with the WP no-match
//! retry, alternate pricing (WPA) with its two-pass reprocess protocol, and
//! no-PNR pricing with the no-match reprocess over an intersected bitmask.
//!
//! Expected business outcomes arrive as classified error codes from the
//! pricing stage; the flows branch on the classification directly and only
//! rethrow what no fallback covers.

use tracing::{debug, info};

use crate::constants::diag_params::MAX_OPTIONS;
use crate::constants::diag_ranges::{
    ALT_PRICING_DIAG_OFFSET, ALT_PRICING_DIAG_RANGE_BEGIN, ALT_PRICING_DIAG_RANGE_END,
};
use crate::constants::DiagnosticNumber;
use crate::orchestration::diagnostic_resolver::resolve_service_bits;
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};
use crate::orchestration::orchestrator::{
    TransactionOrchestrator, PRICING_DEFAULT_BITS, STRUCTURED_RULE_BITS,
};
use crate::orchestration::service_bits::ServiceBits;
use crate::transaction::diagnostic::fix_legacy_diagnostic;
use crate::transaction::{AltPricingTrx, PricingOptions, Transaction};

/// WPA no-match reprocess pass: reprice without re-analysing the itinerary.
const WPA_REPROCESS_BITS: ServiceBits = ServiceBits::FARE_COLLECTOR
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::PRICING)
    .union(ServiceBits::TAXES);

/// WPA final pass after a successful reprocess.
const WPA_FINAL_PASS_BITS: ServiceBits =
    ServiceBits::FARE_CALC.union(ServiceBits::FREE_BAG);

/// No-PNR match attempt default.
const NOPNR_MATCH_BITS: ServiceBits = ServiceBits::ITIN_ANALYZER
    .union(ServiceBits::FARE_COLLECTOR)
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::PRICING)
    .union(ServiceBits::TAXES)
    .union(ServiceBits::FARE_CALC);

/// No-PNR no-match reprocess: the match bitmask is intersected with this.
const NOPNR_REPROCESS_BITS: ServiceBits = ServiceBits::FARE_COLLECTOR
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::PRICING)
    .union(ServiceBits::FARE_CALC);

fn in_alt_pricing_range(number: DiagnosticNumber) -> bool {
    number >= ALT_PRICING_DIAG_RANGE_BEGIN && number < ALT_PRICING_DIAG_RANGE_END
}

impl TransactionOrchestrator {
    /// Service bitmask for a generic pricing transaction: the request-kind
    /// default adjusted by the baggage policy, or the resolver's answer when
    /// a diagnostic is requested.
    pub(crate) fn pricing_service_bits(
        &self,
        trx: &Transaction,
    ) -> OrchestrationResult<ServiceBits> {
        let pricing = trx.as_pricing().ok_or_else(|| {
            OrchestrationError::configuration("pricing flow on non-pricing transaction")
        })?;

        let mut default_bits = if pricing.options.structured_fare_rules {
            STRUCTURED_RULE_BITS
        } else {
            PRICING_DEFAULT_BITS
        };
        if pricing.free_bag_service_needed() {
            default_bits |= ServiceBits::FREE_BAG;
        }

        resolve_service_bits(
            &trx.context().diagnostic,
            self.resolver_flags(pricing.options.pbb),
            default_bits,
        )
    }

    /// Generic pricing flow (WP and MIP families).
    pub(crate) async fn process_pricing(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let options = trx
            .as_pricing()
            .ok_or_else(|| {
                OrchestrationError::configuration("pricing flow on non-pricing transaction")
            })?
            .options
            .clone();

        if options.snap_request && options.mip {
            return self.process_snap(trx).await;
        }

        let bits = self.pricing_service_bits(trx)?;

        match self.invoke_services(trx, bits).await {
            Err(err) if self.wp_no_match_permitted(&options, &err) => {
                info!(
                    trx_id = %trx.context().trx_id,
                    code = ?err.error_code(),
                    "No fares found, retrying as WPA no-match"
                );
                self.retry_as_wp_no_match(trx).await
            }
            other => other,
        }
    }

    /// WP no-match retry preconditions: enabled by configuration, a no-fares
    /// class failure, and the request asked for neither low-fare nor
    /// requested-fare-basis data.
    fn wp_no_match_permitted(&self, options: &PricingOptions, err: &OrchestrationError) -> bool {
        self.config.policy.wp_no_match_retry
            && err.error_code().is_no_fares_class()
            && !options.low_fare_requested
            && !options.requested_fare_basis
    }

    /// Reprocess a failed WP pricing as an alternate-pricing transaction and
    /// copy the alternate results back into the original.
    async fn retry_as_wp_no_match(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let mut context = trx.context().clone();
        context.response.clear();
        context.fare_paths.clear();

        let mut alt = AltPricingTrx::new(context);
        alt.wp_no_match = true;
        let mut alt_trx = Transaction::AltPricing(alt);

        let rc = self.process_alt_pricing(&mut alt_trx).await?;

        let alt_context = alt_trx.context();
        let context = trx.context_mut();
        context.response = alt_context.response.clone();
        context.fare_paths = alt_context.fare_paths.clone();
        context.diagnostic = alt_context.diagnostic.clone();
        Ok(rc)
    }

    /// Alternate pricing (WPA): combinable-fares first pass, then on a
    /// no-combinable-fares failure a reprocess pass with a reduced bitmask
    /// followed by the fare-calc/free-bag final pass.
    pub(crate) async fn process_alt_pricing(
        &self,
        trx: &mut Transaction,
    ) -> OrchestrationResult<bool> {
        let xm_request = trx.as_alt_pricing().map(|alt| alt.xm_request).unwrap_or(false);
        let diag_number = fix_legacy_diagnostic(trx.context().diagnostic.diagnostic_type());
        let alt_range_diag = in_alt_pricing_range(diag_number);

        // Alternate-range diagnostics are only meaningful on the reprocess
        // path, so the first pass runs with the kind default.
        let first_bits = if alt_range_diag {
            PRICING_DEFAULT_BITS | ServiceBits::FREE_BAG
        } else {
            resolve_service_bits(
                &trx.context().diagnostic,
                self.resolver_flags(false),
                PRICING_DEFAULT_BITS | ServiceBits::FREE_BAG,
            )?
        };

        match self.invoke_services(trx, first_bits).await {
            Ok(rc) => {
                if alt_range_diag {
                    // No reprocess happened; the requested diagnostic cannot
                    // be produced.
                    return Err(OrchestrationError::NoDiagnosticToDisplay {
                        diagnostic: diag_number,
                    });
                }
                Ok(rc)
            }
            Err(err) if self.wpa_reprocess_permitted(xm_request, &err) => {
                debug!(
                    trx_id = %trx.context().trx_id,
                    code = ?err.error_code(),
                    "No combinable fares, running WPA reprocess pass"
                );
                if let Some(alt) = trx.as_alt_pricing_mut() {
                    alt.reprocessed = true;
                }

                let reprocess_bits = if alt_range_diag {
                    // Remap the alternate diagnostic into the pricing range
                    // for the pass it documents.
                    let remapped = diag_number - ALT_PRICING_DIAG_OFFSET;
                    trx.context_mut().diagnostic.set_diagnostic_type(remapped);
                    resolve_service_bits(
                        &trx.context().diagnostic,
                        self.resolver_flags(false),
                        WPA_REPROCESS_BITS,
                    )?
                } else {
                    WPA_REPROCESS_BITS
                };

                if !self.invoke_services(trx, reprocess_bits).await? {
                    return Ok(false);
                }
                self.invoke_services(trx, WPA_FINAL_PASS_BITS).await
            }
            Err(err) => Err(err),
        }
    }

    fn wpa_reprocess_permitted(&self, xm_request: bool, err: &OrchestrationError) -> bool {
        !xm_request && err.error_code().is_no_combinable_fares_class()
    }

    /// No-PNR pricing (WQ): match attempt, then on a no-fares failure a
    /// no-match reprocess over the intersected bitmask.
    pub(crate) async fn process_no_pnr_pricing(
        &self,
        trx: &mut Transaction,
    ) -> OrchestrationResult<bool> {
        // Optional pre-step: a diagnostic parameter overrides the maximum
        // number of pricing options.
        if let Some(raw) = trx
            .context()
            .diagnostic
            .param(MAX_OPTIONS)
            .map(str::to_string)
        {
            match raw.parse::<u32>() {
                Ok(max) => {
                    if let Some(no_pnr) = trx.as_no_pnr_mut() {
                        debug!(max_options = max, "Overriding no-PNR option count");
                        no_pnr.max_options = Some(max);
                    }
                }
                Err(_) => {
                    debug!(raw = %raw, "Ignoring unparseable no-PNR option override");
                }
            }
        }

        let full_fbc_itin = trx
            .as_no_pnr_mut()
            .map(|no_pnr| no_pnr.full_fbc_itin)
            .unwrap_or(false);
        let diag_number = fix_legacy_diagnostic(trx.context().diagnostic.diagnostic_type());
        let alt_range_diag = in_alt_pricing_range(diag_number);

        let match_bits = if alt_range_diag {
            NOPNR_MATCH_BITS
        } else {
            resolve_service_bits(
                &trx.context().diagnostic,
                self.resolver_flags(false),
                NOPNR_MATCH_BITS,
            )?
        };

        match self.invoke_services(trx, match_bits).await {
            Ok(rc) => {
                if alt_range_diag {
                    return Err(OrchestrationError::NoDiagnosticToDisplay {
                        diagnostic: diag_number,
                    });
                }
                Ok(rc)
            }
            Err(err) if err.error_code().is_no_fares_class() && !full_fbc_itin => {
                debug!(
                    trx_id = %trx.context().trx_id,
                    code = ?err.error_code(),
                    "No fare matched, running no-PNR no-match reprocess"
                );
                if let Some(no_pnr) = trx.as_no_pnr_mut() {
                    no_pnr.reprocessed = true;
                }

                if alt_range_diag {
                    let remapped = diag_number - ALT_PRICING_DIAG_OFFSET;
                    trx.context_mut().diagnostic.set_diagnostic_type(remapped);
                }

                self.invoke_services(trx, match_bits & NOPNR_REPROCESS_BITS)
                    .await
            }
            Err(err) => Err(err),
        }
    }
}
