//! # Transaction Orchestrator
//!
//! ## Architecture: Main Dispatch Engine
//!
//! The TransactionOrchestrator is the central dispatch engine that routes
//! every transaction kind through the service pipeline. It owns the control
//! flow only: bitmask selection, the fixed invocation order, fallback and
//! redirection decisions, and the cancel-and-start-over task lifecycle.
//! Domain processing lives entirely in the services it dispatches.
//!
//! ## Key Responsibilities
//!
//! - **Bitmask selection**: transaction-kind defaults or the diagnostic
//!   resolver decide which services run
//! - **Flow dispatch**: each transaction family gets its own flow, all
//!   converging on the shared invocation primitive
//! - **Fallback coordination**: WP no-match retry, WPA and no-PNR reprocess
//!   passes, reissue redirects
//! - **Background work**: the CSO pricing attempt is spawned and joined here
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use atse_core::config::OrchestratorConfig;
//! use atse_core::orchestration::{ServiceRegistry, TransactionOrchestrator};
//! use atse_core::transaction::{Itinerary, PricingTrx, Transaction, TrxContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(ServiceRegistry::with_services(HashMap::new()));
//! let orchestrator = TransactionOrchestrator::new(OrchestratorConfig::default(), registry);
//!
//! let context = TrxContext::new(Itinerary::default());
//! let mut trx = Transaction::Pricing(PricingTrx::new(context));
//! let priced = orchestrator.process(&mut trx).await?;
//! println!("priced: {priced}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::OrchestratorConfig;
use crate::constants::diagnostics::DIAG_ORCHESTRATOR_METRICS;
use crate::orchestration::diagnostic_resolver::{
    resolve_service_bits, shopping_bits, ResolverFlags,
};
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};
use crate::orchestration::metrics::ServiceMetrics;
use crate::orchestration::registry::ServiceRegistry;
use crate::orchestration::service_bits::ServiceBits;
use crate::transaction::diagnostic::fix_legacy_diagnostic;
use crate::transaction::{TaxRequestKind, Transaction, TrxKind};

/// Default service set for generic pricing requests, before the baggage
/// policy and request-kind adjustments.
pub(crate) const PRICING_DEFAULT_BITS: ServiceBits = ServiceBits::ITIN_ANALYZER
    .union(ServiceBits::FARE_COLLECTOR)
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::S8_BRAND)
    .union(ServiceBits::SERVICE_FEES)
    .union(ServiceBits::TICKETING_FEES)
    .union(ServiceBits::TAXES)
    .union(ServiceBits::PRICING)
    .union(ServiceBits::FARE_CALC);

/// Reduced default set for structured-fare-rule requests.
pub(crate) const STRUCTURED_RULE_BITS: ServiceBits = ServiceBits::ITIN_ANALYZER
    .union(ServiceBits::FARE_COLLECTOR)
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::PRICING)
    .union(ServiceBits::FARE_CALC);

/// Main dispatch engine for the service pipeline.
pub struct TransactionOrchestrator {
    pub(crate) config: OrchestratorConfig,
    pub(crate) registry: Arc<ServiceRegistry>,
    pub(crate) metrics: Arc<ServiceMetrics>,
}

impl TransactionOrchestrator {
    pub fn new(config: OrchestratorConfig, registry: Arc<ServiceRegistry>) -> Self {
        info!("Creating new TransactionOrchestrator");
        Self {
            config,
            registry,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Process one transaction through its flow. The transaction is
    /// borrowed for the duration of the call; all response content is
    /// written into its own response buffer by the dispatched services.
    #[instrument(skip(self, trx), fields(trx_id = %trx.context().trx_id, trx_kind = trx.kind().as_str()))]
    pub async fn process(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        info!("Starting transaction orchestration");

        let result = match trx.kind() {
            TrxKind::Pricing => self.process_pricing(trx).await,
            TrxKind::AltPricing => self.process_alt_pricing(trx).await,
            TrxKind::NoPnrPricing => self.process_no_pnr_pricing(trx).await,
            TrxKind::RexPricing | TrxKind::RexExchange => self.process_rex(trx).await,
            TrxKind::ExchangePricing => self.process_exchange_pricing(trx).await,
            TrxKind::Shopping | TrxKind::FlightFinder => self.process_shopping(trx).await,
            TrxKind::Mileage => self.process_mileage(trx).await,
            TrxKind::FareDisplay => self.process_fare_display(trx).await,
            TrxKind::Tax => self.process_tax(trx).await,
        };

        if fix_legacy_diagnostic(trx.context().diagnostic.diagnostic_type())
            == DIAG_ORCHESTRATOR_METRICS
        {
            self.write_metrics_diagnostic(trx);
        }

        match &result {
            Ok(rc) => info!(rc = rc, "Transaction orchestration complete"),
            Err(err) => info!(error = %err, "Transaction orchestration failed"),
        }

        result
    }

    /// Render the per-service latency statistics and registry state into the
    /// diagnostic collector for the orchestrator metrics diagnostic.
    fn write_metrics_diagnostic(&self, trx: &mut Transaction) {
        let registry_stats = self.registry.stats();
        let latency: serde_json::Map<String, serde_json::Value> = self
            .metrics
            .snapshot()
            .into_iter()
            .map(|(name, stat)| {
                (
                    name.to_string(),
                    serde_json::json!({
                        "invocations": stat.invocations,
                        "failures": stat.failures,
                        "total_ms": stat.total_latency.as_millis() as u64,
                        "max_ms": stat.max_latency.as_millis() as u64,
                    }),
                )
            })
            .collect();

        let payload = serde_json::json!({
            "active_threads": registry_stats.active_threads,
            "resolved_services": registry_stats.resolved_names,
            "service_latency": latency,
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_default();
        trx.context_mut().diagnostic.insert_diag_msg(&rendered);
    }

    pub(crate) fn resolver_flags(&self, pbb_request: bool) -> ResolverFlags {
        ResolverFlags {
            pbb_request,
            rbd_by_cabin_active: self.config.policy.rbd_by_cabin_active,
        }
    }

    /// Exchange pricing: the full default pricing chain, diagnostics via the
    /// generic resolver. Also the target of the reissue redirect sub-flow.
    pub(crate) async fn process_exchange_pricing(
        &self,
        trx: &mut Transaction,
    ) -> OrchestrationResult<bool> {
        let bits = resolve_service_bits(
            &trx.context().diagnostic,
            self.resolver_flags(false),
            PRICING_DEFAULT_BITS,
        )?;
        self.invoke_services(trx, bits).await
    }

    /// Shopping and flight-finder dispatch through the dedicated shopping
    /// table first; unmatched shopping diagnostics fall back to the generic
    /// resolver.
    pub(crate) async fn process_shopping(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let number = fix_legacy_diagnostic(trx.context().diagnostic.diagnostic_type());

        if let Some((bits, quiet_prepass)) = shopping_bits(number) {
            if quiet_prepass {
                // The itinerary-analysis pre-pass must not leak diagnostic
                // output from the wrong phase into the collector.
                trx.context_mut().diagnostic.deactivate();
                let prepass = self
                    .invoke_services(trx, bits & ServiceBits::ITIN_ANALYZER)
                    .await;
                trx.context_mut().diagnostic.activate();
                if !prepass? {
                    return Ok(false);
                }
                return self
                    .invoke_services(trx, bits - ServiceBits::ITIN_ANALYZER)
                    .await;
            }
            return self.invoke_services(trx, bits).await;
        }

        let bits = resolve_service_bits(
            &trx.context().diagnostic,
            self.resolver_flags(false),
            ServiceBits::ITIN_ANALYZER | ServiceBits::SHOPPING,
        )?;
        self.invoke_services(trx, bits).await
    }

    pub(crate) async fn process_mileage(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let bits = resolve_service_bits(
            &trx.context().diagnostic,
            self.resolver_flags(false),
            ServiceBits::ITIN_ANALYZER | ServiceBits::MILEAGE,
        )?;
        self.invoke_services(trx, bits).await
    }

    pub(crate) async fn process_fare_display(
        &self,
        trx: &mut Transaction,
    ) -> OrchestrationResult<bool> {
        let ticketing_cxr_display = trx
            .as_fare_display()
            .map(|fd| fd.ticketing_cxr_display)
            .unwrap_or(false);

        let mut default_bits =
            ServiceBits::ITIN_ANALYZER | ServiceBits::FARE_COLLECTOR | ServiceBits::FARE_DISPLAY;
        if ticketing_cxr_display {
            default_bits |= ServiceBits::TICKETING_CXR | ServiceBits::TICKETING_CXR_DISPLAY;
        }

        let bits = resolve_service_bits(
            &trx.context().diagnostic,
            self.resolver_flags(false),
            default_bits,
        )?;
        self.invoke_services(trx, bits).await
    }

    pub(crate) async fn process_tax(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let request = trx
            .as_tax()
            .map(|tax| tax.request)
            .ok_or_else(|| OrchestrationError::configuration("tax flow on non-tax transaction"))?;

        let default_bits = match request {
            TaxRequestKind::Standard => ServiceBits::ITIN_ANALYZER | ServiceBits::TAXES,
            TaxRequestKind::Display => {
                ServiceBits::ITIN_ANALYZER | ServiceBits::TAXES | ServiceBits::TAX_DISPLAY
            }
            TaxRequestKind::PfcDisplay => {
                ServiceBits::ITIN_ANALYZER | ServiceBits::TAXES | ServiceBits::PFC_DISPLAY
            }
            // Tax rule information decodes tax codes without an itinerary.
            TaxRequestKind::Info => ServiceBits::DECODE | ServiceBits::TAX_INFO,
        };

        let bits = resolve_service_bits(
            &trx.context().diagnostic,
            self.resolver_flags(false),
            default_bits,
        )?;
        self.invoke_services(trx, bits).await
    }
}
