//! # Service Invocation Primitive
//!
//! The shared loop every orchestration flow converges on: invoke each
//! enabled service in the canonical fixed order, each wrapped with a
//! cooperative abort check, a current-service marker for attribution, and a
//! latency measurement feeding the statistics sink.
//!
//! Without the continue-on-failure modifier, all required service names must
//! resolve before anything runs; a missing service must never be discovered
//! mid-pipeline on a partially processed transaction.

use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::constants::diag_params::TO_ROUTING;
use crate::orchestration::errors::OrchestrationResult;
use crate::orchestration::orchestrator::TransactionOrchestrator;
use crate::orchestration::service_bits::ServiceBits;
use crate::transaction::{Transaction, TrxContext};

/// Dispatch-path trace requested via the `TO_ROUTING` diagnostic parameter.
/// Collects one line per considered service and flushes to the diagnostic
/// collector at the end of the invocation loop, early failure included.
struct DispatchTrace {
    enabled: bool,
    lines: Vec<String>,
}

impl DispatchTrace {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Vec::new(),
        }
    }

    fn invoked(&mut self, bit: ServiceBits, latency: Duration) {
        if self.enabled {
            self.lines.push(format!(
                "INVOKED  {} ({}ms)",
                bit.slot_name(),
                latency.as_millis()
            ));
        }
    }

    fn skipped(&mut self, bit: ServiceBits) {
        if self.enabled {
            self.lines.push(format!("SKIPPED  {}", bit.slot_name()));
        }
    }

    fn unresolved(&mut self, bit: ServiceBits) {
        if self.enabled {
            self.lines
                .push(format!("UNRESOLVED  {}", bit.slot_name()));
        }
    }

    fn flush(self, context: &mut TrxContext) {
        if !self.enabled {
            return;
        }
        for line in &self.lines {
            debug!(trx_id = %context.trx_id, trace = %line, "Dispatch trace");
            context.diagnostic.insert_diag_msg(line);
        }
    }
}

impl TransactionOrchestrator {
    /// Invoke every service enabled in `bits`, in the canonical fixed order.
    ///
    /// Returns `Ok(false)` when a stage failed and the loop stopped early
    /// (or was tolerated to completion under continue-on-failure without
    /// ever failing overall); propagates service errors unchanged.
    pub async fn invoke_services(
        &self,
        trx: &mut Transaction,
        bits: ServiceBits,
    ) -> OrchestrationResult<bool> {
        let continue_on_failure = bits.continue_on_failure();
        let mut trace = DispatchTrace::new(
            trx.context()
                .diagnostic
                .param(TO_ROUTING)
                .is_some(),
        );

        debug!(
            trx_id = %trx.context().trx_id,
            trx_kind = trx.kind().as_str(),
            bits = ?bits,
            continue_on_failure = continue_on_failure,
            "Invoking services"
        );

        if !continue_on_failure && !self.validate_service_pointers(bits) {
            trace.flush(trx.context_mut());
            return Ok(false);
        }

        for &bit in ServiceBits::CANONICAL_ORDER {
            if !bits.contains(bit) {
                trace.skipped(bit);
                continue;
            }

            if let Err(abort) = trx.context().check_abort() {
                trace.flush(trx.context_mut());
                return Err(abort);
            }

            let name = self.config.services.name_for(bit).to_string();
            let service = if name.is_empty() {
                None
            } else {
                self.registry.resolve(&name)
            };

            let Some(service) = service else {
                error!(
                    trx_id = %trx.context().trx_id,
                    slot = bit.slot_name(),
                    service = %name,
                    "Enabled service could not be resolved"
                );
                trace.unresolved(bit);
                if continue_on_failure {
                    continue;
                }
                trace.flush(trx.context_mut());
                return Ok(false);
            };

            trx.context_mut().current_service = Some(name.clone());
            let started = Instant::now();
            let result = service.process(trx).await;
            let latency = started.elapsed();
            trx.context_mut().current_service = None;

            self.metrics
                .record(bit.slot_name(), latency, matches!(result, Ok(true)));
            trace.invoked(bit, latency);

            match result {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        trx_id = %trx.context().trx_id,
                        slot = bit.slot_name(),
                        service = %name,
                        "Service reported failure"
                    );
                    if !continue_on_failure {
                        trace.flush(trx.context_mut());
                        return Ok(false);
                    }
                }
                Err(err) => {
                    trace.flush(trx.context_mut());
                    return Err(err);
                }
            }
        }

        trace.flush(trx.context_mut());
        Ok(true)
    }

    /// Upfront resolution check for every enabled service. Runs only when
    /// failures are fatal; with continue-on-failure the loop tolerates
    /// unresolvable names one by one.
    fn validate_service_pointers(&self, bits: ServiceBits) -> bool {
        for &bit in ServiceBits::CANONICAL_ORDER {
            if !bits.contains(bit) {
                continue;
            }
            let name = self.config.services.name_for(bit);
            if name.is_empty() || !self.registry.can_resolve(name) {
                error!(
                    slot = bit.slot_name(),
                    service = %name,
                    "Required service failed upfront pointer validation"
                );
                return false;
            }
        }
        true
    }
}
