//! # Reissue/Exchange Flow
//!
//! The multi-phase voluntary reissue protocol: the itinerary is analysed,
//! the flow branches on the diagnostic qualifier, the existing (exchange)
//! itinerary is repriced with the cancel-and-start-over background attempt
//! conditionally alongside, and the new itinerary is priced last, with
//! redirect semantics into exchange processing when a secondary request
//! exists.
//!
//! Whatever branch is taken, a launched background CSO task is joined
//! before the flow returns; its outcome fields are terminal at return.

use tracing::{debug, info, warn};

use crate::constants::diag_params::DISPLAY_SOLUTION;
use crate::constants::system::NEW_ITIN_DIAG_MARKER;
use crate::orchestration::cso::CsoTask;
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};
use crate::orchestration::orchestrator::TransactionOrchestrator;
use crate::orchestration::service_bits::ServiceBits;
use crate::transaction::{DiagQualifier, ExchangePricingTrx, RexPhase, Transaction};

/// Exchange-itinerary repricing chain.
const REX_EXC_ITIN_BITS: ServiceBits = ServiceBits::FARE_COLLECTOR
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::REX_FARE_SELECTOR)
    .union(ServiceBits::PRICING);

/// New-itinerary pricing chain.
const REX_NEW_ITIN_BITS: ServiceBits = ServiceBits::FARE_COLLECTOR
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::PRICING)
    .union(ServiceBits::TAXES)
    .union(ServiceBits::FARE_CALC);

fn set_phase(trx: &mut Transaction, phase: RexPhase) {
    if let Some(rex) = trx.as_rex_mut() {
        debug!(trx_id = %rex.context.trx_id, phase = ?phase, "Reissue phase transition");
        rex.phase = phase;
    }
}

fn has_secondary_request(trx: &Transaction) -> bool {
    trx.as_rex()
        .map(|rex| rex.secondary_request.is_some())
        .unwrap_or(false)
}

/// Swap the new itinerary into the shared context for the new-itinerary
/// phase; calling it again swaps the exchange itinerary back.
fn swap_new_itin(trx: &mut Transaction) {
    if let Some(rex) = trx.as_rex_mut() {
        std::mem::swap(&mut rex.context.itin, &mut rex.new_itin);
    }
}

impl TransactionOrchestrator {
    /// Voluntary reissue/exchange entry point.
    pub(crate) async fn process_rex(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let qualifier = trx.as_rex().map(|rex| rex.diag_qualifier()).ok_or_else(|| {
            OrchestrationError::configuration("reissue flow on non-reissue transaction")
        })?;

        // The itinerary analysis always runs on the base transaction before
        // any branch.
        if !self
            .invoke_services(trx, ServiceBits::ITIN_ANALYZER)
            .await?
        {
            return Ok(false);
        }

        match qualifier {
            DiagQualifier::None => self.rex_main_process(trx).await,
            DiagQualifier::ItExc => self.rex_exc_itin_phase(trx).await,
            DiagQualifier::ItAll => self.rex_both_phases(trx, true).await,
            DiagQualifier::ItNew => self.rex_both_phases(trx, false).await,
            DiagQualifier::ItUfl => self.rex_ufl_diagnostic(trx).await,
            DiagQualifier::ItEft => self.rex_eft_redirect(trx).await,
        }
    }

    /// The full reissue main process: exchange-itinerary phase with the
    /// background CSO attempt alongside, then the new-itinerary phase. The
    /// CSO task is joined before returning no matter which path ran, and a
    /// recorded reissue error is rethrown unless the rebooked solution
    /// validated.
    async fn rex_main_process(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        // The CSO sub-transaction must exist before the main path starts
        // mutating the state it was snapshotted from.
        let mut cso_task = if self.cso_applicable(trx) {
            Some(self.spawn_cso(trx))
        } else {
            None
        };

        let result = self.rex_main_phases(trx, &mut cso_task).await;

        if let Some(task) = cso_task.take() {
            self.join_cso(trx, task).await;
        }

        let pending_error = trx.as_rex_mut().and_then(|rex| {
            if rex.rebooked_solution_valid {
                rex.reissue_error = None;
                None
            } else {
                rex.take_reissue_error()
            }
        });
        if let Some((code, message)) = pending_error {
            return Err(OrchestrationError::BusinessRule { code, message });
        }

        result
    }

    async fn rex_main_phases(
        &self,
        trx: &mut Transaction,
        cso_task: &mut Option<CsoTask>,
    ) -> OrchestrationResult<bool> {
        if !self.rex_exc_itin_phase(trx).await? {
            return Ok(false);
        }

        match self.rex_new_itin_phase(trx).await {
            Ok(rc) => {
                if let Some(rex) = trx.as_rex_mut() {
                    rex.rebooked_solution_valid = rc;
                }
                Ok(rc)
            }
            Err(err)
                if err.error_code().triggers_redirect() && has_secondary_request(trx) =>
            {
                let code = err.error_code();
                let message = err.message();
                if let Some(rex) = trx.as_rex_mut() {
                    rex.record_reissue_error(code, message);
                }

                let exchange_redirect = trx
                    .as_rex()
                    .and_then(|rex| rex.secondary_request.as_ref())
                    .map(|secondary| secondary.is_exchange_redirect())
                    .unwrap_or(false);

                if exchange_redirect {
                    info!(
                        trx_id = %trx.context().trx_id,
                        code = ?code,
                        "Redirecting reissue into exchange processing"
                    );
                    let rc = self.process_exchange_redirect(trx).await?;
                    if rc {
                        if let Some(rex) = trx.as_rex_mut() {
                            rex.rebooked_solution_valid = true;
                        }
                    }
                    Ok(rc)
                } else {
                    // Continue on the cancel-and-start-over path; make sure
                    // the background attempt is actually running.
                    if cso_task.is_none() && self.config.policy.cso_enabled {
                        info!(
                            trx_id = %trx.context().trx_id,
                            "Secondary request discovered mid-flow, launching CSO attempt"
                        );
                        *cso_task = Some(self.spawn_cso(trx));
                    }
                    Ok(false)
                }
            }
            Err(err) => {
                // Recorded for the post-join check instead of thrown while a
                // background task may still be running.
                let code = err.error_code();
                let message = err.message();
                warn!(
                    trx_id = %trx.context().trx_id,
                    code = ?code,
                    "New-itinerary phase failed, recording reissue error"
                );
                if let Some(rex) = trx.as_rex_mut() {
                    rex.record_reissue_error(code, message);
                }
                Ok(false)
            }
        }
    }

    /// Reprice the existing (exchange) itinerary.
    async fn rex_exc_itin_phase(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        set_phase(trx, RexPhase::RepriceExcItin);
        self.invoke_services(trx, REX_EXC_ITIN_BITS).await
    }

    /// Match reissue rules against the priced exchange itinerary, then price
    /// the new itinerary with it swapped into the shared context.
    async fn rex_new_itin_phase(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        set_phase(trx, RexPhase::MatchExcRule);
        if !self
            .invoke_services(trx, ServiceBits::REX_FARE_SELECTOR)
            .await?
        {
            return Ok(false);
        }

        set_phase(trx, RexPhase::PriceNewItin);
        swap_new_itin(trx);
        let result = self.invoke_services(trx, REX_NEW_ITIN_BITS).await;
        swap_new_itin(trx);
        result
    }

    /// Diagnostics over both itinerary phases. When `collect_exc_diag` is
    /// false only the new-itinerary phase contributes diagnostic output.
    async fn rex_both_phases(
        &self,
        trx: &mut Transaction,
        collect_exc_diag: bool,
    ) -> OrchestrationResult<bool> {
        if !collect_exc_diag {
            trx.context_mut().diagnostic.deactivate();
        }
        let exc_result = self.rex_exc_itin_phase(trx).await;
        if !collect_exc_diag {
            trx.context_mut().diagnostic.activate();
        }
        if !exc_result? {
            return Ok(false);
        }

        trx.context_mut()
            .diagnostic
            .insert_diag_msg(NEW_ITIN_DIAG_MARKER);
        self.rex_new_itin_phase(trx).await
    }

    /// Cancel-and-start-over diagnostic: optionally reprice the exchange
    /// itinerary first (selected errors swallowed), then force the CSO
    /// sub-transaction and run it synchronously in diagnostic mode.
    async fn rex_ufl_diagnostic(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        if trx.context().diagnostic.param(DISPLAY_SOLUTION).is_some() {
            match self.rex_exc_itin_phase(trx).await {
                Ok(_) => {}
                Err(err)
                    if err.error_code().triggers_redirect() && has_secondary_request(trx) =>
                {
                    // Redirection is enforced elsewhere; the UFL-specific
                    // reprocessing must not run.
                    debug!(
                        trx_id = %trx.context().trx_id,
                        code = ?err.error_code(),
                        "Redirection enforced during UFL exchange phase, leaving branch"
                    );
                    return Ok(false);
                }
                Err(err) if err.error_code().is_no_fares_class() => {
                    debug!(
                        trx_id = %trx.context().trx_id,
                        code = ?err.error_code(),
                        "Swallowing exchange-phase failure on UFL diagnostic"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        self.run_cso_diagnostic(trx).await
    }

    /// Fast-track redirect diagnostic; only applicable with a secondary
    /// request.
    async fn rex_eft_redirect(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        if !has_secondary_request(trx) {
            return Err(OrchestrationError::NoDiagnosticToDisplay {
                diagnostic: trx.context().diagnostic.diagnostic_type(),
            });
        }

        match self.rex_exc_itin_phase(trx).await {
            Err(err) if err.error_code().triggers_redirect() => {
                info!(
                    trx_id = %trx.context().trx_id,
                    code = ?err.error_code(),
                    "Redirecting fast-track diagnostic into exchange processing"
                );
                self.process_exchange_redirect(trx).await
            }
            other => other,
        }
    }

    /// Redirect into the exchange-pricing sub-flow: a derived exchange
    /// transaction is processed and its results copied back.
    async fn process_exchange_redirect(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let mut context = trx.context().clone();
        context.response.clear();
        context.fare_paths.clear();

        let mut exchange = ExchangePricingTrx::new(context);
        exchange.redirected_from_rex = true;
        let mut exchange_trx = Transaction::ExchangePricing(exchange);

        let rc = self.process_exchange_pricing(&mut exchange_trx).await?;

        let exchange_context = exchange_trx.context();
        let context = trx.context_mut();
        context.response = exchange_context.response.clone();
        context.fare_paths = exchange_context.fare_paths.clone();
        Ok(rc)
    }
}
