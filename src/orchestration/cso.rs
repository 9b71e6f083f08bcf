//! # Cancel-and-Start-Over Task
//!
//! The bounded background unit of work run alongside the reissue main flow:
//! a derived pricing transaction priced from scratch over the new itinerary.
//! The task communicates its result through its join handle as a typed
//! outcome value; errors are captured into the outcome, never thrown across
//! the join boundary.
//!
//! The task must be created and started BEFORE the main-path itinerary
//! processing begins: the derived transaction snapshots shared state the
//! main path is about to mutate.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::OrchestratorConfig;
use crate::orchestration::errors::{ErrorCode, OrchestrationResult};
use crate::orchestration::metrics::ServiceMetrics;
use crate::orchestration::orchestrator::TransactionOrchestrator;
use crate::orchestration::registry::ServiceRegistry;
use crate::orchestration::service_bits::ServiceBits;
use crate::transaction::{CsoStatus, FarePath, PricingTrx, Transaction, TrxContext};

/// Statistics key for the join-point latency.
const CSO_JOIN_STAT: &str = "cso_join";

/// Service chain for the cancel-and-start-over pricing attempt.
const CSO_BITS: ServiceBits = ServiceBits::ITIN_ANALYZER
    .union(ServiceBits::FARE_COLLECTOR)
    .union(ServiceBits::FARE_VALIDATOR)
    .union(ServiceBits::PRICING)
    .union(ServiceBits::TAXES)
    .union(ServiceBits::FARE_CALC);

/// Result of the background pricing attempt, observed strictly after the
/// join.
#[derive(Debug, Clone)]
pub struct CsoOutcome {
    pub successful: bool,
    pub lowest_fare_path: Option<FarePath>,
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
    /// Diagnostic text collected by the synchronous diagnostic-mode run.
    pub response: String,
}

impl CsoOutcome {
    fn failed(error_code: Option<ErrorCode>, error_message: impl Into<String>) -> Self {
        Self {
            successful: false,
            lowest_fare_path: None,
            error_code,
            error_message: Some(error_message.into()),
            response: String::new(),
        }
    }
}

/// Handle on a launched background CSO attempt.
pub struct CsoTask {
    handle: JoinHandle<CsoOutcome>,
}

impl CsoTask {
    /// Wait for the background attempt, measuring the join latency. A
    /// panicked or cancelled task becomes a failed outcome.
    pub async fn join(self, metrics: &ServiceMetrics) -> CsoOutcome {
        let started = Instant::now();
        let outcome = match self.handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => {
                error!(error = %join_err, "CSO background task died before the join");
                CsoOutcome::failed(None, format!("background task failure: {join_err}"))
            }
        };
        metrics.record(CSO_JOIN_STAT, started.elapsed(), outcome.successful);
        outcome
    }
}

/// Everything the background attempt needs, detached from the borrowed
/// primary transaction.
struct CsoRunner {
    config: OrchestratorConfig,
    registry: Arc<ServiceRegistry>,
    metrics: Arc<ServiceMetrics>,
}

impl CsoRunner {
    async fn run(self, mut trx: Transaction) -> CsoOutcome {
        let orchestrator = TransactionOrchestrator {
            config: self.config,
            registry: self.registry,
            metrics: self.metrics,
        };

        match orchestrator.invoke_services(&mut trx, CSO_BITS).await {
            Ok(true) => {
                let context = trx.context();
                CsoOutcome {
                    successful: true,
                    lowest_fare_path: context.lowest_fare_path().cloned(),
                    error_code: None,
                    error_message: None,
                    response: context.response.clone(),
                }
            }
            Ok(false) => CsoOutcome::failed(None, "cancel-and-start-over pricing did not complete"),
            Err(err) => CsoOutcome::failed(Some(err.error_code()), err.message()),
        }
    }
}

impl TransactionOrchestrator {
    /// Whether the CSO attempt applies to this reissue transaction:
    /// enabled by policy, and either no secondary request exists or its
    /// action code still permits the attempt.
    pub(crate) fn cso_applicable(&self, trx: &Transaction) -> bool {
        if !self.config.policy.cso_enabled {
            return false;
        }
        match trx.as_rex().and_then(|rex| rex.secondary_request.as_ref()) {
            None => true,
            Some(secondary) => secondary.permits_cso(),
        }
    }

    /// Derive the pricing transaction the CSO attempt runs over: the new
    /// itinerary priced from scratch, with a fresh response buffer and no
    /// diagnostic unless the caller arms one.
    pub(crate) fn derive_cso_trx(&self, trx: &Transaction) -> Transaction {
        let (new_itin, deadline_ctx) = match trx.as_rex() {
            Some(rex) => (rex.new_itin.clone(), &rex.context),
            None => (trx.context().itin.clone(), trx.context()),
        };

        let mut context = TrxContext::new(new_itin);
        // The derived transaction shares the primary's abort state: a
        // cancelled primary cancels the background attempt too.
        context = deadline_ctx.share_abort_state(context);
        Transaction::Pricing(PricingTrx::new(context))
    }

    /// Launch the background CSO attempt. Marks the primary transaction's
    /// CSO state pending; the state reaches a terminal value only through
    /// [`TransactionOrchestrator::join_cso`].
    pub(crate) fn spawn_cso(&self, trx: &mut Transaction) -> CsoTask {
        let derived = self.derive_cso_trx(trx);
        info!(
            trx_id = %trx.context().trx_id,
            cso_trx_id = %derived.context().trx_id,
            "Launching cancel-and-start-over background task"
        );

        if let Some(rex) = trx.as_rex_mut() {
            rex.cso.status = CsoStatus::Pending;
        }

        let runner = CsoRunner {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
        };
        CsoTask {
            handle: tokio::spawn(runner.run(derived)),
        }
    }

    /// Join the background attempt and merge its outcome into the primary
    /// transaction. The CSO fields are in a terminal state afterwards.
    pub(crate) async fn join_cso(&self, trx: &mut Transaction, task: CsoTask) {
        let outcome = task.join(&self.metrics).await;
        debug!(
            trx_id = %trx.context().trx_id,
            successful = outcome.successful,
            "Joined cancel-and-start-over task"
        );
        apply_cso_outcome(trx, outcome);
    }

    /// Synchronous CSO run for the cancel-and-start-over diagnostic: the
    /// derived transaction is processed inline with the requested diagnostic
    /// armed, and its diagnostic output lands in the primary response.
    pub(crate) async fn run_cso_diagnostic(
        &self,
        trx: &mut Transaction,
    ) -> OrchestrationResult<bool> {
        let mut derived = self.derive_cso_trx(trx);
        derived.context_mut().diagnostic = trx.context().diagnostic.clone();

        let result = self.invoke_services(&mut derived, CSO_BITS).await;

        let outcome = match &result {
            Ok(true) => CsoOutcome {
                successful: true,
                lowest_fare_path: derived.context().lowest_fare_path().cloned(),
                error_code: None,
                error_message: None,
                response: derived.context().response.clone(),
            },
            Ok(false) => {
                CsoOutcome::failed(None, "cancel-and-start-over pricing did not complete")
            }
            Err(err) => CsoOutcome::failed(Some(err.error_code()), err.message()),
        };

        let diag_buffer = derived.context().diagnostic.buffer().to_string();
        trx.context_mut().append_response(&outcome.response);
        for line in diag_buffer.lines() {
            trx.context_mut().diagnostic.insert_diag_msg(line);
        }
        apply_cso_outcome(trx, outcome);
        result
    }
}

/// Copy a terminal outcome into the primary transaction's CSO fields.
pub(crate) fn apply_cso_outcome(trx: &mut Transaction, outcome: CsoOutcome) {
    if let Some(rex) = trx.as_rex_mut() {
        rex.cso.status = if outcome.successful {
            CsoStatus::Succeeded
        } else {
            CsoStatus::Failed
        };
        rex.cso.lowest_fare_path = outcome.lowest_fare_path;
        rex.cso.error_code = outcome.error_code;
        rex.cso.error_message = outcome.error_message;
    }
}
