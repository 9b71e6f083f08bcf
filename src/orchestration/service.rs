//! # Service Contract
//!
//! The polymorphic unit of work invoked by the orchestrator. Services are
//! named, stateless between calls, and mutate the transaction in place.
//! Business-rule content (fare collection, tax application, routing text,
//! branded fares, mileage routes) lives entirely behind this contract.

use async_trait::async_trait;

use crate::orchestration::errors::OrchestrationResult;
use crate::transaction::Transaction;

/// One named processing stage of the dispatch pipeline.
///
/// `Ok(true)` means proceed to the next stage; `Ok(false)` means the stage
/// failed and the caller decides whether to abort or continue based on the
/// continue-on-failure modifier. `Err` signals an unrecoverable domain
/// condition that must propagate past the orchestrator, unless a flow
/// classifies its code as recoverable or redirecting.
///
/// A service only inspects the transaction variants it understands;
/// unsupported variants are not its concern because the orchestrator only
/// dispatches services compatible with the current flow.
#[async_trait]
pub trait Service: Send + Sync {
    /// Configured name of this service instance.
    fn name(&self) -> &str;

    /// Perform one unit of domain processing over the transaction.
    async fn process(&self, trx: &mut Transaction) -> OrchestrationResult<bool>;

    /// Number of worker threads currently processing on behalf of this
    /// service. Observability only; never used for correctness.
    fn active_threads(&self) -> u32 {
        0
    }
}
