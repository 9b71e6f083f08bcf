//! # Shared Transaction Context
//!
//! The state every transaction kind carries: identifiers, diagnostic
//! settings, itinerary data, the response buffer written by downstream
//! services, and the cooperative abort state checked at service boundaries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::diagnostic::Diagnostic;
use super::itinerary::{FarePath, Itinerary};
use crate::orchestration::errors::{OrchestrationError, OrchestrationResult};

/// Mutable context shared by all transaction kinds. The orchestrator and
/// every service operate on this in place; there is no locking, and at most
/// one thread touches a given context at a time.
#[derive(Debug, Clone)]
pub struct TrxContext {
    pub trx_id: Uuid,
    pub diagnostic: Diagnostic,
    pub itin: Itinerary,
    /// Response content accumulated by downstream services.
    pub response: String,
    /// Fare paths produced by the pricing stage.
    pub fare_paths: Vec<FarePath>,
    /// Service currently processing this transaction, for attribution.
    pub current_service: Option<String>,
    pub created_at: DateTime<Utc>,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl TrxContext {
    pub fn new(itin: Itinerary) -> Self {
        Self {
            trx_id: Uuid::new_v4(),
            diagnostic: Diagnostic::none(),
            itin,
            response: String::new(),
            fare_paths: Vec::new(),
            current_service: None,
            created_at: Utc::now(),
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostic = diagnostic;
        self
    }

    /// Arm the transaction-wide deadline. Checked cooperatively at service
    /// boundaries, never preemptively.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Handle the hosting layer uses to cancel this transaction externally.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Propagate this transaction's abort state into a derived context, so
    /// cancelling the primary also cancels work running on its behalf.
    pub fn share_abort_state(&self, mut derived: TrxContext) -> TrxContext {
        derived.cancelled = Arc::clone(&self.cancelled);
        derived.deadline = self.deadline;
        derived
    }

    /// Cooperative abort check performed before each service invocation.
    pub fn check_abort(&self) -> OrchestrationResult<()> {
        if self.is_cancelled() {
            return Err(OrchestrationError::TransactionAborted {
                trx_id: self.trx_id,
                reason: "cancelled externally".to_string(),
            });
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(OrchestrationError::TransactionAborted {
                    trx_id: self.trx_id,
                    reason: "deadline exceeded".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn append_response(&mut self, text: &str) {
        self.response.push_str(text);
    }

    /// Lowest-total fare path priced so far, if any.
    pub fn lowest_fare_path(&self) -> Option<&FarePath> {
        self.fare_paths
            .iter()
            .min_by(|a, b| a.total_amount.cmp(&b.total_amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::time::Duration;

    #[test]
    fn abort_check_passes_without_deadline_or_cancel() {
        let ctx = TrxContext::new(Itinerary::default());
        assert!(ctx.check_abort().is_ok());
    }

    #[test]
    fn abort_check_trips_on_cancel() {
        let ctx = TrxContext::new(Itinerary::default());
        ctx.cancel_handle().store(true, Ordering::Relaxed);
        assert!(matches!(
            ctx.check_abort(),
            Err(OrchestrationError::TransactionAborted { .. })
        ));
    }

    #[test]
    fn abort_check_trips_on_expired_deadline() {
        let mut ctx = TrxContext::new(Itinerary::default());
        ctx.set_deadline(Instant::now() - Duration::from_millis(1));
        assert!(ctx.check_abort().is_err());
    }

    #[test]
    fn lowest_fare_path_picks_minimum_total() {
        let mut ctx = TrxContext::new(Itinerary::default());
        ctx.fare_paths
            .push(FarePath::new(Decimal::new(35000, 2), "USD", "AA"));
        ctx.fare_paths
            .push(FarePath::new(Decimal::new(29900, 2), "USD", "UA"));
        assert_eq!(
            ctx.lowest_fare_path().unwrap().total_amount,
            Decimal::new(29900, 2)
        );
    }
}
