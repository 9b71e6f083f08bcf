//! Shared test harness: an orchestrator wired to mock services that record
//! their invocation order and run configurable behaviors.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use atse_core::config::OrchestratorConfig;
use atse_core::orchestration::{
    OrchestrationResult, Service, ServiceBits, ServiceRegistry, TransactionOrchestrator,
};
use atse_core::transaction::{
    Direction, Itinerary, PricingTrx, Transaction, TravelSegment, TrxContext,
};

/// Synchronous behavior a mock service runs when invoked.
pub type ServiceBehavior =
    Arc<dyn Fn(&mut Transaction) -> OrchestrationResult<bool> + Send + Sync>;

/// Mock service recording each invocation under its slot name.
pub struct MockService {
    slot: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    behavior: ServiceBehavior,
}

#[async_trait]
impl Service for MockService {
    fn name(&self) -> &str {
        self.slot
    }

    async fn process(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        self.log.lock().push(self.slot);
        (self.behavior)(trx)
    }
}

/// Orchestrator over mock services plus the shared invocation log.
pub struct Harness {
    pub orchestrator: TransactionOrchestrator,
    pub log: Arc<Mutex<Vec<&'static str>>>,
}

impl Harness {
    pub fn invocations(&self) -> Vec<&'static str> {
        self.log.lock().clone()
    }

    pub fn count(&self, slot: &str) -> usize {
        self.log.lock().iter().filter(|s| **s == slot).count()
    }
}

pub fn succeed() -> ServiceBehavior {
    Arc::new(|_| Ok(true))
}

/// Build a harness with every slot registered; `overrides` replaces the
/// default always-succeed behavior per slot name, `config` tweaks policy.
pub fn harness_with(
    config: OrchestratorConfig,
    overrides: HashMap<&'static str, ServiceBehavior>,
) -> Harness {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut services: HashMap<String, Arc<dyn Service>> = HashMap::new();

    for bit in ServiceBits::CANONICAL_ORDER {
        let slot = bit.slot_name();
        let name = config.services.name_for(*bit).to_string();
        let behavior = overrides.get(slot).cloned().unwrap_or_else(succeed);
        services.insert(
            name,
            Arc::new(MockService {
                slot,
                log: Arc::clone(&log),
                behavior,
            }),
        );
    }

    let registry = Arc::new(ServiceRegistry::with_services(services));
    Harness {
        orchestrator: TransactionOrchestrator::new(config, registry),
        log,
    }
}

pub fn harness(overrides: HashMap<&'static str, ServiceBehavior>) -> Harness {
    harness_with(OrchestratorConfig::for_testing(), overrides)
}

/// Two-carrier round trip used across the flow tests.
pub fn round_trip_itin() -> Itinerary {
    Itinerary::new(vec![
        TravelSegment::new(1, "DFW", "ORD", "AA", Direction::Outbound),
        TravelSegment::new(2, "ORD", "DFW", "AA", Direction::Inbound),
    ])
}

pub fn pricing_trx() -> Transaction {
    Transaction::Pricing(PricingTrx::new(TrxContext::new(round_trip_itin())))
}

/// Harness with some slots left unregistered, for resolution-failure tests.
pub fn harness_missing(missing_slots: &[&str]) -> Harness {
    let config = OrchestratorConfig::for_testing();
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut services: HashMap<String, Arc<dyn Service>> = HashMap::new();

    for bit in ServiceBits::CANONICAL_ORDER {
        let slot = bit.slot_name();
        if missing_slots.contains(&slot) {
            continue;
        }
        let name = config.services.name_for(*bit).to_string();
        services.insert(
            name,
            Arc::new(MockService {
                slot,
                log: Arc::clone(&log),
                behavior: succeed(),
            }),
        );
    }

    let registry = Arc::new(ServiceRegistry::with_services(services));
    Harness {
        orchestrator: TransactionOrchestrator::new(config, registry),
        log,
    }
}
