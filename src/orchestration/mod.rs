//! # Orchestration Engine
//!
//! The transaction orchestration and service dispatch pipeline.
//!
//! ## Architecture
//!
//! The engine follows a **dispatch-based architecture** where:
//! - **The orchestrator owns control flow**: per-kind flows, bitmask
//!   selection, the fixed invocation order, fallback and redirection
//!   semantics, and the cancel-and-start-over task lifecycle
//! - **Services own domain logic**: named, pluggable processing stages
//!   resolved through the registry and invoked behind the [`Service`]
//!   contract
//! - **Data tables drive diagnostics**: the resolver maps diagnostic
//!   numbers to service subsets through an exception map and a
//!   priority-ordered range table
//!
//! ## Core Components
//!
//! - **TransactionOrchestrator**: main dispatch engine, one flow per
//!   transaction family
//! - **Diagnostic resolver**: pure function from diagnostic settings to the
//!   service bitmask
//! - **ServiceRegistry**: lazy, memoized name-to-instance resolution
//! - **ServiceMetrics**: per-service latency statistics sink
//! - **CSO task**: the background cancel-and-start-over pricing attempt
//!   with its typed outcome crossing the join

pub mod cso;
pub mod diagnostic_resolver;
pub mod errors;
pub mod invoker;
pub mod metrics;
pub mod orchestrator;
pub mod pricing_flow;
pub mod registry;
pub mod rex_flow;
pub mod service;
pub mod service_bits;
pub mod snap;

pub use cso::{CsoOutcome, CsoTask};
pub use diagnostic_resolver::{resolve_service_bits, shopping_bits, ResolverFlags};
pub use errors::{ErrorCode, OrchestrationError, OrchestrationResult};
pub use metrics::{ServiceMetrics, ServiceStat};
pub use orchestrator::TransactionOrchestrator;
pub use registry::{RegistryStats, ServiceLoader, ServiceRegistry, StaticServiceLoader};
pub use service::Service;
pub use service_bits::ServiceBits;
pub use snap::{split_by_direction, split_by_governing_carrier};
