//! # ATSE Core
//!
//! High-performance Rust core for airline pricing transaction orchestration.
//!
//! ## Overview
//!
//! ATSE Core implements the transaction orchestration and service dispatch
//! pipeline of a fare/tax/mileage pricing engine. An inbound transaction
//! (pricing, alternate pricing, exchange/reissue, shopping, mileage, fare
//! display, tax) enters [`orchestration::TransactionOrchestrator::process`];
//! the orchestrator computes a service bitmask from the transaction's
//! diagnostic settings, then drives every enabled service in a fixed,
//! pre-defined order, handling per-service failure, diagnostic-only short
//! paths and the multi-phase exchange flows.
//!
//! ## Architecture
//!
//! The orchestrator follows a **dispatch-based architecture** where:
//! - **The orchestrator owns control flow**: bitmask selection, ordering,
//!   fallback and redirection decisions, and the cancel-and-start-over
//!   background task lifecycle
//! - **Services own domain logic**: fare collection, validation, pricing,
//!   taxes and the other business-rule stages run behind the
//!   [`orchestration::Service`] contract and mutate the transaction in place
//! - **Data tables drive diagnostics**: priority-ordered range records plus
//!   an explicit exception map select the minimal service subset for a
//!   requested diagnostic
//!
//! ## Module Organization
//!
//! - [`transaction`] - Transaction model shared by all request kinds
//! - [`orchestration`] - Dispatch pipeline, resolver, registry and flows
//! - [`config`] - Configuration management
//! - [`constants`] - Diagnostic numbers, ranges and parameter keys
//! - [`error`] - Top-level error handling
//! - [`logging`] - Structured logging bootstrap

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod orchestration;
pub mod transaction;

pub use config::{OrchestratorConfig, PolicyConfig, ServiceNames};
pub use error::{AtseError, Result};
pub use orchestration::{
    OrchestrationError, OrchestrationResult, Service, ServiceBits, ServiceRegistry,
    TransactionOrchestrator,
};
pub use transaction::{Transaction, TrxContext, TrxKind};
