//! # Diagnostic Settings
//!
//! Diagnostic state carried by a transaction: the requested diagnostic
//! number, its named string parameters, and the collector that accumulates
//! diagnostic text while active.
//!
//! The diagnostic number is immutable during orchestration except for two
//! documented adjustments: legacy-number remapping before range lookup and
//! the alternate-pricing offset remap applied on reprocess passes.

use std::collections::HashMap;

use crate::constants::diagnostics::{DIAG_NONE, LEGACY_REMAP};
use crate::constants::DiagnosticNumber;

/// Remap a legacy diagnostic number to its modern equivalent. Numbers
/// outside the legacy set pass through unchanged.
pub fn fix_legacy_diagnostic(number: DiagnosticNumber) -> DiagnosticNumber {
    LEGACY_REMAP
        .iter()
        .find(|(legacy, _)| *legacy == number)
        .map(|(_, modern)| *modern)
        .unwrap_or(number)
}

/// Diagnostic settings and collector for one transaction.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    diag_type: DiagnosticNumber,
    params: HashMap<String, String>,
    active: bool,
    buffer: String,
}

impl Default for Diagnostic {
    fn default() -> Self {
        Self::none()
    }
}

impl Diagnostic {
    /// No diagnostic requested.
    pub fn none() -> Self {
        Self {
            diag_type: DIAG_NONE,
            params: HashMap::new(),
            active: false,
            buffer: String::new(),
        }
    }

    pub fn new(diag_type: DiagnosticNumber) -> Self {
        Self {
            diag_type,
            params: HashMap::new(),
            active: diag_type != DIAG_NONE,
            buffer: String::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn diagnostic_type(&self) -> DiagnosticNumber {
        self.diag_type
    }

    /// Reassign the effective diagnostic number. Used by the reprocess flows
    /// that remap alternate-pricing diagnostics into the pricing range.
    pub fn set_diagnostic_type(&mut self, diag_type: DiagnosticNumber) {
        self.diag_type = diag_type;
    }

    pub fn is_none(&self) -> bool {
        self.diag_type == DIAG_NONE
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn param_is(&self, key: &str, value: &str) -> bool {
        self.param(key) == Some(value)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Whether the collector currently accepts diagnostic text. Some
    /// shopping diagnostics deactivate the collector around a sub-invocation
    /// so output from the wrong phase never reaches the response.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        if self.diag_type != DIAG_NONE {
            self.active = true;
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Append a line of diagnostic text. Dropped while the collector is
    /// inactive.
    pub fn insert_diag_msg(&mut self, msg: &str) {
        if self.active {
            self.buffer.push_str(msg);
            self.buffer.push('\n');
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}
