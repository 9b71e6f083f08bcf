//! # Orchestrator Configuration System
//!
//! Explicit, validated configuration for the dispatch pipeline. The
//! orchestrator receives one [`OrchestratorConfig`] value at construction,
//! holding the service-name table (one string per service slot) and the
//! policy flags the flows consult. There is no global mutable configuration
//! state.
//!
//! An empty service name is legal at load time: absence of a configured name
//! for a bit that is set is a resolution failure at invocation time, not at
//! startup.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::orchestration::service_bits::ServiceBits;

pub use loader::ConfigLoader;

/// Configured name for each service slot. Keys mirror the `TO_SVC`
/// configuration section of the hosting system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceNames {
    pub itin_analyzer: String,
    pub fare_collector: String,
    pub fare_selector: String,
    pub fare_validator: String,
    pub s8_brand: String,
    pub rex_fare_selector: String,
    pub pricing: String,
    pub service_fees: String,
    pub free_bag: String,
    pub taxes: String,
    pub ticketing_fees: String,
    pub fare_calc: String,
    pub currency: String,
    pub mileage: String,
    pub decode: String,
    pub internal: String,
    pub shopping: String,
    pub fare_display: String,
    pub ticketing_cxr: String,
    pub ticketing_cxr_display: String,
    pub tax_display: String,
    pub pfc_display: String,
    pub tax_info: String,
}

impl Default for ServiceNames {
    fn default() -> Self {
        Self {
            itin_analyzer: "ITIN_SVC".to_string(),
            fare_collector: "FARESC_SVC".to_string(),
            fare_selector: "FARE_SELECTOR_SVC".to_string(),
            fare_validator: "FARESV_SVC".to_string(),
            s8_brand: "S8_BRAND_SVC".to_string(),
            rex_fare_selector: "REX_FARE_SELECTOR_SVC".to_string(),
            pricing: "PRICING_SVC".to_string(),
            service_fees: "SERVICE_FEES_SVC".to_string(),
            free_bag: "FREE_BAG_SVC".to_string(),
            taxes: "TAX_SVC".to_string(),
            ticketing_fees: "TICKETING_FEES_SVC".to_string(),
            fare_calc: "FARE_CALC_SVC".to_string(),
            currency: "CURRENCY_SVC".to_string(),
            mileage: "MILEAGE_SVC".to_string(),
            decode: "DECODE_SVC".to_string(),
            internal: "INTERNAL_SVC".to_string(),
            shopping: "SHOPPING_SVC".to_string(),
            fare_display: "FARE_DISPLAY_SVC".to_string(),
            ticketing_cxr: "TICKETING_CXR_SVC".to_string(),
            ticketing_cxr_display: "TICKETING_CXR_DISPLAY_SVC".to_string(),
            tax_display: "TAX_DISPLAY_SVC".to_string(),
            pfc_display: "PFC_DISPLAY_SVC".to_string(),
            tax_info: "TAX_INFO_SVC".to_string(),
        }
    }
}

impl ServiceNames {
    /// Configured name for a single service bit. Returns an empty string
    /// for unconfigured slots, which fails resolution at invocation time.
    pub fn name_for(&self, bit: ServiceBits) -> &str {
        match bit.slot_name() {
            "itin_analyzer" => &self.itin_analyzer,
            "fare_collector" => &self.fare_collector,
            "fare_selector" => &self.fare_selector,
            "fare_validator" => &self.fare_validator,
            "s8_brand" => &self.s8_brand,
            "rex_fare_selector" => &self.rex_fare_selector,
            "pricing" => &self.pricing,
            "service_fees" => &self.service_fees,
            "free_bag" => &self.free_bag,
            "taxes" => &self.taxes,
            "ticketing_fees" => &self.ticketing_fees,
            "fare_calc" => &self.fare_calc,
            "currency" => &self.currency,
            "mileage" => &self.mileage,
            "decode" => &self.decode,
            "internal" => &self.internal,
            "shopping" => &self.shopping,
            "fare_display" => &self.fare_display,
            "ticketing_cxr" => &self.ticketing_cxr,
            "ticketing_cxr_display" => &self.ticketing_cxr_display,
            "tax_display" => &self.tax_display,
            "pfc_display" => &self.pfc_display,
            "tax_info" => &self.tax_info,
            _ => "",
        }
    }
}

/// Policy flags consulted by the orchestration flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Permit retrying a failed WP pricing as a WPA no-match transaction.
    pub wp_no_match_retry: bool,
    /// Booking-code-by-cabin (RBD) feature activation.
    pub rbd_by_cabin_active: bool,
    /// Permit launching the cancel-and-start-over background attempt.
    pub cso_enabled: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            wp_no_match_retry: true,
            rbd_by_cabin_active: true,
            cso_enabled: true,
        }
    }
}

/// Complete orchestrator configuration, constructed once and passed into
/// the orchestrator's constructor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub services: ServiceNames,
    pub policy: PolicyConfig,
}

impl OrchestratorConfig {
    /// Configuration for tests: default names, all policies enabled.
    pub fn for_testing() -> Self {
        Self::default()
    }

    /// Validation applied after loading. Service names may be empty (that
    /// is an invocation-time concern) but must not contain whitespace,
    /// which always indicates a mangled configuration file.
    pub fn validate(&self) -> Result<(), String> {
        for bit in ServiceBits::CANONICAL_ORDER {
            let name = self.services.name_for(*bit);
            if name.chars().any(char::is_whitespace) {
                return Err(format!(
                    "service name for slot '{}' contains whitespace: '{name}'",
                    bit.slot_name()
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_cover_every_slot() {
        let names = ServiceNames::default();
        for bit in ServiceBits::CANONICAL_ORDER {
            assert!(
                !names.name_for(*bit).is_empty(),
                "missing default name for {bit:?}"
            );
        }
    }

    #[test]
    fn validation_rejects_whitespace_names() {
        let mut config = OrchestratorConfig::default();
        config.services.pricing = "PRICING SVC".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_accepts_empty_names() {
        let mut config = OrchestratorConfig::default();
        config.services.free_bag = String::new();
        assert!(config.validate().is_ok());
    }
}
