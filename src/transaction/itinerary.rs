//! # Itinerary Data
//!
//! Travel segments, itineraries and fare paths as seen by the orchestrator.
//! The business services own the full fare-construction detail; the
//! orchestrator only needs carriers, directions and fare-path totals for the
//! split and merge decisions it makes itself.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of travel relative to the origin of the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
}

/// One flight segment of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelSegment {
    pub segment_order: u16,
    pub origin: String,
    pub destination: String,
    /// Carrier whose fares govern this segment's pricing.
    pub governing_carrier: String,
    pub direction: Direction,
}

impl TravelSegment {
    pub fn new(
        segment_order: u16,
        origin: impl Into<String>,
        destination: impl Into<String>,
        governing_carrier: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            segment_order,
            origin: origin.into(),
            destination: destination.into(),
            governing_carrier: governing_carrier.into(),
            direction,
        }
    }
}

/// An ordered collection of travel segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub segments: Vec<TravelSegment>,
}

impl Itinerary {
    pub fn new(segments: Vec<TravelSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distinct governing carriers in first-seen segment order.
    pub fn governing_carriers(&self) -> Vec<&str> {
        let mut carriers: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if !carriers.contains(&segment.governing_carrier.as_str()) {
                carriers.push(&segment.governing_carrier);
            }
        }
        carriers
    }

    /// Segments for one governing carrier, original order preserved.
    pub fn segments_for_carrier(&self, carrier: &str) -> Vec<TravelSegment> {
        self.segments
            .iter()
            .filter(|segment| segment.governing_carrier == carrier)
            .cloned()
            .collect()
    }

    /// Segments travelling in one direction, original order preserved.
    pub fn segments_for_direction(&self, direction: Direction) -> Vec<TravelSegment> {
        self.segments
            .iter()
            .filter(|segment| segment.direction == direction)
            .cloned()
            .collect()
    }
}

/// A priced fare path produced by the pricing service. Only the totals the
/// orchestrator compares across the CSO join are modeled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarePath {
    pub total_amount: Decimal,
    pub currency: String,
    pub validating_carrier: String,
}

impl FarePath {
    pub fn new(
        total_amount: Decimal,
        currency: impl Into<String>,
        validating_carrier: impl Into<String>,
    ) -> Self {
        Self {
            total_amount,
            currency: currency.into(),
            validating_carrier: validating_carrier.into(),
        }
    }
}
