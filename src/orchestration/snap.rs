//! # Split-Itinerary Pricing
//!
//! The WN-SNAP mode: a multi-carrier MIP itinerary is split into at most
//! two sub-itineraries by governing carrier and each is priced through the
//! full service chain independently, the sub-itinerary swapped into the
//! shared context around each sub-invocation. Afterwards the itinerary is
//! split again by direction and the fare calculation runs once per
//! direction.
//!
//! Sub-itineraries are never processed concurrently with each other: the
//! context holds exactly one itinerary at a time.

use tracing::{debug, error};

use crate::constants::system::MAX_SNAP_CARRIERS;
use crate::orchestration::errors::OrchestrationResult;
use crate::orchestration::orchestrator::TransactionOrchestrator;
use crate::orchestration::service_bits::ServiceBits;
use crate::transaction::{Direction, Itinerary, Transaction};

/// Split an itinerary into per-governing-carrier sub-itineraries, at most
/// [`MAX_SNAP_CARRIERS`]. Segments of additional carriers are dropped with
/// an error log; this is data repair, not a failure.
pub fn split_by_governing_carrier(itin: &Itinerary) -> Vec<Itinerary> {
    let carriers = itin.governing_carriers();

    if carriers.len() > MAX_SNAP_CARRIERS {
        for dropped in &carriers[MAX_SNAP_CARRIERS..] {
            error!(
                carrier = %dropped,
                max_carriers = MAX_SNAP_CARRIERS,
                "Too many governing carriers on split itinerary, dropping segments"
            );
        }
    }

    carriers
        .into_iter()
        .take(MAX_SNAP_CARRIERS)
        .map(|carrier| Itinerary::new(itin.segments_for_carrier(carrier)))
        .collect()
}

/// Split an itinerary by direction of travel; empty halves are omitted.
pub fn split_by_direction(itin: &Itinerary) -> Vec<Itinerary> {
    [Direction::Outbound, Direction::Inbound]
        .into_iter()
        .map(|direction| Itinerary::new(itin.segments_for_direction(direction)))
        .filter(|half| !half.is_empty())
        .collect()
}

impl TransactionOrchestrator {
    /// Price a split-request MIP transaction: full chain per governing
    /// carrier, then fare calculation per direction.
    pub(crate) async fn process_snap(&self, trx: &mut Transaction) -> OrchestrationResult<bool> {
        let bits = self.pricing_service_bits(trx)?;
        let full_itin = trx.context().itin.clone();

        for sub_itin in split_by_governing_carrier(&full_itin) {
            debug!(
                trx_id = %trx.context().trx_id,
                carrier = %sub_itin.segments[0].governing_carrier,
                segments = sub_itin.segments.len(),
                "Pricing carrier sub-itinerary"
            );
            if !self.invoke_on_sub_itin(trx, sub_itin, &full_itin, bits).await? {
                return Ok(false);
            }
        }

        for half in split_by_direction(&full_itin) {
            if !self
                .invoke_on_sub_itin(trx, half, &full_itin, ServiceBits::FARE_CALC)
                .await?
            {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Swap a sub-itinerary into the context, run the chain, and restore the
    /// full itinerary whatever the outcome.
    async fn invoke_on_sub_itin(
        &self,
        trx: &mut Transaction,
        sub_itin: Itinerary,
        full_itin: &Itinerary,
        bits: ServiceBits,
    ) -> OrchestrationResult<bool> {
        trx.context_mut().itin = sub_itin;
        let result = self.invoke_services(trx, bits).await;
        trx.context_mut().itin = full_itin.clone();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TravelSegment;

    fn segment(order: u16, carrier: &str, direction: Direction) -> TravelSegment {
        TravelSegment::new(order, "AAA", "BBB", carrier, direction)
    }

    #[test]
    fn two_carrier_split_covers_every_segment() {
        let itin = Itinerary::new(vec![
            segment(1, "AA", Direction::Outbound),
            segment(2, "WN", Direction::Outbound),
            segment(3, "AA", Direction::Inbound),
        ]);

        let subs = split_by_governing_carrier(&itin);
        assert_eq!(subs.len(), 2);
        assert!(subs.iter().all(|sub| !sub.is_empty()));

        let mut recombined: Vec<TravelSegment> = subs
            .into_iter()
            .flat_map(|sub| sub.segments)
            .collect();
        recombined.sort_by_key(|seg| seg.segment_order);
        assert_eq!(recombined, itin.segments);
    }

    #[test]
    fn third_carrier_segments_are_dropped_not_fatal() {
        let itin = Itinerary::new(vec![
            segment(1, "AA", Direction::Outbound),
            segment(2, "WN", Direction::Outbound),
            segment(3, "DL", Direction::Inbound),
        ]);

        let subs = split_by_governing_carrier(&itin);
        assert_eq!(subs.len(), 2);
        let carriers: Vec<&str> = subs
            .iter()
            .map(|sub| sub.segments[0].governing_carrier.as_str())
            .collect();
        assert_eq!(carriers, vec!["AA", "WN"]);
    }

    #[test]
    fn direction_split_omits_empty_halves() {
        let one_way = Itinerary::new(vec![
            segment(1, "AA", Direction::Outbound),
            segment(2, "AA", Direction::Outbound),
        ]);
        let halves = split_by_direction(&one_way);
        assert_eq!(halves.len(), 1);
        assert_eq!(halves[0].segments.len(), 2);
    }
}
