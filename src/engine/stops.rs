use chrono::Utc;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{DeliveryStop, Shipment, ShipmentEvent, ShipmentStatus, StopStatus};
use crate::policy;
use crate::state::EngineState;

use super::booking::{build_stop, StopInput};
use super::ManifestEngine;

/// Partial update for one stop. `None` leaves a field alone; the nested
/// options on `landmark`/`instructions` allow clearing them outright.
/// Sequence and ids are not patchable; ordering is owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct StopPatch {
    pub address: Option<String>,
    pub landmark: Option<Option<String>>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub payload_description: Option<String>,
    pub weight: Option<f64>,
    pub instructions: Option<Option<String>>,
    pub call_before_delivery: Option<bool>,
}

impl ManifestEngine {
    /// Append a new stop at the end of the run. The stop starts Pending
    /// with the next sequence number; the manifest total is recomputed.
    pub fn add_stop(&self, id: &str, input: StopInput) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, state| {
            guard_closed(shipment, state)?;
            if input.weight < 0.0 {
                return Err(EngineError::policy("stop weight must not be negative"));
            }
            let sequence = shipment.stops.len() as u32 + 1;
            shipment.stops.push(build_stop(&input, sequence));
            renumber(&mut shipment.stops);
            shipment.total_weight = policy::total_weight(&shipment.stops);
            Ok(())
        })?;
        debug!(shipment = %updated.id, stops = updated.stops.len(), "stop added");
        Ok(updated)
    }

    /// Remove one stop and close the gap in the sequence. A manifest
    /// keeps at least one stop.
    pub fn remove_stop(&self, id: &str, stop_id: &str) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, state| {
            guard_closed(shipment, state)?;
            if shipment.stop(stop_id).is_none() {
                return Err(EngineError::not_found("stop", stop_id));
            }
            if shipment.stops.len() == 1 {
                return Err(EngineError::MinimumStopViolation);
            }
            shipment.stops.retain(|stop| stop.id != stop_id);
            renumber(&mut shipment.stops);
            shipment.total_weight = policy::total_weight(&shipment.stops);
            Ok(())
        })?;
        debug!(shipment = %updated.id, stops = updated.stops.len(), "stop removed");
        Ok(updated)
    }

    /// Patch one stop's fields. A weight change re-derives the manifest
    /// total; other stops and the sequence are untouched.
    pub fn update_stop(&self, id: &str, stop_id: &str, patch: StopPatch) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, state| {
            guard_closed(shipment, state)?;
            if let Some(weight) = patch.weight {
                if weight < 0.0 {
                    return Err(EngineError::policy("stop weight must not be negative"));
                }
            }
            let stop = shipment
                .stop_mut(stop_id)
                .ok_or_else(|| EngineError::not_found("stop", stop_id))?;

            if let Some(address) = patch.address {
                stop.address = address;
            }
            if let Some(landmark) = patch.landmark {
                stop.landmark = landmark;
            }
            if let Some(contact_name) = patch.contact_name {
                stop.contact_name = contact_name;
            }
            if let Some(contact_phone) = patch.contact_phone {
                stop.contact_phone = contact_phone;
            }
            if let Some(payload_description) = patch.payload_description {
                stop.payload_description = payload_description;
            }
            if let Some(instructions) = patch.instructions {
                stop.instructions = instructions;
            }
            if let Some(call_before_delivery) = patch.call_before_delivery {
                stop.call_before_delivery = call_before_delivery;
            }
            if let Some(weight) = patch.weight {
                stop.weight = weight;
                shipment.total_weight = policy::total_weight(&shipment.stops);
            }
            Ok(())
        })?;
        debug!(shipment = %updated.id, stop = %stop_id, "stop updated");
        Ok(updated)
    }

    /// Advance one stop through Pending -> Out for Delivery -> Delivered.
    /// Strictly forward; delivery confirmation stamps the instant and the
    /// proof-of-delivery reference. When reconciliation is on, the parent
    /// status is re-derived from the stop set afterwards.
    pub fn set_stop_status(
        &self,
        id: &str,
        stop_id: &str,
        new_status: StopStatus,
        pod_url: Option<String>,
    ) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, state| {
            if shipment.status.is_terminal() {
                return Err(EngineError::invalid_transition(
                    shipment.status,
                    "stop progress",
                ));
            }
            let stop = shipment
                .stop_mut(stop_id)
                .ok_or_else(|| EngineError::not_found("stop", stop_id))?;
            if new_status.rank() <= stop.status.rank() {
                return Err(EngineError::invalid_transition(
                    stop.status,
                    format!("stop move to {new_status}"),
                ));
            }
            stop.status = new_status;
            if new_status == StopStatus::Delivered {
                stop.timestamp = Some(Utc::now());
                if pod_url.is_some() {
                    stop.pod_url = pod_url;
                }
            }
            if state.config.auto_reconcile_status {
                reconcile_parent(shipment);
            }
            Ok(())
        })?;
        info!(shipment = %updated.id, stop = %stop_id, status = %new_status, "stop progressed");
        Ok(updated)
    }
}

fn guard_closed(shipment: &Shipment, state: &EngineState) -> EngineResult<()> {
    if !state.config.guard_closed_edits {
        return Ok(());
    }
    if matches!(
        shipment.status,
        ShipmentStatus::Delivered | ShipmentStatus::Declined | ShipmentStatus::Invoiced
    ) {
        return Err(EngineError::invalid_transition(shipment.status, "stop edit"));
    }
    Ok(())
}

fn renumber(stops: &mut [DeliveryStop]) {
    for (index, stop) in stops.iter_mut().enumerate() {
        stop.sequence = index as u32 + 1;
    }
}

/// Derive the parent status from stop completion: some-but-not-all stops
/// Delivered means Partially Delivered, all Delivered means Delivered.
/// Invoiced and Declined manifests are left alone, and a manifest an
/// operator already marked Delivered is never walked back.
fn reconcile_parent(shipment: &mut Shipment) {
    if matches!(
        shipment.status,
        ShipmentStatus::Declined | ShipmentStatus::Invoiced
    ) || shipment.stops.is_empty()
    {
        return;
    }

    let total = shipment.stops.len();
    let delivered = shipment
        .stops
        .iter()
        .filter(|stop| stop.status == StopStatus::Delivered)
        .count();

    if delivered == total && shipment.status != ShipmentStatus::Delivered {
        shipment.status = ShipmentStatus::Delivered;
        shipment.push_event(ShipmentEvent {
            status: ShipmentStatus::Delivered,
            timestamp: Utc::now(),
            location: "Reconciliation".to_string(),
            note: Some("All delivery stops confirmed.".to_string()),
        });
    } else if delivered > 0
        && delivered < total
        && !matches!(
            shipment.status,
            ShipmentStatus::Delivered | ShipmentStatus::PartiallyDelivered
        )
    {
        shipment.status = ShipmentStatus::PartiallyDelivered;
        shipment.push_event(ShipmentEvent {
            status: ShipmentStatus::PartiallyDelivered,
            timestamp: Utc::now(),
            location: "Reconciliation".to_string(),
            note: Some(format!("Delivery confirmed for {delivered} of {total} stops.")),
        });
    }
}
