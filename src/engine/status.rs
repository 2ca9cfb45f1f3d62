use chrono::Utc;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Shipment, ShipmentEvent, ShipmentStatus, Vehicle, VehicleStatus};
use crate::state::EngineState;

use super::ManifestEngine;

impl ManifestEngine {
    /// Approve a Booked request: bind a driver and a vehicle, move to
    /// Assigned, append one event. The bind is atomic; a failed lookup
    /// or an ineligible unit leaves the stored record untouched.
    pub fn approve_request(
        &self,
        id: &str,
        driver_id: i64,
        vehicle_id: &str,
    ) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, state| {
            if shipment.status != ShipmentStatus::Booked {
                return Err(EngineError::invalid_transition(
                    shipment.status,
                    "approval",
                ));
            }
            let bound = bind_assets(shipment, state, driver_id, vehicle_id)?;
            shipment.status = ShipmentStatus::Assigned;
            shipment.push_event(ShipmentEvent {
                status: ShipmentStatus::Assigned,
                timestamp: Utc::now(),
                location: "Operations Hub".to_string(),
                note: Some(format!(
                    "Approved & Assigned Personnel: {} | Unit: {}",
                    bound.driver_name, bound.registration
                )),
            });
            Ok(())
        })?;
        info!(shipment = %updated.id, driver = driver_id, vehicle = vehicle_id, "request approved");
        Ok(updated)
    }

    /// Decline a Booked request. Declined is terminal: no operation will
    /// touch the manifest afterwards.
    pub fn decline_request(&self, id: &str) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, _state| {
            if shipment.status != ShipmentStatus::Booked {
                return Err(EngineError::invalid_transition(shipment.status, "decline"));
            }
            shipment.status = ShipmentStatus::Declined;
            shipment.push_event(ShipmentEvent {
                status: ShipmentStatus::Declined,
                timestamp: Utc::now(),
                location: "Admin Terminal".to_string(),
                note: Some("Manifest Request Declined by Operations.".to_string()),
            });
            Ok(())
        })?;
        info!(shipment = %updated.id, "request declined");
        Ok(updated)
    }

    /// Manual operator override. Forward-only ordering is deliberately
    /// not enforced: operators may jump ahead or walk a status back.
    /// The current status is rejected as a no-op, and Declined manifests
    /// accept nothing.
    pub fn set_status(
        &self,
        id: &str,
        new_status: ShipmentStatus,
        note: Option<String>,
    ) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, _state| {
            if !new_status.is_manual_override_target() {
                return Err(EngineError::invalid_transition(
                    shipment.status,
                    format!("manual override to {new_status}"),
                ));
            }
            if shipment.status.is_terminal() {
                return Err(EngineError::invalid_transition(
                    shipment.status,
                    format!("manual override to {new_status}"),
                ));
            }
            if shipment.status == new_status {
                return Err(EngineError::NoOpTransition {
                    status: new_status,
                });
            }
            shipment.status = new_status;
            let note = note.unwrap_or_else(|| {
                format!(
                    "Status manually updated by root admin to: {}",
                    new_status.as_str().to_uppercase()
                )
            });
            shipment.push_event(ShipmentEvent {
                status: new_status,
                timestamp: Utc::now(),
                location: "Admin Console".to_string(),
                note: Some(note),
            });
            Ok(())
        })?;
        info!(shipment = %updated.id, status = %new_status, "status overridden");
        Ok(updated)
    }

    /// Re-bind driver and vehicle on a live manifest. Runs the same bind
    /// as approval and returns the manifest to Assigned; completed or
    /// declined manifests are out of reach.
    pub fn reassign_assets(
        &self,
        id: &str,
        driver_id: i64,
        vehicle_id: &str,
    ) -> EngineResult<Shipment> {
        let updated = self.mutate_shipment(id, |shipment, state| {
            if matches!(
                shipment.status,
                ShipmentStatus::Declined | ShipmentStatus::Delivered
            ) {
                return Err(EngineError::invalid_transition(
                    shipment.status,
                    "reassignment",
                ));
            }
            let bound = bind_assets(shipment, state, driver_id, vehicle_id)?;
            shipment.status = ShipmentStatus::Assigned;
            shipment.push_event(ShipmentEvent {
                status: ShipmentStatus::Assigned,
                timestamp: Utc::now(),
                location: "Operations Hub".to_string(),
                note: Some(format!(
                    "Approved & Assigned Personnel: {} | Unit: {}",
                    bound.driver_name, bound.registration
                )),
            });
            Ok(())
        })?;
        info!(shipment = %updated.id, driver = driver_id, vehicle = vehicle_id, "assets reassigned");
        Ok(updated)
    }

    /// Explicit collaborator side effect: flip a fleet unit's own status
    /// to In Transit. Never invoked implicitly by assignment; dispatch
    /// decides when the unit actually rolls.
    pub fn mark_vehicle_in_transit(&self, vehicle_id: &str) -> EngineResult<Vehicle> {
        let _gate = self.state().lock_vehicles();
        let mut vehicles = self.state().load_vehicles()?;
        let vehicle = vehicles
            .iter_mut()
            .find(|v| v.id == vehicle_id)
            .ok_or_else(|| EngineError::not_found("vehicle", vehicle_id))?;
        vehicle.status = VehicleStatus::InTransit;
        let updated = vehicle.clone();
        self.state().save_vehicles(&vehicles)?;
        info!(vehicle = %vehicle_id, "unit marked in transit");
        Ok(updated)
    }
}

struct BoundAssets {
    driver_name: String,
    registration: String,
}

/// Look up both records and bind them to the shipment. A vehicle is
/// eligible when Available, or when it is already this shipment's unit
/// (re-confirming an assignment must not require freeing the unit
/// first). Driver duty status is only checked when the availability
/// policy is switched on.
fn bind_assets(
    shipment: &mut Shipment,
    state: &EngineState,
    driver_id: i64,
    vehicle_id: &str,
) -> EngineResult<BoundAssets> {
    let drivers = state.load_drivers()?;
    let driver = drivers
        .iter()
        .find(|d| d.id == driver_id)
        .ok_or_else(|| EngineError::not_found("driver", driver_id.to_string()))?;

    let vehicles = state.load_vehicles()?;
    let vehicle = vehicles
        .iter()
        .find(|v| v.id == vehicle_id)
        .ok_or_else(|| EngineError::not_found("vehicle", vehicle_id))?;

    let already_bound = shipment.vehicle_id.as_deref() == Some(vehicle_id);
    if vehicle.status != VehicleStatus::Available && !already_bound {
        warn!(shipment = %shipment.id, vehicle = %vehicle_id, status = %vehicle.status, "unit not available");
        return Err(EngineError::policy(format!(
            "vehicle {} is {}, not available",
            vehicle.registration_number, vehicle.status
        )));
    }

    if state.config.enforce_driver_availability && driver.status.eq_ignore_ascii_case("In Transit")
    {
        return Err(EngineError::policy(format!(
            "driver {} is already in transit",
            driver.name
        )));
    }

    shipment.driver_id = Some(driver.id);
    shipment.vehicle_id = Some(vehicle.id.clone());
    shipment.vehicle = vehicle.display_label();

    Ok(BoundAssets {
        driver_name: driver.name.clone(),
        registration: vehicle.registration_number.clone(),
    })
}
