use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Client, Shipment, ShipmentFilter, Vehicle};
use crate::state::EngineState;
use crate::store::CollectionStore;

pub mod booking;
pub mod status;
pub mod stops;

pub use booking::{BookingInput, StopInput};
pub use stops::StopPatch;

/// Owns the shipment lifecycle: booking, assignment, status transitions,
/// stop management and the append-only audit timeline. Rendering, charts
/// and persistence mechanics live with collaborators; this engine exposes
/// pure operations over the stored records.
pub struct ManifestEngine {
    state: EngineState,
}

impl ManifestEngine {
    pub fn new(store: Arc<dyn CollectionStore>, config: EngineConfig) -> Self {
        Self {
            state: EngineState::new(store, config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    pub fn get_shipment(&self, id: &str) -> EngineResult<Shipment> {
        let shipments = self.state.load_shipments()?;
        shipments
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::not_found("shipment", id))
    }

    /// Public tracking lookup: exact reference match, case-insensitive.
    pub fn track(&self, reference: &str) -> EngineResult<Shipment> {
        let wanted = reference.trim();
        let shipments = self.state.load_shipments()?;
        shipments
            .into_iter()
            .find(|s| s.id.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::not_found("shipment", wanted))
    }

    pub fn list_shipments(&self, filter: &ShipmentFilter) -> EngineResult<Vec<Shipment>> {
        let shipments = self.state.load_shipments()?;
        Ok(shipments.into_iter().filter(|s| filter.matches(s)).collect())
    }

    /// Client-portal scoping: case-insensitive equality on the
    /// denormalized company name.
    pub fn list_for_client(&self, company_name: &str) -> EngineResult<Vec<Shipment>> {
        let shipments = self.state.load_shipments()?;
        Ok(shipments
            .into_iter()
            .filter(|s| s.client.eq_ignore_ascii_case(company_name))
            .collect())
    }

    /// Read-through display projection. Denormalized `client`/`vehicle`
    /// strings can drift from the authoritative records once those are
    /// renamed; the view resolves the live records where they still exist
    /// and falls back to the stored strings, without rewriting storage.
    pub fn shipment_view(&self, id: &str) -> EngineResult<ShipmentView> {
        let shipment = self.get_shipment(id)?;

        let clients = self.state.load_clients()?;
        let client_record = clients
            .into_iter()
            .find(|c| c.company_name.eq_ignore_ascii_case(&shipment.client));

        let vehicles = self.state.load_vehicles()?;
        let vehicle_record = shipment
            .vehicle_id
            .as_deref()
            .and_then(|vid| vehicles.into_iter().find(|v| v.id == vid));
        let vehicle_label = vehicle_record
            .as_ref()
            .map(Vehicle::display_label)
            .unwrap_or_else(|| shipment.vehicle.clone());

        let driver_name = match shipment.driver_id {
            Some(driver_id) => self
                .state
                .load_drivers()?
                .into_iter()
                .find(|d| d.id == driver_id)
                .map(|d| d.name),
            None => None,
        };

        Ok(ShipmentView {
            shipment,
            client_record,
            vehicle_record,
            driver_name,
            vehicle_label,
        })
    }

    pub(crate) fn state(&self) -> &EngineState {
        &self.state
    }

    /// Shared mutation path: gate the shipments collection, apply the
    /// closure to a working copy, and persist only on success, so a
    /// rejected operation leaves the stored record untouched.
    pub(crate) fn mutate_shipment<F>(&self, id: &str, op: F) -> EngineResult<Shipment>
    where
        F: FnOnce(&mut Shipment, &EngineState) -> EngineResult<()>,
    {
        let _gate = self.state.lock_shipments();
        let mut shipments = self.state.load_shipments()?;
        let index = shipments
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EngineError::not_found("shipment", id))?;

        let mut updated = shipments[index].clone();
        op(&mut updated, &self.state)?;

        shipments[index] = updated.clone();
        self.state.save_shipments(&shipments)?;
        Ok(updated)
    }
}

/// Display projection over a shipment and the collaborator records it
/// references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentView {
    pub shipment: Shipment,
    pub client_record: Option<Client>,
    pub vehicle_record: Option<Vehicle>,
    pub driver_name: Option<String>,
    /// Resolved from the live vehicle record when it exists, otherwise
    /// the stored label.
    pub vehicle_label: String,
}
