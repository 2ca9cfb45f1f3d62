use chrono::{NaiveDate, Utc};
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{DeliveryStop, Shipment, ShipmentEvent, ShipmentStatus, StopStatus};
use crate::policy;

use super::ManifestEngine;

/// Caller-supplied fields for one delivery stop.
#[derive(Debug, Clone, Default)]
pub struct StopInput {
    pub address: String,
    pub landmark: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub payload_description: String,
    pub weight: f64,
    pub instructions: Option<String>,
    pub call_before_delivery: bool,
}

/// Caller-supplied fields for a new manifest. `vehicle_class` names the
/// intended unit class and is resolved against the configured capacity
/// table; the engine computes the total weight itself.
#[derive(Debug, Clone)]
pub struct BookingInput {
    pub client: String,
    pub origin: String,
    pub destination: Option<String>,
    pub pickup_landmark: Option<String>,
    pub pickup_date: NaiveDate,
    pub pickup_time_window: Option<String>,
    pub goods_type: String,
    pub vehicle_class: String,
    pub is_multi_stop: bool,
    pub is_non_fragile: bool,
    pub is_non_perishable: bool,
    pub instructions: Option<String>,
    pub stops: Vec<StopInput>,
}

#[derive(Clone, Copy)]
enum BookingChannel {
    Admin,
    ClientPortal,
}

impl BookingChannel {
    fn reference_prefix(&self) -> &'static str {
        match self {
            Self::Admin => "SHAKTI",
            Self::ClientPortal => "ST-REQ",
        }
    }
}

impl ManifestEngine {
    /// Direct creation from the operations console.
    pub fn create_shipment(&self, input: BookingInput) -> EngineResult<Shipment> {
        self.create(input, BookingChannel::Admin)
    }

    /// Self-service booking from the client portal. The manifest lands in
    /// Booked with no unit bound, awaiting operations approval.
    pub fn create_booking_request(&self, input: BookingInput) -> EngineResult<Shipment> {
        self.create(input, BookingChannel::ClientPortal)
    }

    fn create(&self, input: BookingInput, channel: BookingChannel) -> EngineResult<Shipment> {
        validate_booking(&input, self.config())?;

        let stops: Vec<DeliveryStop> = input
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| build_stop(stop, index as u32 + 1))
            .collect();
        let total_weight = policy::total_weight(&stops);

        let now = Utc::now();
        let (vehicle_label, location, note) = match channel {
            BookingChannel::Admin => (
                format!("Pending ({})", input.vehicle_class),
                "System",
                "Advanced Booking Created by Admin",
            ),
            BookingChannel::ClientPortal => (
                "Awaiting Assignment".to_string(),
                "Client Portal",
                "Manifest requested by client.",
            ),
        };

        let _gate = self.state().lock_shipments();
        let mut shipments = self.state().load_shipments()?;
        let id = unique_reference(channel.reference_prefix(), &shipments);

        let shipment = Shipment {
            id: id.clone(),
            client: input.client,
            origin: input.origin,
            destination: input.destination,
            pickup_landmark: input.pickup_landmark,
            pickup_date: input.pickup_date,
            pickup_time_window: input.pickup_time_window,
            date: now.date_naive(),
            status: ShipmentStatus::Booked,
            vehicle: vehicle_label,
            vehicle_id: None,
            driver_id: None,
            goods_type: input.goods_type,
            total_weight,
            stops,
            is_multi_stop: input.is_multi_stop,
            instructions: input.instructions,
            is_non_fragile: input.is_non_fragile,
            is_non_perishable: input.is_non_perishable,
            timeline: vec![ShipmentEvent {
                status: ShipmentStatus::Booked,
                timestamp: now,
                location: location.to_string(),
                note: Some(note.to_string()),
            }],
        };

        shipments.push(shipment.clone());
        self.state().save_shipments(&shipments)?;

        info!(
            shipment = %shipment.id,
            client = %shipment.client,
            stops = shipment.stops.len(),
            total_weight,
            "manifest booked"
        );
        Ok(shipment)
    }
}

fn validate_booking(input: &BookingInput, config: &EngineConfig) -> EngineResult<()> {
    if input.client.trim().is_empty() {
        return Err(EngineError::policy("client name must not be empty"));
    }
    if input.stops.is_empty() {
        return Err(EngineError::policy(
            "a manifest requires at least one delivery stop",
        ));
    }
    if input.stops.iter().any(|stop| stop.weight < 0.0) {
        return Err(EngineError::policy("stop weight must not be negative"));
    }
    if !input.is_non_fragile || !input.is_non_perishable {
        return Err(EngineError::policy(
            "non-fragile and non-perishable compliance must both be confirmed",
        ));
    }

    let capacity = config.capacity_for(&input.vehicle_class).ok_or_else(|| {
        EngineError::policy(format!(
            "unknown vehicle class '{}'",
            input.vehicle_class.trim()
        ))
    })?;
    let total: f64 = input.stops.iter().map(|stop| stop.weight).sum();
    if policy::is_overweight(total, capacity) {
        return Err(EngineError::policy(format!(
            "total weight {total}t exceeds the {capacity}t rating of {}",
            input.vehicle_class.trim()
        )));
    }
    Ok(())
}

pub(crate) fn build_stop(input: &StopInput, sequence: u32) -> DeliveryStop {
    DeliveryStop {
        id: Uuid::new_v4().to_string(),
        sequence,
        address: input.address.clone(),
        landmark: input.landmark.clone(),
        contact_name: input.contact_name.clone(),
        contact_phone: input.contact_phone.clone(),
        payload_description: input.payload_description.clone(),
        weight: input.weight,
        instructions: input.instructions.clone(),
        call_before_delivery: input.call_before_delivery,
        status: StopStatus::Pending,
        pod_url: None,
        timestamp: None,
    }
}

/// Human-facing booking reference: prefix plus six digits, re-rolled
/// until it does not collide with a stored manifest.
fn unique_reference(prefix: &str, existing: &[Shipment]) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate = format!("{prefix}-{:06}", rng.gen_range(0..1_000_000u32));
        if !existing
            .iter()
            .any(|s| s.id.eq_ignore_ascii_case(&candidate))
        {
            return candidate;
        }
    }
}
