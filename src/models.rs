use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a shipment manifest. Serialized with the display
/// strings the operations console uses, so records exported by older
/// deployments load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Booked,
    Assigned,
    Dispatched,
    #[serde(rename = "In Transit")]
    InTransit,
    #[serde(rename = "Partially Delivered")]
    PartiallyDelivered,
    Delivered,
    Invoiced,
    Declined,
}

/// The statuses an operator may jump to through the manual override
/// console. Booked, Assigned and Declined are only reachable through
/// their dedicated operations.
pub const MANUAL_OVERRIDE_TARGETS: &[ShipmentStatus] = &[
    ShipmentStatus::Dispatched,
    ShipmentStatus::InTransit,
    ShipmentStatus::PartiallyDelivered,
    ShipmentStatus::Delivered,
    ShipmentStatus::Invoiced,
];

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "Booked",
            Self::Assigned => "Assigned",
            Self::Dispatched => "Dispatched",
            Self::InTransit => "In Transit",
            Self::PartiallyDelivered => "Partially Delivered",
            Self::Delivered => "Delivered",
            Self::Invoiced => "Invoiced",
            Self::Declined => "Declined",
        }
    }

    /// Declined manifests accept no further transitions of any kind.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined)
    }

    pub fn is_manual_override_target(&self) -> bool {
        MANUAL_OVERRIDE_TARGETS.contains(self)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-stop delivery state, independent of the parent shipment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopStatus {
    Pending,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
}

impl StopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        }
    }

    /// Ordinal used to enforce forward-only progression.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::OutForDelivery => 1,
            Self::Delivered => 2,
        }
    }
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    Available,
    #[serde(rename = "In Transit")]
    InTransit,
    Maintenance,
    #[serde(rename = "Off Duty")]
    OffDuty,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Available => "Available",
            Self::InTransit => "In Transit",
            Self::Maintenance => "Maintenance",
            Self::OffDuty => "Off Duty",
        };
        f.write_str(label)
    }
}

/// One destination within a shipment manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStop {
    pub id: String,
    /// 1-based ordinal; contiguous and matching array position. The engine
    /// renumbers on every structural change.
    pub sequence: u32,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub payload_description: String,
    /// Tons.
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub call_before_delivery: bool,
    pub status: StopStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_url: Option<String>,
    /// Stamped when delivery is confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One immutable audit entry. The timeline is the sole source of
/// historical truth for a shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentEvent {
    pub status: ShipmentStatus,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A transport manifest. `total_weight` is engine-maintained: it always
/// equals the sum of the stop weights whenever any stops exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    /// Denormalized company name; collaborators match it against client
    /// records by case-insensitive equality.
    pub client: String,
    pub origin: String,
    /// Legacy direct-run destination, used only when `stops` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_landmark: Option<String>,
    pub pickup_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time_window: Option<String>,
    /// Booking date.
    pub date: NaiveDate,
    pub status: ShipmentStatus,
    /// Denormalized assigned-unit label, e.g. "GJ-27-Y-5678 (Small Eicher)".
    pub vehicle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<i64>,
    pub goods_type: String,
    pub total_weight: f64,
    pub stops: Vec<DeliveryStop>,
    pub is_multi_stop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub is_non_fragile: bool,
    pub is_non_perishable: bool,
    pub timeline: Vec<ShipmentEvent>,
}

impl Shipment {
    pub fn stop(&self, stop_id: &str) -> Option<&DeliveryStop> {
        self.stops.iter().find(|s| s.id == stop_id)
    }

    pub fn stop_mut(&mut self, stop_id: &str) -> Option<&mut DeliveryStop> {
        self.stops.iter_mut().find(|s| s.id == stop_id)
    }

    pub fn push_event(&mut self, event: ShipmentEvent) {
        self.timeline.push(event);
    }
}

/// Driver record, owned by the personnel collection. The engine only
/// reads it during assignment and display resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub phone: String,
    /// Free-text duty status, e.g. "Active" or "In Transit".
    #[serde(default)]
    pub status: String,
    /// Registration of the unit the driver usually runs.
    #[serde(default)]
    pub vehicle: String,
}

/// Fleet unit record, owned by the fleet collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub registration_number: String,
    /// Vehicle class, e.g. "Big Eicher". Keyed into the capacity table.
    #[serde(rename = "type")]
    pub vehicle_type: String,
    /// Display string, e.g. "7 Tons".
    #[serde(default)]
    pub capacity: String,
    pub status: VehicleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance: Option<NaiveDate>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Vehicle {
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.registration_number, self.vehicle_type)
    }
}

/// Client record, owned by the client-book collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub company_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Search criteria for the shipment ledger; all matching is
/// case-insensitive. Mirrors the console's status tabs and search box.
#[derive(Debug, Clone, Default)]
pub struct ShipmentFilter {
    pub status: Option<ShipmentStatus>,
    pub client_name_contains: Option<String>,
    pub id_contains: Option<String>,
}

impl ShipmentFilter {
    pub fn matches(&self, shipment: &Shipment) -> bool {
        if let Some(status) = self.status {
            if shipment.status != status {
                return false;
            }
        }
        if let Some(needle) = self.client_name_contains.as_deref() {
            if !contains_ignore_case(&shipment.client, needle) {
                return false;
            }
        }
        if let Some(needle) = self.id_contains.as_deref() {
            if !contains_ignore_case(&shipment.id, needle) {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
